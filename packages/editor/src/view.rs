//! # View Tree
//!
//! The rendered, regenerable projection of the page.
//!
//! Renderers return detached [`VNode`] trees. The engine mounts them into a
//! [`ViewTree`], an arena of live nodes addressed by generational [`NodeId`]
//! handles. A handle stays valid until its node is removed, so node identity
//! survives for as long as the node does; a re-render produces new handles.
//!
//! Listeners are plain data stored on nodes. Replacing a node drops its
//! listeners with it, so every replace-in-place path must wire the new node.

use crate::selection::{EntityKind, EntityRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Engine bookkeeping attached to a detached node while it is being mounted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mount {
    /// Container of a section's blocks
    BlockList { section_id: String },
    /// Rendered block
    Block { block_id: String },
    /// Settings panel control bound to a settings key
    Field { key: String },
}

/// Detached virtual node produced by renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VNode {
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        classes: Vec<String>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attributes: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        styles: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<VNode>,
        #[serde(skip)]
        mount: Option<Mount>,
    },

    Text { content: String },
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element {
            tag: tag.into(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            children: Vec::new(),
            mount: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text {
            content: content.into(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        if let VNode::Element {
            ref mut classes, ..
        } = self
        {
            let class = class.into();
            if !classes.contains(&class) {
                classes.push(class);
            }
        }
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element { ref mut styles, .. } = self {
            styles.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: VNode) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<VNode>) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    /// Shorthand for an element holding a single text child
    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.with_child(VNode::text(content))
    }

    pub fn with_mount(mut self, marker: Mount) -> Self {
        if let VNode::Element { ref mut mount, .. } = self {
            *mount = Some(marker);
        }
        self
    }

    /// Style a node in place (used by shared style helpers)
    pub fn set_style(&mut self, key: impl Into<String>, value: impl Into<String>) {
        if let VNode::Element { styles, .. } = self {
            styles.insert(key.into(), value.into());
        }
    }

    pub fn style(&self, key: &str) -> Option<&str> {
        match self {
            VNode::Element { styles, .. } => styles.get(key).map(String::as_str),
            VNode::Text { .. } => None,
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element { children, .. } => children,
            VNode::Text { .. } => &[],
        }
    }

    /// Entities must be elements so they can carry tags and listeners
    pub fn into_element(self) -> Self {
        match self {
            VNode::Text { .. } => VNode::element("span").with_child(self),
            element => element,
        }
    }
}

/// Generational handle to a live node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// Event handler binding stored on a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listener {
    /// Click selects the entity and stops propagation
    Select(EntityRef),
    /// Drag-start/drag-end on a reorderable child of this role
    DragHandle(EntityKind),
    /// Drag-over/drop on a container of children of this role
    DropZone(EntityKind),
    /// Edit events write the settings key of the selected entity
    FieldInput(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element(String),
    Text(String),
}

/// A live node in the tree
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    /// `data-*` tags, stored without the prefix
    pub data: BTreeMap<String, String>,
    pub listeners: Vec<Listener>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            data: BTreeMap::new(),
            listeners: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(tag) => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena of live nodes
#[derive(Debug, Clone, Default)]
pub struct ViewTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl ViewTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes (attached or detached)
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeKind::Element(tag.into())))
    }

    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeKind::Text(content.into())))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    /// Ancestors from the node itself up to its root
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(id).filter(|id| self.contains(*id));
        while let Some(node) = current {
            chain.push(node);
            current = self.parent(node);
        }
        chain
    }

    /// Pre-order walk of a subtree
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if let Some(n) = self.get(node) {
                out.push(node);
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Unlink a node from its parent; the node stays alive
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.get_mut(id) {
            n.parent = None;
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` before `reference`, or at the end when `reference` is
    /// `None` or not a child of `parent`. Moves the child if already attached.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if parent == child || !self.contains(parent) || !self.contains(child) {
            return;
        }
        if self.ancestors(parent).contains(&child) {
            return;
        }
        self.detach(child);

        let Some(p) = self.get_mut(parent) else {
            return;
        };
        let position = reference
            .and_then(|r| p.children.iter().position(|c| *c == r))
            .unwrap_or(p.children.len());
        p.children.insert(position, child);

        if let Some(n) = self.get_mut(child) {
            n.parent = Some(parent);
        }
    }

    /// Put `new` where `old` is; `old` ends up detached but alive
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        if old == new || !self.contains(new) {
            return;
        }
        let Some(parent) = self.parent(old) else {
            return;
        };
        self.detach(new);
        let Some(index) = self.index_in_parent(old) else {
            return;
        };

        if let Some(p) = self.get_mut(parent) {
            p.children[index] = new;
        }
        if let Some(n) = self.get_mut(new) {
            n.parent = Some(parent);
        }
        if let Some(n) = self.get_mut(old) {
            n.parent = None;
        }
    }

    /// Detach and free a whole subtree; its handles become stale
    pub fn remove(&mut self, id: NodeId) {
        if !self.contains(id) {
            return;
        }
        self.detach(id);
        for node in self.descendants(id) {
            let slot = &mut self.slots[node.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(node.index);
            self.live -= 1;
        }
    }

    /// Free every child of a node
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.remove(child);
        }
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(n) = self.get_mut(id) {
            if !n.has_class(class) {
                n.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(n) = self.get_mut(id) {
            n.classes.retain(|c| c != class);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.get(id).is_some_and(|n| n.has_class(class))
    }

    pub fn set_attr(&mut self, id: NodeId, key: impl Into<String>, value: impl Into<String>) {
        if let Some(n) = self.get_mut(id) {
            n.attributes.insert(key.into(), value.into());
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, key: &str) {
        if let Some(n) = self.get_mut(id) {
            n.attributes.remove(key);
        }
    }

    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.get(id)?.attributes.get(key).map(String::as_str)
    }

    pub fn set_data(&mut self, id: NodeId, key: impl Into<String>, value: impl Into<String>) {
        if let Some(n) = self.get_mut(id) {
            n.data.insert(key.into(), value.into());
        }
    }

    pub fn data(&self, id: NodeId, key: &str) -> Option<&str> {
        self.get(id)?.data.get(key).map(String::as_str)
    }

    pub fn add_listener(&mut self, id: NodeId, listener: Listener) {
        if let Some(n) = self.get_mut(id) {
            n.listeners.push(listener);
        }
    }

    pub fn listeners(&self, id: NodeId) -> &[Listener] {
        self.get(id).map(|n| n.listeners.as_slice()).unwrap_or_default()
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&mut self, id: NodeId, content: impl Into<String>) {
        if let Some(Node {
            kind: NodeKind::Text(text),
            ..
        }) = self.get_mut(id)
        {
            *text = content.into();
            return;
        }
        self.clear_children(id);
        let text = self.create_text(content);
        self.append_child(id, text);
    }

    /// Concatenated text of a subtree
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|node| match &self.get(node)?.kind {
                NodeKind::Text(text) => Some(text.as_str()),
                NodeKind::Element(_) => None,
            })
            .collect()
    }

    /// Mount a detached tree; returns its root and every marked node
    pub fn build(&mut self, vnode: &VNode) -> (NodeId, Vec<(NodeId, Mount)>) {
        let mut mounts = Vec::new();
        let root = self.build_node(vnode, &mut mounts);
        (root, mounts)
    }

    fn build_node(&mut self, vnode: &VNode, mounts: &mut Vec<(NodeId, Mount)>) -> NodeId {
        match vnode {
            VNode::Text { content } => self.create_text(content.clone()),
            VNode::Element {
                tag,
                classes,
                attributes,
                styles,
                children,
                mount,
            } => {
                let id = self.create_element(tag.clone());
                if let Some(n) = self.get_mut(id) {
                    n.classes = classes.clone();
                    n.attributes = attributes.clone();
                    n.styles = styles.clone();
                }
                if let Some(marker) = mount {
                    mounts.push((id, marker.clone()));
                }
                for child in children {
                    let child_id = self.build_node(child, mounts);
                    self.append_child(id, child_id);
                }
                id
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(tree: &mut ViewTree, n: usize) -> (NodeId, Vec<NodeId>) {
        let parent = tree.create_element("ul");
        let items = (0..n)
            .map(|i| {
                let li = tree.create_element("li");
                tree.set_text_content(li, format!("item {i}"));
                tree.append_child(parent, li);
                li
            })
            .collect();
        (parent, items)
    }

    #[test]
    fn test_build_collects_mounts() {
        let vnode = VNode::element("section")
            .with_class("rich-text")
            .with_child(VNode::element("h2").with_text("Hi"))
            .with_child(
                VNode::element("div").with_mount(Mount::BlockList {
                    section_id: "s1".into(),
                }),
            );

        let mut tree = ViewTree::new();
        let (root, mounts) = tree.build(&vnode);

        assert_eq!(tree.get(root).unwrap().tag(), Some("section"));
        assert!(tree.has_class(root, "rich-text"));
        assert_eq!(tree.text_content(root), "Hi");
        assert_eq!(mounts.len(), 1);
        assert_eq!(tree.parent(mounts[0].0), Some(root));
    }

    #[test]
    fn test_insert_before_moves_existing_child() {
        let mut tree = ViewTree::new();
        let (ul, items) = list(&mut tree, 3);

        tree.insert_before(ul, items[2], Some(items[0]));
        assert_eq!(tree.children(ul), &[items[2], items[0], items[1]]);

        tree.insert_before(ul, items[2], None);
        assert_eq!(tree.children(ul), &[items[0], items[1], items[2]]);
    }

    #[test]
    fn test_remove_invalidates_handles_and_reuses_slots() {
        let mut tree = ViewTree::new();
        let (ul, items) = list(&mut tree, 2);
        let before = tree.len();

        tree.remove(items[0]);
        assert!(!tree.contains(items[0]));
        assert_eq!(tree.children(ul), &[items[1]]);
        // li + its text node
        assert_eq!(tree.len(), before - 2);

        let fresh = tree.create_element("li");
        assert_ne!(fresh, items[0]);
        assert!(tree.get(items[0]).is_none());
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut tree = ViewTree::new();
        let (ul, items) = list(&mut tree, 3);
        let fresh = tree.create_element("li");

        tree.replace(items[1], fresh);
        assert_eq!(tree.children(ul), &[items[0], fresh, items[2]]);
        assert_eq!(tree.parent(items[1]), None);
        assert!(tree.contains(items[1]));
    }

    #[test]
    fn test_cannot_insert_ancestor_into_descendant() {
        let mut tree = ViewTree::new();
        let (ul, items) = list(&mut tree, 1);
        tree.append_child(items[0], ul);
        assert_eq!(tree.parent(ul), None);
    }

    #[test]
    fn test_text_vnode_wrapped_into_element() {
        let node = VNode::text("plain").into_element();
        assert!(matches!(node, VNode::Element { ref tag, .. } if tag == "span"));
    }
}
