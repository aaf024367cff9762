//! # Drag-Reorder Controller
//!
//! Reorders sibling nodes of one role inside a container.
//!
//! ```text
//! start ──► over* ──► drop? ──► end
//!   │         │         │        │
//!  token   visual     commit   token
//!  set     move only  (engine) cleared
//! ```
//!
//! Only one drag is in flight at a time. `over` moves the dragging node
//! visually and never touches the document; the engine reads the final
//! order back out with [`read_order`] when a drop lands and then calls
//! [`DragReorder::commit`]. `end` clears the token whether or not a drop
//! happened, and puts the node back where it was last committed, so a
//! cancelled drag leaves the view matching the document.

use crate::layout::Layout;
use crate::selection::EntityKind;
use crate::view::{NodeId, ViewTree};
use tracing::debug;

/// Class carried by the node being dragged
pub const DRAGGING_CLASS: &str = "dragging";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveDrag {
    pub node: NodeId,
    pub role: EntityKind,
    /// Container and next sibling at the last committed position
    pub origin: Option<(NodeId, Option<NodeId>)>,
}

#[derive(Debug, Clone, Default)]
pub struct DragReorder {
    active: Option<ActiveDrag>,
}

impl DragReorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<ActiveDrag> {
        self.active
    }

    /// Take the drag token. A stale drag that never ended is dropped.
    pub fn start(&mut self, view: &mut ViewTree, node: NodeId, role: EntityKind) {
        self.end(view);
        view.add_class(node, DRAGGING_CLASS);
        self.active = Some(ActiveDrag {
            node,
            role,
            origin: position_of(view, node),
        });
    }

    /// Accept the node's current position; a later `end` keeps it there
    pub fn commit(&mut self, view: &ViewTree) {
        if let Some(drag) = self.active.as_mut() {
            drag.origin = position_of(view, drag.node);
        }
    }

    /// True if the dragging node is a child of this container with its role
    pub fn accepts(&self, view: &ViewTree, container: NodeId, role: EntityKind) -> bool {
        self.active.is_some_and(|drag| {
            drag.role == role
                && view.parent(drag.node) == Some(container)
                && view.has_class(drag.node, role.role_class())
        })
    }

    /// Move the dragging node before the first sibling below the pointer
    pub fn over(
        &self,
        view: &mut ViewTree,
        container: NodeId,
        pointer_y: f32,
        layout: &dyn Layout,
    ) -> bool {
        let Some(drag) = self.active else {
            return false;
        };
        if !self.accepts(view, container, drag.role) {
            return false;
        }

        let after = closest_below(view, container, drag.role, drag.node, pointer_y, layout);
        view.insert_before(container, drag.node, after);
        true
    }

    /// Release the token and undo any uncommitted move; returns the node
    /// that was being dragged
    pub fn end(&mut self, view: &mut ViewTree) -> Option<NodeId> {
        let drag = self.active.take()?;
        view.remove_class(drag.node, DRAGGING_CLASS);
        if let Some((container, next)) = drag.origin {
            if position_of(view, drag.node) != drag.origin {
                view.insert_before(container, drag.node, next);
            }
        }
        debug!("drag ended for {:?}", drag.node);
        Some(drag.node)
    }
}

/// Parent and next sibling of a node
fn position_of(view: &ViewTree, node: NodeId) -> Option<(NodeId, Option<NodeId>)> {
    let parent = view.parent(node)?;
    let index = view.index_in_parent(node)?;
    Some((parent, view.children(parent).get(index + 1).copied()))
}

/// Reorderable children of a container, in visual order
pub fn role_children(view: &ViewTree, container: NodeId, role: EntityKind) -> Vec<NodeId> {
    view.children(container)
        .iter()
        .copied()
        .filter(|child| view.has_class(*child, role.role_class()))
        .collect()
}

/// Sibling whose vertical midpoint is the nearest one below the pointer.
///
/// `None` means the dragging node belongs at the end.
pub fn closest_below(
    view: &ViewTree,
    container: NodeId,
    role: EntityKind,
    dragging: NodeId,
    pointer_y: f32,
    layout: &dyn Layout,
) -> Option<NodeId> {
    let mut best: Option<(f32, NodeId)> = None;

    for sibling in role_children(view, container, role) {
        if sibling == dragging {
            continue;
        }
        let Some(rect) = layout.bounds(view, sibling) else {
            continue;
        };
        let offset = pointer_y - rect.midpoint();
        if offset < 0.0 && best.map_or(true, |(closest, _)| offset > closest) {
            best = Some((offset, sibling));
        }
    }

    best.map(|(_, node)| node)
}

/// Entity ids of the reorderable children, in visual order
pub fn read_order(view: &ViewTree, container: NodeId, role: EntityKind) -> Vec<String> {
    role_children(view, container, role)
        .into_iter()
        .filter_map(|node| view.data(node, role.id_tag()).map(str::to_string))
        .collect()
}

/// Put a child at a visual index among its role siblings
pub fn move_to_index(
    view: &mut ViewTree,
    container: NodeId,
    node: NodeId,
    role: EntityKind,
    index: usize,
) {
    let siblings: Vec<NodeId> = role_children(view, container, role)
        .into_iter()
        .filter(|sibling| *sibling != node)
        .collect();
    view.insert_before(container, node, siblings.get(index).copied());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StackedLayout;

    fn container(view: &mut ViewTree, ids: &[&str]) -> (NodeId, Vec<NodeId>) {
        let root = view.create_element("div");
        let nodes = ids
            .iter()
            .map(|id| {
                let node = view.create_element("section");
                view.add_class(node, EntityKind::Section.role_class());
                view.set_data(node, "section-id", *id);
                view.append_child(root, node);
                node
            })
            .collect();
        (root, nodes)
    }

    #[test]
    fn test_drag_last_to_top_is_visual_only_until_read() {
        let mut view = ViewTree::new();
        let (root, nodes) = container(&mut view, &["a", "b", "c"]);
        let layout = StackedLayout::new(10.0);
        let mut drag = DragReorder::new();

        drag.start(&mut view, nodes[2], EntityKind::Section);
        assert!(view.has_class(nodes[2], DRAGGING_CLASS));

        // upper half of the first row
        assert!(drag.over(&mut view, root, 2.0, &layout));
        assert_eq!(read_order(&view, root, EntityKind::Section), vec!["c", "a", "b"]);

        drag.commit(&view);
        assert_eq!(drag.end(&mut view), Some(nodes[2]));
        assert!(!view.has_class(nodes[2], DRAGGING_CLASS));
        assert!(drag.active().is_none());
        assert_eq!(read_order(&view, root, EntityKind::Section), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_end_without_commit_restores_position() {
        let mut view = ViewTree::new();
        let (root, nodes) = container(&mut view, &["a", "b", "c"]);
        let layout = StackedLayout::new(10.0);
        let mut drag = DragReorder::new();

        drag.start(&mut view, nodes[1], EntityKind::Section);
        drag.over(&mut view, root, 500.0, &layout);
        assert_eq!(read_order(&view, root, EntityKind::Section), vec!["a", "c", "b"]);

        drag.end(&mut view);
        assert_eq!(read_order(&view, root, EntityKind::Section), vec!["a", "b", "c"]);

        // last child goes back to the end
        drag.start(&mut view, nodes[2], EntityKind::Section);
        drag.over(&mut view, root, 2.0, &layout);
        drag.end(&mut view);
        assert_eq!(read_order(&view, root, EntityKind::Section), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_pointer_below_everything_appends() {
        let mut view = ViewTree::new();
        let (root, nodes) = container(&mut view, &["a", "b", "c"]);
        let layout = StackedLayout::new(10.0);
        let mut drag = DragReorder::new();

        drag.start(&mut view, nodes[0], EntityKind::Section);
        drag.over(&mut view, root, 500.0, &layout);
        assert_eq!(read_order(&view, root, EntityKind::Section), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_over_without_token_is_noop() {
        let mut view = ViewTree::new();
        let (root, _) = container(&mut view, &["a", "b"]);
        let drag = DragReorder::new();

        assert!(!drag.over(&mut view, root, 0.0, &StackedLayout::default()));
        assert_eq!(read_order(&view, root, EntityKind::Section), vec!["a", "b"]);
    }

    #[test]
    fn test_foreign_container_rejected() {
        let mut view = ViewTree::new();
        let (_, nodes) = container(&mut view, &["a"]);
        let (other, _) = container(&mut view, &["x", "y"]);
        let mut drag = DragReorder::new();

        drag.start(&mut view, nodes[0], EntityKind::Section);
        assert!(!drag.over(&mut view, other, 0.0, &StackedLayout::default()));
        assert_eq!(read_order(&view, other, EntityKind::Section), vec!["x", "y"]);
    }

    #[test]
    fn test_closest_below_ignores_siblings_above_pointer() {
        let mut view = ViewTree::new();
        let (root, nodes) = container(&mut view, &["a", "b", "c", "d"]);
        let layout = StackedLayout::new(10.0);

        // pointer in the lower half of "b": the next midpoint below is "c"
        let target = closest_below(&view, root, EntityKind::Section, nodes[0], 18.0, &layout);
        assert_eq!(target, Some(nodes[2]));
    }

    #[test]
    fn test_move_to_index() {
        let mut view = ViewTree::new();
        let (root, nodes) = container(&mut view, &["a", "b", "c"]);

        move_to_index(&mut view, root, nodes[0], EntityKind::Section, 1);
        assert_eq!(read_order(&view, root, EntityKind::Section), vec!["b", "a", "c"]);

        move_to_index(&mut view, root, nodes[0], EntityKind::Section, 9);
        assert_eq!(read_order(&view, root, EntityKind::Section), vec!["b", "c", "a"]);
    }
}
