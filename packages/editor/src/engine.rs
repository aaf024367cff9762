//! # Editor Engine
//!
//! Owns the page document, the view projected from it, the selection and
//! its settings panel, and the drag token.
//!
//! The document is the single source of truth. The view can be thrown away
//! and rebuilt from it at any time; the engine keeps an explicit node
//! registry (entity → node) instead of searching the view for ids.
//!
//! ## Selection
//!
//! ```text
//!            select              delete selected / load
//! None ───────────────► Section(id) ─────────────────────► None
//!   │                                                       ▲
//!   └──────────────────► Block(id) ─────────────────────────┘
//! ```
//!
//! Selecting another entity replaces the current selection.
//!
//! ## Failure handling
//!
//! Public operations never return errors and never panic. Unknown plugin
//! types, missing view targets and dangling references are logged and the
//! operation degrades to a partial no-op.

use crate::drag::{self, DragReorder};
use crate::errors::EditorError;
use crate::html::HtmlOptions;
use crate::ids::IdGenerator;
use crate::layout::Layout;
use crate::panel::{display_value, render_panel, InputValue, SettingsPanel};
use crate::registry::Registry;
use crate::render::RenderContext;
use crate::selection::{EntityKind, EntityRef, Selection};
use crate::view::{Listener, Mount, NodeId, ViewTree};
use pagecraft_schema::{Block, Page, SchemaError, Section};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Class of the canvas root holding the sections
pub const CANVAS_CLASS: &str = "editor";

/// Class of the panel root holding the settings form
pub const PANEL_ROOT_CLASS: &str = "editor-panel";

/// Class added to the selected entity's node
pub const SELECTED_CLASS: &str = "editor-selected";

/// Data tag naming the section a block list belongs to
const BLOCK_LIST_OWNER: &str = "blocks-of";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorOptions {
    /// Seeds generated ids
    pub session: String,

    /// Heading shown above the settings form
    pub panel_title: String,

    /// Put `editor-selected` on the selected node
    pub mark_selected: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            session: "pagecraft".to_string(),
            panel_title: "Settings".to_string(),
            mark_selected: true,
        }
    }
}

/// Input event delivered by the host surface
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Click { target: NodeId },
    Input { target: NodeId, value: InputValue },
    DragStart { target: NodeId },
    DragOver { target: NodeId, pointer_y: f32 },
    Drop { target: NodeId },
    DragEnd { target: NodeId },
}

/// Insertable plugin types, in registration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette<'a> {
    pub sections: Vec<&'a str>,
    pub blocks: Vec<&'a str>,
}

/// Result of mounting a section
struct Mounted {
    root: NodeId,
    blocks: Vec<(String, NodeId)>,
}

pub struct Engine<'r> {
    registry: &'r Registry,
    options: EditorOptions,
    page: Page,
    view: ViewTree,
    canvas: NodeId,
    panel_root: NodeId,
    nodes: HashMap<EntityRef, NodeId>,
    block_lists: HashMap<String, NodeId>,
    selection: Selection,
    panel: Option<SettingsPanel>,
    field_nodes: HashMap<String, NodeId>,
    drag: DragReorder,
    ids: IdGenerator,
}

impl<'r> Engine<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_options(registry, EditorOptions::default())
    }

    pub fn with_options(registry: &'r Registry, options: EditorOptions) -> Self {
        let mut view = ViewTree::new();

        let canvas = view.create_element("div");
        view.add_class(canvas, CANVAS_CLASS);
        view.add_listener(canvas, Listener::DropZone(EntityKind::Section));

        let panel_root = view.create_element("aside");
        view.add_class(panel_root, PANEL_ROOT_CLASS);

        Self {
            registry,
            ids: IdGenerator::new(&options.session),
            options,
            page: Page::new(),
            view,
            canvas,
            panel_root,
            nodes: HashMap::new(),
            block_lists: HashMap::new(),
            selection: None,
            panel: None,
            field_nodes: HashMap::new(),
            drag: DragReorder::new(),
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn view(&self) -> &ViewTree {
        &self.view
    }

    /// Host access to rendered nodes, e.g. for widget state inside dynamic
    /// blocks. Structural changes made here are not reflected in the page.
    pub fn view_mut(&mut self) -> &mut ViewTree {
        &mut self.view
    }

    pub fn canvas(&self) -> NodeId {
        self.canvas
    }

    pub fn panel_root(&self) -> NodeId {
        self.panel_root
    }

    pub fn selection(&self) -> Option<&EntityRef> {
        self.selection.as_ref()
    }

    pub fn settings_panel(&self) -> Option<&SettingsPanel> {
        self.panel.as_ref()
    }

    /// Rendered node of an entity
    pub fn node_of(&self, entity: &EntityRef) -> Option<NodeId> {
        self.nodes.get(entity).copied()
    }

    /// Container a section rendered its blocks into
    pub fn block_list_of(&self, section_id: &str) -> Option<NodeId> {
        self.block_lists.get(section_id).copied()
    }

    pub fn palette(&self) -> Palette<'r> {
        let registry = self.registry;
        Palette {
            sections: registry
                .list_sections()
                .iter()
                .map(|p| p.type_name.as_str())
                .collect(),
            blocks: registry
                .list_blocks()
                .iter()
                .map(|p| p.type_name.as_str())
                .collect(),
        }
    }

    // ---------------------------------------------------------------------
    // Load / render
    // ---------------------------------------------------------------------

    /// Replace the whole document and re-render from scratch
    pub fn load(&mut self, page: Page) {
        self.drag.end(&mut self.view);
        self.view.clear_children(self.canvas);
        self.nodes.clear();
        self.block_lists.clear();

        self.page = page;
        self.selection = None;
        self.show_panel();

        let order = self.page.order.clone();
        for id in &order {
            self.render_section(id);
        }

        debug!(
            "Loaded page with {} sections ({} rendered)",
            self.page.order.len(),
            drag::role_children(&self.view, self.canvas, EntityKind::Section).len()
        );
    }

    /// Parse and load a JSON document
    pub fn load_json(&mut self, source: &str) -> Result<(), SchemaError> {
        let page = Page::from_json(source)?;
        self.load(page);
        Ok(())
    }

    /// Render a section and mount it at the end of the canvas
    fn render_section(&mut self, id: &str) -> Option<NodeId> {
        if self.page.section(id).is_none() {
            debug!("Skipping dangling section id: {}", id);
            return None;
        }
        match self.build_section(id) {
            Ok(mounted) => {
                self.view.append_child(self.canvas, mounted.root);
                Some(mounted.root)
            }
            Err(err) => {
                warn!("{}", err);
                None
            }
        }
    }

    /// Render a section into a detached, fully wired subtree
    fn build_section(&mut self, id: &str) -> Result<Mounted, EditorError> {
        let registry = self.registry;
        let section = self
            .page
            .section(id)
            .ok_or_else(|| EditorError::SectionNotFound(id.to_string()))?;
        let plugin = registry
            .section(&section.type_name)
            .ok_or_else(|| EditorError::UnknownPlugin {
                kind: EntityKind::Section,
                type_name: section.type_name.clone(),
            })?;

        let ctx = RenderContext::new(registry, &section.id);
        let vnode = plugin.renderer.render(section, &ctx).into_element();
        let type_name = section.type_name.clone();
        let (root, mounts) = self.view.build(&vnode);

        self.wire_entity(root, EntityRef::Section(id.to_string()), &type_name);

        let mut blocks = Vec::new();
        for (node, mount) in mounts {
            match mount {
                Mount::BlockList { section_id } => self.wire_block_list(node, section_id),
                Mount::Block { block_id } => {
                    let type_name = self
                        .page
                        .find_block(&block_id)
                        .map(|(_, block)| block.type_name.clone())
                        .unwrap_or_default();
                    self.wire_entity(node, EntityRef::Block(block_id.clone()), &type_name);
                    blocks.push((block_id, node));
                }
                Mount::Field { .. } => {}
            }
        }

        debug!("Rendered section {} ({} blocks)", id, blocks.len());
        Ok(Mounted { root, blocks })
    }

    /// Render a single block into a detached, wired node
    fn build_block(&mut self, id: &str) -> Result<NodeId, EditorError> {
        let registry = self.registry;
        let (_, block) = self
            .page
            .find_block(id)
            .ok_or_else(|| EditorError::BlockNotFound(id.to_string()))?;
        let plugin = registry
            .block(&block.type_name)
            .ok_or_else(|| EditorError::UnknownPlugin {
                kind: EntityKind::Block,
                type_name: block.type_name.clone(),
            })?;

        let vnode = plugin.renderer.render(block).into_element();
        let type_name = block.type_name.clone();
        let (node, _) = self.view.build(&vnode);

        self.wire_entity(node, EntityRef::Block(id.to_string()), &type_name);
        Ok(node)
    }

    /// Tag a freshly built entity node and attach its listeners
    fn wire_entity(&mut self, node: NodeId, entity: EntityRef, type_name: &str) {
        let kind = entity.kind();
        self.view.add_class(node, kind.role_class());
        self.view.set_data(node, kind.id_tag(), entity.id());
        self.view.set_data(node, kind.type_tag(), type_name);
        self.view.set_attr(node, "draggable", "true");
        self.view.add_listener(node, Listener::Select(entity.clone()));
        self.view.add_listener(node, Listener::DragHandle(kind));

        if self.options.mark_selected && self.selection.as_ref() == Some(&entity) {
            self.view.add_class(node, SELECTED_CLASS);
        }
        self.nodes.insert(entity, node);
    }

    fn wire_block_list(&mut self, node: NodeId, section_id: String) {
        self.view.set_data(node, BLOCK_LIST_OWNER, section_id.clone());
        self.view.add_listener(node, Listener::DropZone(EntityKind::Block));
        self.block_lists.insert(section_id, node);
    }

    /// Forget registry entries whose nodes were freed
    fn prune_nodes(&mut self) {
        let view = &self.view;
        self.nodes.retain(|_, node| view.contains(*node));
        self.block_lists.retain(|_, node| view.contains(*node));

        if let Some(active) = self.drag.active() {
            if !self.view.contains(active.node) {
                self.drag.end(&mut self.view);
            }
        }
    }

    // ---------------------------------------------------------------------
    // Selection and settings panel
    // ---------------------------------------------------------------------

    fn entity_exists(&self, entity: &EntityRef) -> bool {
        match entity {
            EntityRef::Section(id) => self.page.section(id).is_some(),
            EntityRef::Block(id) => self.page.find_block(id).is_some(),
        }
    }

    /// Select an entity and open its settings panel
    pub fn select(&mut self, entity: EntityRef) -> bool {
        if !self.entity_exists(&entity) {
            debug!("Cannot select missing {}", entity);
            return false;
        }

        self.unmark_selected();
        if self.options.mark_selected {
            if let Some(&node) = self.nodes.get(&entity) {
                self.view.add_class(node, SELECTED_CLASS);
            }
        }

        debug!("Selected {}", entity);
        self.selection = Some(entity);
        self.show_panel();
        true
    }

    fn unmark_selected(&mut self) {
        if let Some(&node) = self.selection.as_ref().and_then(|s| self.nodes.get(s)) {
            self.view.remove_class(node, SELECTED_CLASS);
        }
    }

    fn clear_selection(&mut self) {
        self.unmark_selected();
        self.selection = None;
        self.show_panel();
    }

    /// Rebuild the panel subtree for the current selection
    fn show_panel(&mut self) {
        self.view.clear_children(self.panel_root);
        self.field_nodes.clear();
        self.panel = self.selection.as_ref().and_then(|s| self.build_panel(s));

        let Some(panel) = &self.panel else {
            return;
        };
        let (root, mounts) = self.view.build(&panel.to_vnode());
        for (node, mount) in mounts {
            if let Mount::Field { key } = mount {
                self.view
                    .add_listener(node, Listener::FieldInput(key.clone()));
                self.field_nodes.insert(key, node);
            }
        }
        self.view.append_child(self.panel_root, root);
    }

    fn build_panel(&self, entity: &EntityRef) -> Option<SettingsPanel> {
        let (settings, type_name) = match entity {
            EntityRef::Section(id) => self
                .page
                .section(id)
                .map(|s| (&s.settings, s.type_name.as_str()))?,
            EntityRef::Block(id) => self
                .page
                .find_block(id)
                .map(|(_, b)| (&b.settings, b.type_name.as_str()))?,
        };

        let panel = match self.registry.get(entity.kind(), type_name) {
            Some(plugin) => render_panel(
                settings,
                plugin.settings_schema(),
                Some(plugin.default_settings()),
            ),
            None => render_panel(settings, &[], None),
        };
        Some(panel.with_title(format!("{}: {}", self.options.panel_title, type_name)))
    }

    /// Apply an edit event from a panel control to the selected entity
    pub fn edit_field(&mut self, key: &str, input: &InputValue) -> bool {
        match self.try_edit_field(key, input) {
            Ok(()) => true,
            Err(err) => {
                warn!("Ignoring edit of '{}': {}", key, err);
                false
            }
        }
    }

    fn try_edit_field(&mut self, key: &str, input: &InputValue) -> Result<(), EditorError> {
        let entity = self.selection.clone().ok_or(EditorError::NoSelection)?;
        let panel = self.panel.as_mut().ok_or(EditorError::NoSelection)?;

        let settings = match &entity {
            EntityRef::Section(id) => self
                .page
                .section_mut(id)
                .map(|s| &mut s.settings)
                .ok_or_else(|| EditorError::SectionNotFound(id.clone()))?,
            EntityRef::Block(id) => self
                .page
                .block_mut(id)
                .map(|b| &mut b.settings)
                .ok_or_else(|| EditorError::BlockNotFound(id.clone()))?,
        };

        let value = panel
            .apply(settings, key, input)
            .ok_or_else(|| EditorError::UnknownField(key.to_string()))?;

        if let Some(&control) = self.field_nodes.get(key) {
            self.sync_control(control, &value);
        }

        debug!("Set {}.{} = {}", entity, key, value);
        self.refresh_selected();
        Ok(())
    }

    fn sync_control(&mut self, control: NodeId, value: &Value) {
        let tag = self
            .view
            .get(control)
            .and_then(|n| n.tag())
            .map(str::to_string)
            .unwrap_or_default();
        match tag.as_str() {
            "input" if self.view.attr(control, "type") == Some("checkbox") => {
                if value.as_bool() == Some(true) {
                    self.view.set_attr(control, "checked", "checked");
                } else {
                    self.view.remove_attr(control, "checked");
                }
            }
            "input" => self.view.set_attr(control, "value", display_value(value)),
            "textarea" => self.view.set_text_content(control, display_value(value)),
            _ => {}
        }
    }

    // ---------------------------------------------------------------------
    // Refresh
    // ---------------------------------------------------------------------

    /// Re-render the selected entity in place, leaving the rest untouched
    pub fn refresh_selected(&mut self) {
        let Some(entity) = self.selection.clone() else {
            return;
        };
        let result = match &entity {
            EntityRef::Section(id) => self.refresh_section(id),
            EntityRef::Block(id) => self.refresh_block(id),
        };
        if let Err(err) = result {
            warn!("Refresh of {} skipped: {}", entity, err);
        }
    }

    fn attached_node(&self, entity: &EntityRef) -> Result<NodeId, EditorError> {
        self.nodes
            .get(entity)
            .copied()
            .filter(|node| self.view.parent(*node).is_some())
            .ok_or_else(|| EditorError::MissingNode(entity.clone()))
    }

    fn refresh_block(&mut self, id: &str) -> Result<(), EditorError> {
        let registry = self.registry;
        let (_, block) = self
            .page
            .find_block(id)
            .ok_or_else(|| EditorError::BlockNotFound(id.to_string()))?;
        let plugin = registry
            .block(&block.type_name)
            .ok_or_else(|| EditorError::UnknownPlugin {
                kind: EntityKind::Block,
                type_name: block.type_name.clone(),
            })?;

        if plugin.is_dynamic {
            debug!("Keeping dynamic block {} in place", id);
            return Ok(());
        }

        let old = self.attached_node(&EntityRef::Block(id.to_string()))?;
        let fresh = self.build_block(id)?;
        self.view.replace(old, fresh);
        self.view.remove(old);
        self.prune_nodes();
        Ok(())
    }

    /// Rebuild a section and its blocks. Existing nodes of dynamic blocks
    /// are moved into the new subtree instead of being re-rendered.
    fn refresh_section(&mut self, id: &str) -> Result<(), EditorError> {
        let old = self.attached_node(&EntityRef::Section(id.to_string()))?;
        let kept = self.dynamic_block_nodes(id);
        let mounted = self.build_section(id)?;

        for (block_id, node) in kept {
            let fresh = mounted
                .blocks
                .iter()
                .find(|(b, _)| *b == block_id)
                .map(|(_, n)| *n);
            if let Some(fresh) = fresh {
                self.view.replace(fresh, node);
                self.view.remove(fresh);
                self.nodes.insert(EntityRef::Block(block_id), node);
            }
        }

        self.view.replace(old, mounted.root);
        self.view.remove(old);
        self.prune_nodes();
        Ok(())
    }

    fn dynamic_block_nodes(&self, section_id: &str) -> Vec<(String, NodeId)> {
        let Some(section) = self.page.section(section_id) else {
            return Vec::new();
        };
        section
            .blocks()
            .iter()
            .filter(|b| {
                self.registry
                    .block(&b.type_name)
                    .is_some_and(|p| p.is_dynamic)
            })
            .filter_map(|b| {
                let node = self.nodes.get(&EntityRef::Block(b.id.clone()))?;
                Some((b.id.clone(), *node))
            })
            .collect()
    }

    // ---------------------------------------------------------------------
    // Add / delete / move
    // ---------------------------------------------------------------------

    /// Append a new section of a registered type and select it
    pub fn add_section(&mut self, type_name: &str) -> Option<String> {
        let registry = self.registry;
        let Some(plugin) = registry.section(type_name) else {
            warn!("Cannot add unknown section type: {}", type_name);
            return None;
        };

        let page = &self.page;
        let id = self.ids.next_id("section", |candidate| page.contains_id(candidate));
        let section = Section::new(id.clone(), type_name)
            .with_settings(plugin.default_settings.clone())
            .with_blocks(Vec::new());

        self.page.push_section(section);
        self.render_section(&id);
        self.select(EntityRef::Section(id.clone()));
        Some(id)
    }

    /// Append a new block of a registered type to a section and select it
    pub fn add_block(&mut self, section_id: &str, type_name: &str) -> Option<String> {
        let registry = self.registry;
        let Some(plugin) = registry.block(type_name) else {
            warn!("Cannot add unknown block type: {}", type_name);
            return None;
        };
        if self.page.section(section_id).is_none() {
            debug!("Cannot add block to missing section: {}", section_id);
            return None;
        }
        let Some(&list) = self.block_lists.get(section_id) else {
            warn!("{}", EditorError::MissingBlockList(section_id.to_string()));
            return None;
        };

        let page = &self.page;
        let id = self.ids.next_id("block", |candidate| page.contains_id(candidate));
        let block = Block::new(id.clone(), type_name).with_settings(plugin.default_settings.clone());

        if let Some(section) = self.page.section_mut(section_id) {
            section.blocks.get_or_insert_with(Vec::new).push(block);
        }
        match self.build_block(&id) {
            Ok(node) => self.view.append_child(list, node),
            Err(err) => warn!("{}", err),
        }

        self.select(EntityRef::Block(id.clone()));
        Some(id)
    }

    /// Remove a section, its blocks and its node
    pub fn delete_section(&mut self, id: &str) -> bool {
        let Some(section) = self.page.sections.remove(id) else {
            debug!("Cannot delete missing section: {}", id);
            return false;
        };
        self.page.order.retain(|s| s != id);

        if let Some(node) = self.nodes.remove(&EntityRef::Section(id.to_string())) {
            self.view.remove(node);
        }
        self.block_lists.remove(id);
        self.prune_nodes();

        let selected = match &self.selection {
            Some(EntityRef::Section(s)) => s == id,
            Some(EntityRef::Block(b)) => section.block(b).is_some(),
            None => false,
        };
        if selected {
            self.clear_selection();
        }
        true
    }

    /// Remove a block from its section and its node from the view
    pub fn delete_block(&mut self, id: &str) -> bool {
        let Some(section_id) = self.page.block_owner(id).map(str::to_string) else {
            debug!("Cannot delete missing block: {}", id);
            return false;
        };
        if !self.block_lists.contains_key(&section_id) {
            warn!("{}", EditorError::MissingBlockList(section_id));
            return false;
        }

        if let Some(blocks) = self
            .page
            .section_mut(&section_id)
            .and_then(|s| s.blocks.as_mut())
        {
            blocks.retain(|b| b.id != id);
        }
        if let Some(node) = self.nodes.remove(&EntityRef::Block(id.to_string())) {
            self.view.remove(node);
        }
        self.prune_nodes();

        if self.selection.as_ref().is_some_and(|s| s.is_block(id)) {
            self.clear_selection();
        }
        true
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selection.clone() {
            Some(EntityRef::Section(id)) => self.delete_section(&id),
            Some(EntityRef::Block(id)) => self.delete_block(&id),
            None => false,
        }
    }

    /// Move a section to an index among the rendered sections
    pub fn move_section(&mut self, id: &str, index: usize) -> bool {
        let Some(&node) = self.nodes.get(&EntityRef::Section(id.to_string())) else {
            debug!("Cannot move unrendered section: {}", id);
            return false;
        };
        self.drag.end(&mut self.view);
        drag::move_to_index(&mut self.view, self.canvas, node, EntityKind::Section, index);
        self.commit_sections();
        true
    }

    /// Move a block to an index among its section's rendered blocks
    pub fn move_block(&mut self, id: &str, index: usize) -> bool {
        let Some(section_id) = self.page.block_owner(id).map(str::to_string) else {
            return false;
        };
        let (Some(&list), Some(&node)) = (
            self.block_lists.get(&section_id),
            self.nodes.get(&EntityRef::Block(id.to_string())),
        ) else {
            debug!("Cannot move unrendered block: {}", id);
            return false;
        };
        self.drag.end(&mut self.view);
        drag::move_to_index(&mut self.view, list, node, EntityKind::Block, index);
        self.commit_blocks(&section_id).is_ok()
    }

    /// Overwrite `order` from the canvas; unrendered ids keep their
    /// relative order after the rendered ones
    fn commit_sections(&mut self) {
        let visual = drag::read_order(&self.view, self.canvas, EntityKind::Section);
        let mut order: Vec<String> = Vec::with_capacity(self.page.order.len());
        for id in visual {
            if self.page.sections.contains_key(&id) && !order.contains(&id) {
                order.push(id);
            }
        }
        for id in &self.page.order {
            if !order.contains(id) {
                order.push(id.clone());
            }
        }
        debug!("Committed section order: {:?}", order);
        self.page.order = order;
    }

    /// Overwrite a section's blocks from its block list
    fn commit_blocks(&mut self, section_id: &str) -> Result<(), EditorError> {
        let list = self
            .block_lists
            .get(section_id)
            .copied()
            .ok_or_else(|| EditorError::MissingBlockList(section_id.to_string()))?;
        let visual = drag::read_order(&self.view, list, EntityKind::Block);

        let section = self
            .page
            .section_mut(section_id)
            .ok_or_else(|| EditorError::SectionNotFound(section_id.to_string()))?;
        let Some(blocks) = section.blocks.as_mut() else {
            return Ok(());
        };

        let mut remaining = std::mem::take(blocks);
        let mut ordered = Vec::with_capacity(remaining.len());
        for id in visual {
            if let Some(pos) = remaining.iter().position(|b| b.id == id) {
                ordered.push(remaining.remove(pos));
            }
        }
        ordered.extend(remaining);
        *blocks = ordered;

        debug!("Committed block order for section {}", section_id);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    /// First listener on the target or its ancestors that `pick` accepts
    fn find_listener<T>(
        &self,
        target: NodeId,
        pick: impl Fn(NodeId, &Listener) -> Option<T>,
    ) -> Option<(NodeId, T)> {
        self.view.ancestors(target).into_iter().find_map(|node| {
            self.view
                .listeners(node)
                .iter()
                .find_map(|listener| pick(node, listener))
                .map(|found| (node, found))
        })
    }

    /// Drop zone on the target's path that accepts the active drag
    fn accepting_zone(&self, target: NodeId) -> Option<(NodeId, EntityKind)> {
        self.find_listener(target, |node, listener| match listener {
            Listener::DropZone(kind) if self.drag.accepts(&self.view, node, *kind) => Some(*kind),
            _ => None,
        })
    }

    /// Entity owning a node: the nearest ancestor with a select listener
    pub fn entity_at(&self, node: NodeId) -> Option<EntityRef> {
        self.find_listener(node, |_, listener| match listener {
            Listener::Select(entity) => Some(entity.clone()),
            _ => None,
        })
        .map(|(_, entity)| entity)
    }

    /// Deliver a host input event. Returns true if a listener handled it.
    pub fn dispatch(&mut self, event: ViewEvent, layout: &dyn Layout) -> bool {
        match event {
            // nearest entity wins, so block clicks never reach their section
            ViewEvent::Click { target } => match self.entity_at(target) {
                Some(entity) => self.select(entity),
                None => false,
            },

            ViewEvent::Input { target, value } => {
                let key = self.find_listener(target, |_, listener| match listener {
                    Listener::FieldInput(key) => Some(key.clone()),
                    _ => None,
                });
                match key {
                    Some((_, key)) => self.edit_field(&key, &value),
                    None => false,
                }
            }

            ViewEvent::DragStart { target } => {
                let handle = self.find_listener(target, |_, listener| match listener {
                    Listener::DragHandle(kind) => Some(*kind),
                    _ => None,
                });
                match handle {
                    Some((node, kind)) => {
                        self.drag.start(&mut self.view, node, kind);
                        true
                    }
                    None => false,
                }
            }

            ViewEvent::DragOver { target, pointer_y } => match self.accepting_zone(target) {
                Some((container, _)) => {
                    self.drag
                        .over(&mut self.view, container, pointer_y, layout)
                }
                None => false,
            },

            ViewEvent::Drop { target } => match self.accepting_zone(target) {
                Some((_, EntityKind::Section)) => {
                    self.commit_sections();
                    self.drag.commit(&self.view);
                    true
                }
                Some((container, EntityKind::Block)) => {
                    let Some(section_id) = self
                        .view
                        .data(container, BLOCK_LIST_OWNER)
                        .map(str::to_string)
                    else {
                        return false;
                    };
                    match self.commit_blocks(&section_id) {
                        Ok(()) => {
                            self.drag.commit(&self.view);
                            true
                        }
                        Err(err) => {
                            warn!("Drop ignored: {}", err);
                            false
                        }
                    }
                }
                None => false,
            },

            ViewEvent::DragEnd { .. } => self.drag.end(&mut self.view).is_some(),
        }
    }

    // ---------------------------------------------------------------------
    // Output
    // ---------------------------------------------------------------------

    /// The full document as JSON; round-trips with `load`
    pub fn serialize(&self) -> Value {
        self.page.to_value()
    }

    pub fn serialize_pretty(&self) -> String {
        self.page.to_json_pretty()
    }

    /// HTML of the rendered canvas
    pub fn render_html(&self, options: &HtmlOptions) -> String {
        self.view.to_html(self.canvas, options)
    }

    /// HTML of the settings panel
    pub fn panel_html(&self, options: &HtmlOptions) -> String {
        self.view.to_html(self.panel_root, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StackedLayout;
    use crate::registry::{BlockPlugin, EditorPlugin, SectionPlugin};
    use crate::view::VNode;
    use pagecraft_schema::SettingField;
    use serde_json::json;

    fn rich_text(section: &Section, ctx: &RenderContext<'_>) -> VNode {
        let mut el = VNode::element("section").with_class("rich-text");
        if let Some(heading) = section.setting_str("heading") {
            el = el.with_child(VNode::element("h2").with_text(heading));
        }
        el.with_child(ctx.render_blocks(section.blocks.as_deref()))
    }

    fn banner(section: &Section, _: &RenderContext<'_>) -> VNode {
        VNode::element("header").with_text(section.setting_str("title").unwrap_or("Banner"))
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(
            EditorPlugin::new("Test")
                .with_section(
                    SectionPlugin::new("rich-text", rich_text)
                        .with_schema(vec![SettingField::text("heading", "Heading")])
                        .with_defaults(json!({ "heading": "New section" })),
                )
                .with_section(SectionPlugin::new("banner", banner))
                .with_block(
                    BlockPlugin::new("text", |b: &Block| {
                        VNode::element("p").with_text(b.setting_str("text").unwrap_or("Text block"))
                    })
                    .with_schema(vec![SettingField::text("text", "Text")])
                    .with_defaults(json!({ "text": "Your text here" })),
                ),
        );
        registry
    }

    fn page() -> Page {
        Page::from_value(json!({
            "order": ["s1", "ghost", "s2"],
            "sections": {
                "s1": {
                    "id": "s1", "type": "rich-text", "settings": { "heading": "Hi" },
                    "blocks": [
                        { "id": "b1", "type": "text", "settings": { "text": "one" } },
                        { "id": "b2", "type": "mystery", "settings": {} },
                        { "id": "b3", "type": "text", "settings": { "text": "three" } }
                    ]
                },
                "s2": { "id": "s2", "type": "banner", "settings": {} }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_load_skips_unknown_and_dangling() {
        let registry = registry();
        let mut engine = Engine::new(&registry);
        engine.load(page());

        let sections = drag::role_children(engine.view(), engine.canvas(), EntityKind::Section);
        assert_eq!(sections.len(), 2);

        let list = engine.block_list_of("s1").unwrap();
        assert_eq!(
            drag::read_order(engine.view(), list, EntityKind::Block),
            vec!["b1", "b3"]
        );
        assert!(engine.node_of(&EntityRef::Block("b2".into())).is_none());
        assert_eq!(engine.serialize(), page().to_value());
    }

    #[test]
    fn test_block_click_does_not_select_section() {
        let registry = registry();
        let mut engine = Engine::new(&registry);
        engine.load(page());

        let b1 = engine.node_of(&EntityRef::Block("b1".into())).unwrap();
        let text = engine.view().children(b1)[0];
        assert!(engine.dispatch(ViewEvent::Click { target: text }, &StackedLayout::default()));
        assert_eq!(engine.selection(), Some(&EntityRef::Block("b1".into())));
        assert!(engine.view().has_class(b1, SELECTED_CLASS));

        let s1 = engine.node_of(&EntityRef::Section("s1".into())).unwrap();
        engine.dispatch(ViewEvent::Click { target: s1 }, &StackedLayout::default());
        assert_eq!(engine.selection(), Some(&EntityRef::Section("s1".into())));
        assert!(!engine.view().has_class(b1, SELECTED_CLASS));
    }

    #[test]
    fn test_block_reorder_keeps_unrendered_blocks() {
        let registry = registry();
        let mut engine = Engine::new(&registry);
        engine.load(page());

        assert!(engine.move_block("b3", 0));
        let ids: Vec<_> = engine.page().sections["s1"]
            .blocks()
            .iter()
            .map(|b| b.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b3", "b1", "b2"]);
    }

    #[test]
    fn test_add_block_to_section_without_block_list_is_noop() {
        let registry = registry();
        let mut engine = Engine::new(&registry);
        engine.load(page());

        assert_eq!(engine.add_block("s2", "text"), None);
        assert!(engine.page().sections["s2"].blocks.is_none());
    }

    #[test]
    fn test_delete_section_clears_selected_child_block() {
        let registry = registry();
        let mut engine = Engine::new(&registry);
        engine.load(page());

        engine.select(EntityRef::Block("b1".into()));
        assert!(engine.delete_section("s1"));
        assert!(engine.selection().is_none());
        assert!(engine.settings_panel().is_none());
        assert!(engine.node_of(&EntityRef::Block("b1".into())).is_none());
        assert!(engine.block_list_of("s1").is_none());
        assert_eq!(engine.page().order, vec!["ghost", "s2"]);
    }

    #[test]
    fn test_panel_title_and_defaults() {
        let registry = registry();
        let mut engine = Engine::new(&registry);
        engine.load(Page::new());

        let id = engine.add_section("rich-text").unwrap();
        let panel = engine.settings_panel().unwrap();
        assert_eq!(panel.title, "Settings: rich-text");
        assert_eq!(engine.page().sections[&id].settings["heading"], "New section");
        assert!(engine
            .panel_html(&HtmlOptions::default())
            .contains("value=\"New section\""));
    }
}
