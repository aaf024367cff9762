//! # Pagecraft Editor
//!
//! Visual editing engine for plugin-driven page documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ schema: Page JSON ↔ Page / Section / Block  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ registry: plugin type → renderer + schema   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ engine: document ⇄ view                     │
//! │  - Render sections and their block lists    │
//! │  - Selection + settings panel               │
//! │  - Add / delete / refresh entities          │
//! │  - Drag-reorder committed back to the page  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ view: node arena, listeners, HTML output    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Document is source of truth**: the view is a projection that can be
//!    discarded and rebuilt
//! 2. **Plugins are data**: a renderer plus a settings schema plus defaults
//! 3. **Dynamic blocks own their view**: settings edits never re-render them
//! 4. **Failures degrade**: unknown types and missing targets are logged and
//!    skipped, never fatal
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecraft_editor::{Engine, EntityRef, InputValue, Registry};
//!
//! let mut registry = Registry::new();
//! registry.register(my_plugin());
//!
//! let mut engine = Engine::new(&registry);
//! engine.load_json(&source)?;
//!
//! engine.select(EntityRef::Section("hero".into()));
//! engine.edit_field("heading", &InputValue::text("Welcome"));
//!
//! let saved = engine.serialize_pretty();
//! ```

mod drag;
mod engine;
mod errors;
mod html;
mod ids;
mod layout;
mod panel;
mod registry;
mod render;
mod selection;
mod view;

pub use drag::{closest_below, read_order, role_children, ActiveDrag, DragReorder, DRAGGING_CLASS};
pub use engine::{
    EditorOptions, Engine, Palette, ViewEvent, CANVAS_CLASS, PANEL_ROOT_CLASS, SELECTED_CLASS,
};
pub use errors::EditorError;
pub use html::{escape_html, render_document, to_html, HtmlOptions};
pub use ids::{session_seed, IdGenerator};
pub use layout::{Layout, Rect, StackedLayout};
pub use panel::{
    coerce, display_value, render_panel, Control, InputValue, PanelField, SettingsPanel,
    PANEL_CLASS,
};
pub use registry::{
    BlockPlugin, BlockRenderer, EditorPlugin, PluginRef, RegistrationReport, Registry,
    SectionPlugin, SectionRenderer,
};
pub use render::{RenderContext, BLOCK_LIST_CLASS};
pub use selection::{EntityKind, EntityRef, Selection};
pub use view::{Listener, Mount, Node, NodeId, NodeKind, VNode, ViewTree};

// Re-export schema types for convenience
pub use pagecraft_schema::{Block, FieldType, Page, Section, SettingField, Settings};
