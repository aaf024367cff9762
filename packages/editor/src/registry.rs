//! # Plugin Registry
//!
//! Maps a plugin type key to its renderer and metadata.
//!
//! Registration is write-once per key: when a type is already registered
//! for its kind, the later item is skipped with a warning and the first
//! registration stays in effect. There is no unregister. A `Registry` is an
//! ordinary value owned by the host and borrowed by every engine using it.

use crate::render::RenderContext;
use crate::selection::EntityKind;
use crate::view::VNode;
use pagecraft_schema::{Block, Section, SettingField, Settings};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

/// Renders a section. Sections that embed blocks call
/// [`RenderContext::render_blocks`].
pub trait SectionRenderer {
    fn render(&self, section: &Section, ctx: &RenderContext<'_>) -> VNode;
}

impl<F> SectionRenderer for F
where
    F: Fn(&Section, &RenderContext<'_>) -> VNode,
{
    fn render(&self, section: &Section, ctx: &RenderContext<'_>) -> VNode {
        self(section, ctx)
    }
}

/// Renders a block
pub trait BlockRenderer {
    fn render(&self, block: &Block) -> VNode;
}

impl<F> BlockRenderer for F
where
    F: Fn(&Block) -> VNode,
{
    fn render(&self, block: &Block) -> VNode {
        self(block)
    }
}

pub struct SectionPlugin {
    pub type_name: String,
    pub renderer: Box<dyn SectionRenderer>,
    pub default_settings: Settings,
    pub settings_schema: Vec<SettingField>,
}

pub struct BlockPlugin {
    pub type_name: String,
    pub renderer: Box<dyn BlockRenderer>,
    pub default_settings: Settings,
    pub settings_schema: Vec<SettingField>,
    /// Rendered node holds interactive state; never rebuilt on settings edits
    pub is_dynamic: bool,
}

/// Named bundle of section and block plugins
pub struct EditorPlugin {
    pub name: String,
    pub sections: Vec<SectionPlugin>,
    pub blocks: Vec<BlockPlugin>,
}

impl SectionPlugin {
    pub fn new(type_name: impl Into<String>, renderer: impl SectionRenderer + 'static) -> Self {
        Self {
            type_name: type_name.into(),
            renderer: Box::new(renderer),
            default_settings: Settings::new(),
            settings_schema: Vec::new(),
        }
    }

    /// Defaults given as a JSON object; anything else is ignored
    pub fn with_defaults(mut self, defaults: Value) -> Self {
        self.default_settings = into_settings(&self.type_name, defaults);
        self
    }

    pub fn with_schema(mut self, schema: Vec<SettingField>) -> Self {
        self.settings_schema = schema;
        self
    }
}

impl BlockPlugin {
    pub fn new(type_name: impl Into<String>, renderer: impl BlockRenderer + 'static) -> Self {
        Self {
            type_name: type_name.into(),
            renderer: Box::new(renderer),
            default_settings: Settings::new(),
            settings_schema: Vec::new(),
            is_dynamic: false,
        }
    }

    pub fn with_defaults(mut self, defaults: Value) -> Self {
        self.default_settings = into_settings(&self.type_name, defaults);
        self
    }

    pub fn with_schema(mut self, schema: Vec<SettingField>) -> Self {
        self.settings_schema = schema;
        self
    }

    pub fn dynamic(mut self) -> Self {
        self.is_dynamic = true;
        self
    }
}

impl EditorPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn with_section(mut self, section: SectionPlugin) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_block(mut self, block: BlockPlugin) -> Self {
        self.blocks.push(block);
        self
    }
}

fn into_settings(type_name: &str, value: Value) -> Settings {
    match value {
        Value::Object(map) => map,
        Value::Null => Settings::new(),
        other => {
            warn!("Ignoring non-object default settings for {}: {}", type_name, other);
            Settings::new()
        }
    }
}

impl fmt::Debug for SectionPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionPlugin")
            .field("type_name", &self.type_name)
            .field("default_settings", &self.default_settings)
            .field("settings_schema", &self.settings_schema.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for BlockPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockPlugin")
            .field("type_name", &self.type_name)
            .field("default_settings", &self.default_settings)
            .field("settings_schema", &self.settings_schema.len())
            .field("is_dynamic", &self.is_dynamic)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for EditorPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorPlugin")
            .field("name", &self.name)
            .field("sections", &self.sections)
            .field("blocks", &self.blocks)
            .finish()
    }
}

/// Borrowed view of either plugin variant
#[derive(Debug, Clone, Copy)]
pub enum PluginRef<'a> {
    Section(&'a SectionPlugin),
    Block(&'a BlockPlugin),
}

impl<'a> PluginRef<'a> {
    pub fn kind(&self) -> EntityKind {
        match self {
            PluginRef::Section(_) => EntityKind::Section,
            PluginRef::Block(_) => EntityKind::Block,
        }
    }

    pub fn type_name(&self) -> &'a str {
        match self {
            PluginRef::Section(p) => &p.type_name,
            PluginRef::Block(p) => &p.type_name,
        }
    }

    pub fn settings_schema(&self) -> &'a [SettingField] {
        match self {
            PluginRef::Section(p) => &p.settings_schema,
            PluginRef::Block(p) => &p.settings_schema,
        }
    }

    pub fn default_settings(&self) -> &'a Settings {
        match self {
            PluginRef::Section(p) => &p.default_settings,
            PluginRef::Block(p) => &p.default_settings,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, PluginRef::Block(p) if p.is_dynamic)
    }
}

/// Outcome of registering one plugin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    pub plugin: String,
    pub accepted: Vec<(EntityKind, String)>,
    /// Types already registered by an earlier plugin
    pub skipped: Vec<(EntityKind, String)>,
}

#[derive(Debug, Default)]
pub struct Registry {
    sections: Vec<SectionPlugin>,
    section_index: HashMap<String, usize>,
    blocks: Vec<BlockPlugin>,
    block_index: HashMap<String, usize>,
    plugins: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every section and block of a plugin; first registration wins
    pub fn register(&mut self, plugin: EditorPlugin) -> RegistrationReport {
        let EditorPlugin {
            name,
            sections,
            blocks,
        } = plugin;
        let mut report = RegistrationReport {
            plugin: name.clone(),
            ..Default::default()
        };

        for block in blocks {
            if self.block_index.contains_key(&block.type_name) {
                warn!("Block already registered: {}", block.type_name);
                report.skipped.push((EntityKind::Block, block.type_name));
                continue;
            }
            report
                .accepted
                .push((EntityKind::Block, block.type_name.clone()));
            self.block_index
                .insert(block.type_name.clone(), self.blocks.len());
            self.blocks.push(block);
        }

        for section in sections {
            if self.section_index.contains_key(&section.type_name) {
                warn!("Section already registered: {}", section.type_name);
                report.skipped.push((EntityKind::Section, section.type_name));
                continue;
            }
            report
                .accepted
                .push((EntityKind::Section, section.type_name.clone()));
            self.section_index
                .insert(section.type_name.clone(), self.sections.len());
            self.sections.push(section);
        }

        info!("Plugin loaded: {}", name);
        self.plugins.push(name);
        report
    }

    pub fn section(&self, type_name: &str) -> Option<&SectionPlugin> {
        self.section_index
            .get(type_name)
            .map(|index| &self.sections[*index])
    }

    pub fn block(&self, type_name: &str) -> Option<&BlockPlugin> {
        self.block_index
            .get(type_name)
            .map(|index| &self.blocks[*index])
    }

    pub fn get(&self, kind: EntityKind, type_name: &str) -> Option<PluginRef<'_>> {
        match kind {
            EntityKind::Section => self.section(type_name).map(PluginRef::Section),
            EntityKind::Block => self.block(type_name).map(PluginRef::Block),
        }
    }

    /// Section plugins in registration order
    pub fn list_sections(&self) -> &[SectionPlugin] {
        &self.sections
    }

    /// Block plugins in registration order
    pub fn list_blocks(&self) -> &[BlockPlugin] {
        &self.blocks
    }

    pub fn list_all(&self, kind: EntityKind) -> Vec<PluginRef<'_>> {
        match kind {
            EntityKind::Section => self.sections.iter().map(PluginRef::Section).collect(),
            EntityKind::Block => self.blocks.iter().map(PluginRef::Block).collect(),
        }
    }

    /// Names of loaded plugins, in load order
    pub fn plugin_names(&self) -> &[String] {
        &self.plugins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bare_section(_: &Section, _: &RenderContext<'_>) -> VNode {
        VNode::element("section")
    }

    fn paragraph(label: &'static str) -> BlockPlugin {
        BlockPlugin::new("text", move |_: &Block| VNode::element("p").with_text(label))
    }

    #[test]
    fn test_first_registration_wins() {
        let mut registry = Registry::new();
        registry.register(EditorPlugin::new("Core").with_block(paragraph("first")));
        let report = registry.register(EditorPlugin::new("Late").with_block(paragraph("second")));

        assert_eq!(report.skipped, vec![(EntityKind::Block, "text".to_string())]);
        assert!(report.accepted.is_empty());

        let rendered = registry
            .block("text")
            .unwrap()
            .renderer
            .render(&Block::new("b1", "text"));
        assert_eq!(rendered, VNode::element("p").with_text("first"));
        assert_eq!(registry.list_blocks().len(), 1);
        assert_eq!(registry.plugin_names(), &["Core", "Late"]);
    }

    #[test]
    fn test_section_and_block_keys_are_independent() {
        let mut registry = Registry::new();
        registry.register(
            EditorPlugin::new("Mixed")
                .with_block(paragraph("block"))
                .with_section(SectionPlugin::new("text", bare_section)),
        );

        assert!(registry.get(EntityKind::Section, "text").is_some());
        assert!(registry.get(EntityKind::Block, "text").is_some());
        assert!(registry.get(EntityKind::Block, "missing").is_none());
    }

    #[test]
    fn test_defaults_must_be_objects() {
        let plugin = paragraph("x").with_defaults(json!({ "text": "Your text here" }));
        assert_eq!(plugin.default_settings["text"], "Your text here");

        let plugin = paragraph("x").with_defaults(json!("nope"));
        assert!(plugin.default_settings.is_empty());
    }

    #[test]
    fn test_list_all_keeps_registration_order() {
        let mut registry = Registry::new();
        registry.register(
            EditorPlugin::new("Blocks")
                .with_block(BlockPlugin::new("b", |_: &Block| VNode::element("p")))
                .with_block(BlockPlugin::new("a", |_: &Block| VNode::element("p")).dynamic()),
        );

        let all = registry.list_all(EntityKind::Block);
        let names: Vec<_> = all.iter().map(|p| p.type_name()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(all[1].is_dynamic());
        assert!(!all[0].is_dynamic());
    }
}
