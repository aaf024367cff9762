//! # Page Document
//!
//! The persistent source of truth the editor keeps consistent with its view.
//!
//! `order` defines render order and is rewritten by reorders; `sections`
//! owns every section, and each section owns its blocks. A block belongs to
//! exactly one section at a time.

use crate::{ConsistencyIssue, SchemaError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

/// Free-form key/value configuration of a section or block
pub type Settings = Map<String, Value>;

/// Leaf content unit nested inside a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,

    /// Plugin key
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub settings: Settings,
}

/// Top-level page region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,

    /// Plugin key
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub settings: Settings,

    /// `None` and `Some(vec![])` are distinct so both round-trip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Block>>,
}

/// Page document: ordered sections with nested blocks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub order: Vec<String>,

    /// Keyed by id and written out sorted; `order` is the display order
    #[serde(default)]
    pub sections: BTreeMap<String, Section>,
}

impl Block {
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            settings: Settings::new(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// String setting, if present, a string and not empty
    pub fn setting_str(&self, key: &str) -> Option<&str> {
        non_empty_str(&self.settings, key)
    }
}

impl Section {
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            settings: Settings::new(),
            blocks: None,
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = Some(blocks);
        self
    }

    pub fn blocks(&self) -> &[Block] {
        self.blocks.as_deref().unwrap_or_default()
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks().iter().find(|b| b.id == id)
    }

    pub fn block_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.as_mut()?.iter_mut().find(|b| b.id == id)
    }

    /// String setting, if present, a string and not empty
    pub fn setting_str(&self, key: &str) -> Option<&str> {
        non_empty_str(&self.settings, key)
    }
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a page from JSON text
    pub fn from_json(source: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Build a page from an already-parsed JSON value
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        if !value.is_object() {
            return Err(SchemaError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Value {
        // Maps with string keys and JSON values always serialize
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Append a section at the end of the render order
    pub fn push_section(&mut self, section: Section) {
        self.order.push(section.id.clone());
        self.sections.insert(section.id.clone(), section);
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.get(id)
    }

    pub fn section_mut(&mut self, id: &str) -> Option<&mut Section> {
        self.sections.get_mut(id)
    }

    /// Sections in render order; dangling ids are skipped
    pub fn ordered_sections(&self) -> impl Iterator<Item = &Section> {
        self.order.iter().filter_map(|id| self.sections.get(id))
    }

    /// Locate a block and the section that owns it
    pub fn find_block(&self, id: &str) -> Option<(&Section, &Block)> {
        self.sections
            .values()
            .find_map(|section| section.block(id).map(|block| (section, block)))
    }

    pub fn block_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.sections
            .values_mut()
            .find_map(|section| section.block_mut(id))
    }

    /// Id of the section owning a block
    pub fn block_owner(&self, id: &str) -> Option<&str> {
        self.find_block(id).map(|(section, _)| section.id.as_str())
    }

    /// True if any section or block already uses this id
    pub fn contains_id(&self, id: &str) -> bool {
        self.sections.contains_key(id) || self.find_block(id).is_some()
    }

    pub fn block_count(&self) -> usize {
        self.sections.values().map(|s| s.blocks().len()).sum()
    }

    /// Report inconsistencies without rejecting the page
    pub fn check(&self) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();
        let ordered: HashSet<&str> = self.order.iter().map(String::as_str).collect();

        for id in &self.order {
            if !self.sections.contains_key(id) {
                issues.push(ConsistencyIssue::DanglingOrderId(id.clone()));
            }
        }

        let mut seen = HashSet::new();
        for (key, section) in &self.sections {
            if key != &section.id {
                issues.push(ConsistencyIssue::IdMismatch {
                    key: key.clone(),
                    id: section.id.clone(),
                });
            }
            if !ordered.contains(key.as_str()) {
                issues.push(ConsistencyIssue::UnorderedSection(key.clone()));
            }
            if !seen.insert(section.id.as_str()) {
                issues.push(ConsistencyIssue::DuplicateId(section.id.clone()));
            }
            for block in section.blocks() {
                if !seen.insert(block.id.as_str()) {
                    issues.push(ConsistencyIssue::DuplicateId(block.id.clone()));
                }
            }
        }

        issues
    }
}

fn non_empty_str<'a>(settings: &'a Settings, key: &str) -> Option<&'a str> {
    settings
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
