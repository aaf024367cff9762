use serde::{Deserialize, Serialize};
use std::fmt;

/// Which half of the document an entity or plugin lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Section,
    Block,
}

impl EntityKind {
    /// Role marker class carried by reorderable nodes of this kind
    pub fn role_class(self) -> &'static str {
        match self {
            EntityKind::Section => "editor-section",
            EntityKind::Block => "editor-block",
        }
    }

    /// Data tag holding the entity id on its node
    pub fn id_tag(self) -> &'static str {
        match self {
            EntityKind::Section => "section-id",
            EntityKind::Block => "block-id",
        }
    }

    /// Data tag holding the plugin type on its node
    pub fn type_tag(self) -> &'static str {
        match self {
            EntityKind::Section => "section-type",
            EntityKind::Block => "block-type",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Section => f.write_str("section"),
            EntityKind::Block => f.write_str("block"),
        }
    }
}

/// Tagged reference to one section or block
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum EntityRef {
    Section(String),
    Block(String),
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Section(_) => EntityKind::Section,
            EntityRef::Block(_) => EntityKind::Block,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            EntityRef::Section(id) | EntityRef::Block(id) => id,
        }
    }

    pub fn is_section(&self, id: &str) -> bool {
        matches!(self, EntityRef::Section(s) if s == id)
    }

    pub fn is_block(&self, id: &str) -> bool {
        matches!(self, EntityRef::Block(b) if b == id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.id())
    }
}

/// The entity whose settings panel is shown, if any
pub type Selection = Option<EntityRef>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ref_json_shape() {
        let json = serde_json::to_value(EntityRef::Block("b1".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "block", "id": "b1" }));
    }

    #[test]
    fn test_role_markers() {
        assert_eq!(EntityKind::Section.role_class(), "editor-section");
        assert_eq!(EntityKind::Block.id_tag(), "block-id");
        assert_eq!(
            EntityRef::Section("s1".into()).to_string(),
            "section 's1'"
        );
    }
}
