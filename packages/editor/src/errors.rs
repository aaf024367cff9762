//! Error types for the editor

use crate::selection::{EntityKind, EntityRef};
use thiserror::Error;

/// Internal failure of an engine step.
///
/// Public engine operations never return these; they log and degrade to a
/// no-op instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("No renderer for {kind}: {type_name}")]
    UnknownPlugin { kind: EntityKind, type_name: String },

    #[error("Section not found: {0}")]
    SectionNotFound(String),

    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("No view node for {0}")]
    MissingNode(EntityRef),

    #[error("Section {0} renders no block list")]
    MissingBlockList(String),

    #[error("Nothing selected")]
    NoSelection,

    #[error("Unknown setting: {0}")]
    UnknownField(String),
}
