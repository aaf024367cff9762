//! # Pagecraft Schema
//!
//! Shape of a page document and of the setting schemas plugins declare.
//!
//! ```text
//! Page
//!  ├─ order: [section id]          render order
//!  └─ sections: { id → Section }
//!                  ├─ settings      free-form JSON object
//!                  └─ blocks: [Block]
//!                                ├─ settings
//! ```
//!
//! The JSON format is both the load input and the serialize output of the
//! editor, so every type here round-trips losslessly, including setting keys
//! no plugin knows about.

mod error;
mod field;
mod page;

pub use error::{ConsistencyIssue, SchemaError};
pub use field::{FieldType, SettingField};
pub use page::{Block, Page, Section, Settings};
