pub mod edit;
pub mod init;
pub mod inspect;
pub mod plugins;
pub mod render;

pub use edit::{edit, EditArgs};
pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};
pub use plugins::plugins;
pub use render::{render, RenderArgs};

use anyhow::{anyhow, Result};
use pagecraft_editor::EntityRef;
use pagecraft_schema::Page;
use std::path::{Path, PathBuf};

/// Resolve a page argument against the working directory
pub(crate) fn resolve(cwd: &str, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        PathBuf::from(cwd).join(path)
    }
}

/// Read and parse a page document
pub(crate) fn read_page(path: &Path) -> Result<Page> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Cannot read {}: {}", path.display(), e))?;
    Page::from_json(&source).map_err(|e| anyhow!("{}: {}", path.display(), e))
}

/// Entity an id refers to; sections take precedence over blocks
pub(crate) fn entity_for(page: &Page, id: &str) -> Option<EntityRef> {
    if page.section(id).is_some() {
        Some(EntityRef::Section(id.to_string()))
    } else if page.find_block(id).is_some() {
        Some(EntityRef::Block(id.to_string()))
    } else {
        None
    }
}
