//! # Pagecraft Plugins
//!
//! Bundled section and block plugins.
//!
//! ```text
//! core-sections  container, rich-text, featured-collection, contact-form
//! core-blocks    text, image, link, button, table (dynamic)
//! quote          quote
//! ```
//!
//! Plugins are looked up by their bundle key and registered in the order
//! given; the first plugin to claim a type keeps it.

pub mod core_blocks;
pub mod core_sections;
mod example;
pub mod quote;
pub mod styles;

pub use example::about_us_page;
pub use styles::{apply_base_styles, base_style_schema};

use pagecraft_editor::{EditorPlugin, RegistrationReport, Registry};
use thiserror::Error;
use tracing::debug;

/// Bundle keys, in default registration order
pub const BUNDLED: &[&str] = &["core-sections", "core-blocks", "quote"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    #[error("Unknown plugin: {0}")]
    Unknown(String),
}

/// Build a bundled plugin by key
pub fn bundled(key: &str) -> Option<EditorPlugin> {
    match key {
        "core-sections" => Some(core_sections::plugin()),
        "core-blocks" => Some(core_blocks::plugin()),
        "quote" => Some(quote::plugin()),
        _ => None,
    }
}

/// Register bundled plugins in order. Nothing is registered if any key is
/// unknown.
pub fn register_bundled<S: AsRef<str>>(
    registry: &mut Registry,
    keys: &[S],
) -> Result<Vec<RegistrationReport>, PluginError> {
    let plugins = keys
        .iter()
        .map(|key| bundled(key.as_ref()).ok_or_else(|| PluginError::Unknown(key.as_ref().into())))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(plugins
        .into_iter()
        .map(|plugin| {
            let report = registry.register(plugin);
            debug!(
                "{}: {} accepted, {} skipped",
                report.plugin,
                report.accepted.len(),
                report.skipped.len()
            );
            report
        })
        .collect())
}

/// Registry with every bundled plugin
pub fn default_registry() -> Registry {
    let mut registry = Registry::new();
    for key in BUNDLED {
        if let Some(plugin) = bundled(key) {
            registry.register(plugin);
        }
    }
    registry
}
