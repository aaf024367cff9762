use anyhow::{anyhow, Result};
use pagecraft_editor::{EditorOptions, Registry};
use pagecraft_plugins::{register_bundled, BUNDLED};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "pagecraft.config.json";

/// Pagecraft configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory containing page documents (*.json)
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    /// Output directory for rendered HTML
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Bundled plugins to register, in order
    #[serde(default = "default_plugins")]
    pub plugins: Vec<String>,

    /// Seeds ids generated by `edit`
    #[serde(default = "default_session")]
    pub session: String,
}

fn default_pages_dir() -> String {
    "pages".to_string()
}

fn default_out_dir() -> String {
    "dist".to_string()
}

fn default_plugins() -> Vec<String> {
    BUNDLED.iter().map(|key| key.to_string()).collect()
}

fn default_session() -> String {
    EditorOptions::default().session
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| anyhow!("Invalid {}: {}", DEFAULT_CONFIG_NAME, e))?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn get_pages_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.pages_dir)
    }

    pub fn get_out_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.out_dir)
    }

    /// Registry holding the configured plugins
    pub fn registry(&self) -> Result<Registry> {
        let mut registry = Registry::new();
        register_bundled(&mut registry, self.plugins.as_slice())
            .map_err(|e| anyhow!("{} (available: {})", e, BUNDLED.join(", ")))?;
        Ok(registry)
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            session: self.session.clone(),
            ..EditorOptions::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pages_dir: default_pages_dir(),
            out_dir: default_out_dir(),
            plugins: default_plugins(),
            session: default_session(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "pagesDir": "content",
            "outDir": "public",
            "plugins": ["core-blocks"],
            "session": "docs"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.pages_dir, "content");
        assert_eq!(config.out_dir, "public");
        assert_eq!(config.plugins, vec!["core-blocks"]);
        assert_eq!(config.editor_options().session, "docs");
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.pages_dir, "pages");
        assert_eq!(config.out_dir, "dist");
        assert_eq!(config.plugins, vec!["core-sections", "core-blocks", "quote"]);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();
        assert_eq!(Config::load(cwd).unwrap(), Config::default());

        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "plugins": ["quote"] }"#)
            .unwrap();
        let config = Config::load(cwd).unwrap();
        assert_eq!(config.plugins, vec!["quote"]);
        assert_eq!(config.registry().unwrap().list_blocks().len(), 1);
    }

    #[test]
    fn test_unknown_plugin_is_an_error() {
        let config = Config {
            plugins: vec!["gallery".to_string()],
            ..Config::default()
        };
        let err = config.registry().unwrap_err().to_string();
        assert!(err.contains("gallery"));
        assert!(err.contains("core-sections"));
    }
}
