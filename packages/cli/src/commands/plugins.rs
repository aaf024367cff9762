use crate::config::Config;
use anyhow::Result;
use colored::Colorize;
use pagecraft_editor::{EntityKind, Registry};

pub fn plugins(cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = config.registry()?;

    println!(
        "🧩 {} {}",
        "Plugins:".bright_blue().bold(),
        registry.plugin_names().join(", ")
    );

    for kind in [EntityKind::Section, EntityKind::Block] {
        println!();
        println!("{}", heading(kind).bold());
        for line in palette_lines(&registry, kind) {
            println!("  {}", line);
        }
    }

    Ok(())
}

fn heading(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Section => "Sections",
        EntityKind::Block => "Blocks",
    }
}

/// One line per insertable type: name, visible setting count, dynamic flag
pub fn palette_lines(registry: &Registry, kind: EntityKind) -> Vec<String> {
    registry
        .list_all(kind)
        .into_iter()
        .map(|plugin| {
            let visible = plugin
                .settings_schema()
                .iter()
                .filter(|field| !field.hidden)
                .count();
            let dynamic = if plugin.is_dynamic() { ", dynamic" } else { "" };
            format!("{} ({} settings{})", plugin.type_name(), visible, dynamic)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_plugins::default_registry;

    #[test]
    fn test_palette_lines() {
        let registry = default_registry();
        let blocks = palette_lines(&registry, EntityKind::Block);
        assert_eq!(blocks[0], "text (1 settings)");
        assert!(blocks.contains(&"table (2 settings, dynamic)".to_string()));

        let sections = palette_lines(&registry, EntityKind::Section);
        assert_eq!(sections.len(), 4);
        assert_eq!(sections[1], "rich-text (1 settings)");
    }
}
