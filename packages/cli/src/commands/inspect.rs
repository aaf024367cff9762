use super::{read_page, resolve};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::Registry;
use pagecraft_schema::Page;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Page document to inspect
    pub page: PathBuf,

    /// Print the normalized document as JSON instead of an outline
    #[arg(long)]
    pub json: bool,
}

pub fn inspect(args: InspectArgs, cwd: &str) -> Result<()> {
    let path = resolve(cwd, &args.page);
    let page = read_page(&path)?;

    if args.json {
        println!("{}", page.to_json_pretty());
        return Ok(());
    }

    let registry = Config::load(cwd)?.registry()?;

    println!("📄 {}", path.display().to_string().bright_white());
    println!(
        "   {} sections, {} blocks",
        page.sections.len(),
        page.block_count()
    );
    println!();

    for line in outline(&page, &registry) {
        let marker = if line.known { "✓".green() } else { "✗".red() };
        println!("{}{} {}", "  ".repeat(line.depth + 1), marker, line.text);
    }

    let issues = page.check();
    if !issues.is_empty() {
        println!();
        for issue in &issues {
            println!("  {} {}", "⚠️".yellow(), issue);
        }
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineLine {
    pub depth: usize,
    /// Whether the line's type has a registered plugin
    pub known: bool,
    pub text: String,
}

/// Sections in display order with their blocks, flagged by plugin coverage
pub fn outline(page: &Page, registry: &Registry) -> Vec<OutlineLine> {
    let mut lines = Vec::new();

    for id in &page.order {
        let Some(section) = page.section(id) else {
            lines.push(OutlineLine {
                depth: 0,
                known: false,
                text: format!("{} (missing)", id),
            });
            continue;
        };

        lines.push(OutlineLine {
            depth: 0,
            known: registry.section(&section.type_name).is_some(),
            text: format!("{} ({})", section.id, section.type_name),
        });

        for block in section.blocks() {
            let plugin = registry.block(&block.type_name);
            let dynamic = if plugin.is_some_and(|p| p.is_dynamic) {
                " [dynamic]"
            } else {
                ""
            };
            lines.push(OutlineLine {
                depth: 1,
                known: plugin.is_some(),
                text: format!("{} ({}){}", block.id, block.type_name, dynamic),
            });
        }
    }

    lines
}
