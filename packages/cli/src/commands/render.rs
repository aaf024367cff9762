use super::{entity_for, read_page, resolve};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{render_document, Engine, HtmlOptions, Registry};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Page document to render (defaults to every page in the pages directory)
    pub page: Option<PathBuf>,

    /// Keep editor markup and append the settings panel
    #[arg(long)]
    pub editor: bool,

    /// Entity whose settings panel is shown with --editor
    #[arg(long, requires = "editor")]
    pub select: Option<String>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = config.registry()?;

    // A single explicit page fails loudly
    if let Some(page) = &args.page {
        let path = resolve(cwd, page);
        let html = render_page(&path, &args, &config, &registry)?;
        return emit(&path, &html, &args, &config, cwd).map(|_| ());
    }

    let pages_dir = config.get_pages_dir(cwd);
    if !pages_dir.exists() {
        return Err(anyhow!("Pages directory does not exist: {:?}", pages_dir));
    }

    let pages = find_pages(&pages_dir);
    if pages.is_empty() {
        println!("{}", "⚠️  No pages found".yellow());
        return Ok(());
    }

    if !args.stdout {
        println!("{}", "🔨 Rendering pages...".bright_blue().bold());
        println!("Found {} pages", pages.len());
    }

    let mut success_count = 0;
    let mut error_count = 0;

    for path in &pages {
        let relative_path = path.strip_prefix(&pages_dir).unwrap_or(path);
        match render_page(path, &args, &config, &registry)
            .and_then(|html| emit(path, &html, &args, &config, cwd))
        {
            Ok(output) => {
                success_count += 1;
                if let Some(output) = output {
                    println!(
                        "  {} {} → {}",
                        "✓".green(),
                        relative_path.display(),
                        output.display()
                    );
                }
            }
            Err(e) => {
                error_count += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative_path.display(),
                    e.to_string().red()
                );
            }
        }
    }

    if !args.stdout {
        println!();
        if error_count == 0 {
            println!(
                "{} Rendered {} pages successfully",
                "✅".green(),
                success_count
            );
        } else {
            println!(
                "{} Rendered {} pages, {} errors",
                "⚠️".yellow(),
                success_count,
                error_count
            );
        }
    }

    Ok(())
}

/// Render one page document to a complete HTML page
pub fn render_page(
    path: &Path,
    args: &RenderArgs,
    config: &Config,
    registry: &Registry,
) -> Result<String> {
    let page = read_page(path)?;
    for issue in page.check() {
        warn!("{}: {}", path.display(), issue);
    }

    let mut engine = Engine::with_options(registry, config.editor_options());
    engine.load(page);

    let options = if args.editor {
        HtmlOptions::editor()
    } else {
        HtmlOptions::default()
    };

    if let Some(id) = &args.select {
        let entity = entity_for(engine.page(), id)
            .ok_or_else(|| anyhow!("No section or block with id '{}'", id))?;
        engine.select(entity);
    }

    let mut body = engine.render_html(&options);
    if args.editor {
        body.push_str(&engine.panel_html(&options));
    }

    let title = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Page".to_string());
    Ok(render_document(&title, &body, &options))
}

/// Print or write rendered HTML; returns the written path
fn emit(
    page: &Path,
    html: &str,
    args: &RenderArgs,
    config: &Config,
    cwd: &str,
) -> Result<Option<PathBuf>> {
    if args.stdout {
        println!("{}", html);
        return Ok(None);
    }

    let out_dir = match &args.out_dir {
        Some(dir) => PathBuf::from(cwd).join(dir),
        None => config.get_out_dir(cwd),
    };
    fs::create_dir_all(&out_dir)?;

    let file_name = page
        .file_stem()
        .map(|stem| format!("{}.html", stem.to_string_lossy()))
        .unwrap_or_else(|| "index.html".to_string());
    let output_path = out_dir.join(file_name);
    fs::write(&output_path, html)?;
    Ok(Some(output_path))
}

/// Every *.json page under a directory, sorted by path
fn find_pages(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}
