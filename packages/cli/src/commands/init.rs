use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_plugins::about_us_page;
use std::fs;
use std::path::PathBuf;

pub const EXAMPLE_PAGE_NAME: &str = "about-us.json";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Pages directory
    #[arg(short, long, default_value = "pages")]
    pub pages_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!(
        "{}",
        "📝 Initializing Pagecraft project...".bright_blue().bold()
    );

    let pages_dir = PathBuf::from(cwd).join(&args.pages_dir);
    if !pages_dir.exists() {
        fs::create_dir_all(&pages_dir)?;
        println!("  {} Created {}/", "✓".green(), args.pages_dir);
    }

    let example_file = pages_dir.join(EXAMPLE_PAGE_NAME);
    if !example_file.exists() {
        fs::write(&example_file, about_us_page().to_json_pretty())?;
        println!("  {} Created {}", "✓".green(), EXAMPLE_PAGE_NAME);
    }

    let config = Config {
        pages_dir: args.pages_dir.clone(),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}/{}", args.pages_dir, EXAMPLE_PAGE_NAME);
    println!("  2. Run: pagecraft render");
    println!("  3. Check output in {}/", config.out_dir);

    Ok(())
}
