use anyhow::Result;
use blockpress_model::BlockType;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Theme definition file (JSON)
    pub theme: PathBuf,
}

pub fn check(args: CheckArgs) -> Result<()> {
    let theme = super::load_theme(&args.theme)?;
    theme.validate()?;

    println!(
        "{} {} ({})",
        "✓".green(),
        theme.name.bold(),
        theme.slug.dimmed()
    );

    let mut unknown = 0usize;
    for page in &theme.pages {
        let marker = if page.is_home_page { " (home)" } else { "" };
        println!(
            "  {} {} — {} blocks{}",
            "•".blue(),
            page.name,
            page.blocks.len(),
            marker.dimmed()
        );
        for block in &page.blocks {
            if let BlockType::Unknown(name) = &block.block_type {
                unknown += 1;
                println!(
                    "    {} block '{}' has unrecognized type '{}'",
                    "⚠".yellow(),
                    block.id,
                    name
                );
            }
        }
    }

    if unknown > 0 {
        println!(
            "\n{} {} block(s) will render as hidden placeholders",
            "⚠".yellow(),
            unknown
        );
    } else {
        println!("\n{} Theme is valid", "✅".green());
    }
    Ok(())
}
