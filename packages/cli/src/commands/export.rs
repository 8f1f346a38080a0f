use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Theme definition file (JSON)
    pub theme: PathBuf,

    /// Output archive path (defaults to <slug>.zip)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn export(args: ExportArgs) -> Result<()> {
    let theme = super::load_theme(&args.theme)?;

    println!(
        "{}",
        format!("📦 Exporting '{}'...", theme.name).bright_blue().bold()
    );

    let bytes = blockpress_packager::export(&theme)?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.zip", theme.slug)));

    std::fs::write(&output, &bytes)
        .with_context(|| format!("cannot write archive to {}", output.display()))?;

    println!(
        "{} Exported {} ({} bytes) → {}",
        "✅".green(),
        theme.name.bold(),
        bytes.len(),
        output.display()
    );
    Ok(())
}
