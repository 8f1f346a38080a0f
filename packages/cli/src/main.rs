mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, export, install, CheckArgs, ExportArgs, InstallArgs};

/// Blockpress CLI - compile block-based themes into deployable packages
#[derive(Parser, Debug)]
#[command(name = "blockpress")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a theme file and summarize its contents
    Check(CheckArgs),

    /// Compile a theme and install it into a themes directory
    Install(InstallArgs),

    /// Compile a theme into a portable .zip archive
    Export(ExportArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let result = match cli.command {
        Command::Check(args) => check(args),
        Command::Install(args) => install(args),
        Command::Export(args) => export(args),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
