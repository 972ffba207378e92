mod commands;
mod config;
mod svg;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, layout, serialize, CheckArgs, LayoutArgs, SerializeArgs};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Droplet CLI - lay out and check block-editor documents
#[derive(Parser, Debug)]
#[command(name = "droplet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to droplet.config.json in the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lay out a document and print its geometry (json) or a rendering (svg)
    Layout(LayoutArgs),

    /// Parse files strictly and verify they round-trip
    Check(CheckArgs),

    /// Print the bracketed debug dump of a document
    Serialize(SerializeArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| Config::load(&cwd, cli.config.as_deref()))
        .and_then(|config| match cli.command {
            Command::Layout(args) => layout(args, &config),
            Command::Check(args) => check(args, &config),
            Command::Serialize(args) => serialize(args, &config),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
