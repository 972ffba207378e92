use super::read_source;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use droplet_parser::{parse, ParseError, ParseOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Source file or directory to check
    pub input: PathBuf,

    /// Also list files that pass
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, PartialEq)]
enum Outcome {
    Ok,
    Parse(ParseError),
    /// Reparsing the rendered text changed it
    Unstable { first: String, second: String },
}

pub fn check(args: CheckArgs, config: &Config) -> Result<()> {
    let files = if args.input.is_file() {
        vec![args.input.clone()]
    } else if args.input.is_dir() {
        find_source_files(&args.input, config)
    } else {
        return Err(anyhow!("Input path does not exist: {}", args.input.display()));
    };

    let options = ParseOptions {
        throw_error: true,
        ..config.parse_options()
    };
    let mut failures = 0;
    info!(files = files.len(), input = %args.input.display(), "checking sources");

    for file in &files {
        let source = read_source(file)?;
        debug!(file = %file.display(), bytes = source.len(), "checking");
        match check_source(&source, options) {
            Outcome::Ok => {
                if args.verbose {
                    println!("{} {}", "✓".green(), file.display());
                }
            }
            Outcome::Parse(err) => {
                failures += 1;
                let location = match err.column() {
                    Some(column) => format!("{}:{}:{}", file.display(), err.line(), column),
                    None => format!("{}:{}", file.display(), err.line()),
                };
                eprintln!("{} {} {}", "✗".red(), location, err.to_string().red());
            }
            Outcome::Unstable { first, second } => {
                failures += 1;
                eprintln!(
                    "{} {} {}",
                    "✗".red(),
                    file.display(),
                    "does not round-trip".red()
                );
                eprintln!("    {} {:?}", "first: ".dimmed(), first);
                eprintln!("    {} {:?}", "second:".dimmed(), second);
            }
        }
    }

    println!();
    if failures > 0 {
        return Err(anyhow!("{} of {} files failed", failures, files.len()));
    }
    println!("{} Checked {} files", "✓".green(), files.len());
    Ok(())
}

fn check_source(source: &str, options: ParseOptions) -> Outcome {
    let first = match parse(source, options) {
        Ok((tree, root)) => tree.stringify(root),
        Err(err) => return Outcome::Parse(err),
    };
    let second = match parse(&first, options) {
        Ok((tree, root)) => tree.stringify(root),
        Err(err) => return Outcome::Parse(err),
    };

    if first == second {
        Outcome::Ok
    } else {
        Outcome::Unstable { first, second }
    }
}

fn find_source_files(dir: &Path, config: &Config) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && config.matches_extension(path))
        .collect();
    files.sort();
    files
}
