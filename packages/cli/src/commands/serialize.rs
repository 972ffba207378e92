use super::read_source;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use droplet_parser::parse;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SerializeArgs {
    /// Source file to dump
    pub input: PathBuf,

    /// Print the re-rendered source instead of the bracketed dump
    #[arg(long)]
    pub text: bool,
}

pub fn serialize(args: SerializeArgs, config: &Config) -> Result<()> {
    let source = read_source(&args.input)?;
    let (tree, root) = parse(&source, config.parse_options())?;

    if args.text {
        println!("{}", tree.stringify(root));
    } else {
        println!("{}", tree.serialize(root));
    }
    Ok(())
}
