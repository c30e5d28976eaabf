//! Refresh-file-list command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::filelist;

#[derive(Args)]
pub struct RefreshArgs {
    /// Source directory the patterns are matched against
    #[arg(long, value_name = "DIR")]
    pub root: PathBuf,

    /// File list to update
    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,

    /// Glob patterns whose matches make up the list
    #[arg(value_name = "PATTERN", required = true)]
    pub patterns: Vec<String>,
}

pub fn run(args: RefreshArgs) -> Result<()> {
    filelist::refresh(&args.root, &args.patterns, &args.output)?;
    Ok(())
}
