//! assetman: Generate Ninja build graphs from declarative asset pipelines
//!
//! Reads the pipeline description in the source directory and writes
//! `build.ninja` into the current directory.

use anyhow::Result;

fn main() -> Result<()> {
    assetman::cli::run()
}
