//! Merge command implementation

use crate::cli::MergeArgs;
use crate::output::OutputFormatter;
use anyhow::Result;
use zipmill_core::Archive;

pub fn execute(args: &MergeArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let archive = Archive::new(&args.archive);
    archive.merge(&Archive::new(&args.other))?;
    formatter.format_success(&format!(
        "merged {} into {}",
        args.other.display(),
        args.archive.display()
    ))
}
