//! List command implementation

use crate::cli::ListArgs;
use crate::output::OutputFormatter;
use anyhow::Result;
use zipmill_core::Archive;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let archive = Archive::new(&args.archive);
    let entries = archive.list()?;
    formatter.format_entries("list", &entries)?;
    formatter.format_properties(&archive.properties()?)
}
