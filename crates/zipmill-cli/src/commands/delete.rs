//! Delete command implementation

use crate::cli::DeleteArgs;
use crate::output::OutputFormatter;
use anyhow::Result;
use zipmill_core::{Archive, DeleteOptions};

pub fn execute(args: &DeleteArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let mut options = DeleteOptions::new();
    if let Some(rule) = args.select.rule()? {
        options = options.with_rule(rule);
    }

    let archive = Archive::new(&args.archive);
    let remaining = archive.delete(&options)?;
    formatter.format_entries("remaining", &remaining)
}
