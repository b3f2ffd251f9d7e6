//! Add command implementation

use crate::cli::AddArgs;
use crate::output::OutputFormatter;
use anyhow::Result;
use zipmill_core::{Archive, EntryDescriptor};

pub fn execute(args: &AddArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let mut options = super::add_options_from(&args.names, args.no_compression);
    if let Some(comment) = &args.comment {
        options = options.with_comment(comment);
    }
    if let Some(comment) = &args.add_comment {
        options = options.with_add_comment(comment);
    }
    if let Some(comment) = &args.prepend_comment {
        options = options.with_prepend_comment(comment);
    }

    let descriptors: Vec<EntryDescriptor> = args
        .sources
        .iter()
        .map(EntryDescriptor::from_path)
        .collect();

    let archive = Archive::new(&args.archive);
    let entries = archive.add(&descriptors, options)?;
    formatter.format_entries("add", &entries)
}
