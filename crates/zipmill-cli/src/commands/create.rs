//! Create command implementation

use crate::cli::CreateArgs;
use crate::output::OutputFormatter;
use anyhow::Result;
use zipmill_core::{Archive, EntryDescriptor};

pub fn execute(args: &CreateArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let mut options = super::add_options_from(&args.names, args.no_compression);
    if let Some(comment) = &args.comment {
        options = options.with_comment(comment);
    }

    let descriptors: Vec<EntryDescriptor> = args
        .sources
        .iter()
        .map(EntryDescriptor::from_path)
        .collect();

    let archive = Archive::new(&args.archive);
    let entries = archive.create(&descriptors, options)?;
    formatter.format_entries("create", &entries)
}
