//! Extract command implementation

use crate::cli::ExtractArgs;
use crate::output::OutputFormatter;
use anyhow::Result;
use std::io;
use std::path::PathBuf;
use zipmill_core::{Archive, ExtractOptions, ExtractTarget};

pub fn execute(args: &ExtractArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let mut options = ExtractOptions::new()
        .with_remove_all_path(args.names.remove_all_path)
        .with_replace_newer(args.replace_newer)
        .with_stop_on_error(args.stop_on_error);
    if let Some(path) = &args.names.add_path {
        options = options.with_add_path(path);
    }
    if let Some(path) = &args.names.remove_path {
        options = options.with_remove_path(path);
    }
    if let Some(rule) = args.select.rule()? {
        options = options.with_rule(rule);
    }

    let archive = Archive::new(&args.archive);
    let entries = if args.to_stdout {
        let mut stdout = io::stdout().lock();
        archive.extract(ExtractTarget::Writer(&mut stdout), options)?
    } else {
        let dest = args
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        archive.extract(ExtractTarget::Disk(dest), options)?
    };

    if args.to_stdout {
        return Ok(());
    }
    formatter.format_entries("extract", &entries)
}
