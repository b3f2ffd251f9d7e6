//! Subcommand implementations.

pub mod add;
pub mod create;
pub mod delete;
pub mod extract;
pub mod list;
pub mod merge;

use crate::cli::NameArgs;
use zipmill_core::AddOptions;

/// Applies the shared stored-name flags to a fresh options value.
fn add_options_from(names: &NameArgs, no_compression: bool) -> AddOptions {
    let mut options = AddOptions::new()
        .with_remove_all_path(names.remove_all_path)
        .with_no_compression(no_compression);
    if let Some(path) = &names.add_path {
        options = options.with_add_path(path);
    }
    if let Some(path) = &names.remove_path {
        options = options.with_remove_path(path);
    }
    options
}
