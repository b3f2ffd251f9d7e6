//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

use zipmill_core::SelectionRule;

#[derive(Parser)]
#[command(name = "zipmill")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new archive from files and directories
    Create(CreateArgs),
    /// Append entries to an existing archive
    Add(AddArgs),
    /// List archive contents without extraction
    List(ListArgs),
    /// Extract archive contents
    Extract(ExtractArgs),
    /// Remove entries from an archive
    Delete(DeleteArgs),
    /// Append the contents of another archive
    Merge(MergeArgs),
}

/// Stored-name transform flags shared by create and add.
#[derive(clap::Args)]
pub struct NameArgs {
    /// Prefix to prepend to stored names
    #[arg(long, value_name = "PATH")]
    pub add_path: Option<String>,

    /// Prefix to strip from stored names
    #[arg(long, value_name = "PATH", conflicts_with = "remove_all_path")]
    pub remove_path: Option<String>,

    /// Strip all directory components from stored names
    #[arg(long)]
    pub remove_all_path: bool,
}

/// Entry selection flags shared by extract and delete.
#[derive(clap::Args)]
pub struct SelectArgs {
    /// Select by exact stored name, or a directory subtree with a
    /// trailing slash (repeatable)
    #[arg(long = "by-name", value_name = "NAME")]
    pub by_name: Vec<String>,

    /// Select by regex searched anywhere in the stored name
    #[arg(
        long = "by-pattern",
        value_name = "REGEX",
        conflicts_with_all = ["by_name", "by_index"]
    )]
    pub by_pattern: Option<String>,

    /// Select by index ranges, e.g. "0,3-5,8"
    #[arg(long = "by-index", value_name = "SPEC", conflicts_with = "by_name")]
    pub by_index: Option<String>,
}

impl SelectArgs {
    /// Builds the selection rule these flags describe, if any.
    pub fn rule(&self) -> anyhow::Result<Option<SelectionRule>> {
        if !self.by_name.is_empty() {
            return Ok(Some(SelectionRule::ByName(self.by_name.clone())));
        }
        if let Some(pattern) = &self.by_pattern {
            return Ok(Some(SelectionRule::by_pattern(pattern)?));
        }
        if let Some(spec) = &self.by_index {
            return Ok(Some(SelectionRule::by_index_spec(spec)?));
        }
        Ok(None)
    }
}

#[derive(clap::Args)]
pub struct CreateArgs {
    /// Output archive file path
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Source files or directories to archive
    #[arg(value_name = "SOURCE", required = true)]
    pub sources: Vec<PathBuf>,

    #[command(flatten)]
    pub names: NameArgs,

    /// Store entries without compressing them
    #[arg(long)]
    pub no_compression: bool,

    /// Archive-level comment
    #[arg(long, value_name = "TEXT")]
    pub comment: Option<String>,
}

#[derive(clap::Args)]
pub struct AddArgs {
    /// Archive file path (created if absent)
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Source files or directories to append
    #[arg(value_name = "SOURCE", required = true)]
    pub sources: Vec<PathBuf>,

    #[command(flatten)]
    pub names: NameArgs,

    /// Store entries without compressing them
    #[arg(long)]
    pub no_compression: bool,

    /// Replace the archive-level comment
    #[arg(long, value_name = "TEXT")]
    pub comment: Option<String>,

    /// Append to the archive-level comment
    #[arg(long, value_name = "TEXT")]
    pub add_comment: Option<String>,

    /// Prepend to the archive-level comment
    #[arg(long, value_name = "TEXT")]
    pub prepend_comment: Option<String>,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory (default: current directory)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub names: NameArgs,

    #[command(flatten)]
    pub select: SelectArgs,

    /// Overwrite destination files that are newer than the entry
    #[arg(long)]
    pub replace_newer: bool,

    /// Abort on the first per-entry failure
    #[arg(long)]
    pub stop_on_error: bool,

    /// Stream decompressed content to stdout instead of writing files
    #[arg(long, conflicts_with = "output_dir")]
    pub to_stdout: bool,
}

#[derive(clap::Args)]
pub struct DeleteArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    #[command(flatten)]
    pub select: SelectArgs,
}

#[derive(clap::Args)]
pub struct MergeArgs {
    /// Archive that receives the merged content
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Archive whose entries are appended
    #[arg(value_name = "OTHER")]
    pub other: PathBuf,
}
