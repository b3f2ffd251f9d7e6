//! Human-readable output formatter.

use super::formatter::OutputFormatter;
use anyhow::Result;
use zipmill_core::{ArchiveProperties, EntrySummary};

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_entries(&self, operation: &str, entries: &[EntrySummary]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for entry in entries {
            let size = Self::format_size(entry.size);
            if self.verbose {
                println!(
                    "{:>10}  {:>10}  crc {:08x}  {:<22}  {}",
                    size,
                    Self::format_size(entry.compressed_size),
                    entry.crc32,
                    entry.status.as_str(),
                    entry.stored_filename
                );
            } else {
                println!(
                    "{:>10}  {:<22}  {}",
                    size,
                    entry.status.as_str(),
                    entry.stored_filename
                );
            }
        }

        let ok = entries.iter().filter(|e| e.status.is_ok()).count();
        println!("{operation}: {ok}/{} entries ok", entries.len());
        Ok(())
    }

    fn format_properties(&self, properties: &ArchiveProperties) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        println!(
            "{} entries, status {}",
            properties.entry_count,
            properties.status.as_str()
        );
        if !properties.comment.is_empty() {
            println!("comment: {}", properties.comment);
        }
        Ok(())
    }

    fn format_success(&self, message: &str) -> Result<()> {
        if !self.quiet {
            println!("{message}");
        }
        Ok(())
    }
}
