//! JSON output formatter for machine-readable results.
//!
//! Entry lists are emitted as JSON Lines: one object per entry, so
//! downstream tools can stream without buffering the whole report.

use super::formatter::{EntryRow, OutputFormatter};
use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};
use zipmill_core::{ArchiveProperties, EntrySummary};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output_line<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_entries(&self, _operation: &str, entries: &[EntrySummary]) -> Result<()> {
        for entry in entries {
            Self::output_line(&EntryRow::from_summary(entry))?;
        }
        Ok(())
    }

    fn format_properties(&self, properties: &ArchiveProperties) -> Result<()> {
        #[derive(Serialize)]
        struct PropertiesOutput<'a> {
            entry_count: usize,
            status: &'static str,
            #[serde(skip_serializing_if = "str::is_empty")]
            comment: &'a str,
        }

        Self::output_line(&PropertiesOutput {
            entry_count: properties.entry_count,
            status: properties.status.as_str(),
            comment: &properties.comment,
        })
    }

    fn format_success(&self, message: &str) -> Result<()> {
        #[derive(Serialize)]
        struct MessageOutput<'a> {
            status: &'static str,
            message: &'a str,
        }

        Self::output_line(&MessageOutput {
            status: "success",
            message,
        })
    }
}
