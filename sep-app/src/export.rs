//! CSV export of harvested entries.
//!
//! One header row (`Title,Content`), one record per entry, CRLF record
//! terminators, quoting only where a field needs it.

use anyhow::Context;
use sep_common::Entry;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Serialize `entries` to any writer. Writes nothing at all for an empty slice.
pub fn write_entries<W: Write>(writer: W, entries: &[Entry]) -> Result<(), csv::Error> {
    let mut w = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);
    for entry in entries {
        w.serialize(entry)?;
    }
    w.flush()?;
    Ok(())
}

/// Create (or truncate) `path` and write `entries` to it as UTF-8 CSV.
pub fn export_entries(path: &Path, entries: &[Entry]) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create output file: {}", path.display()))?;
    write_entries(BufWriter::new(file), entries)
        .with_context(|| format!("failed to write entries to {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = entries.len(), "export.written");
    Ok(())
}
