//! Payload unpacking.
//!
//! Reads one entry's compressed bytes from the archive and delivers the
//! decompressed content to a destination writer. Archive-side failures
//! and corrupt streams are fatal; only destination write failures are
//! recoverable, so callers can record them as a per-entry status.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::compress::{self, CompressionMethod};
use crate::entry::EntryHeader;
use crate::error::{Result, ZipError};
use crate::options::TempFilePolicy;

const BLOCK_SIZE: usize = 64 * 1024;

/// How delivery to the destination ended.
pub type WriteOutcome = std::result::Result<u64, io::Error>;

/// Decompresses the payload at the archive's current position into `out`.
///
/// The outer `Result` carries fatal conditions (archive read failure,
/// corrupt deflate stream, temp-file trouble). The inner [`WriteOutcome`]
/// is `Err` only when writing to `out` failed, which is a per-entry
/// condition for the caller to record.
pub fn unpack(
    archive_file: &mut File,
    header: &EntryHeader,
    archive: &Path,
    policy: &TempFilePolicy,
    out: &mut dyn Write,
) -> Result<WriteOutcome> {
    let compressed = u64::from(header.central.compressed_size);
    let expected = u64::from(header.central.uncompressed_size);

    match header.method() {
        Some(CompressionMethod::Store) => {
            let mut reader = archive_file.take(compressed);
            pump(&mut reader, out)
        }
        Some(CompressionMethod::Deflate) if policy.use_temp_file(expected) => {
            // Inflate into a temp file so the full content never sits in
            // memory; the destination only sees plain copies.
            let mut spool = tempfile::tempfile()?;
            let mut reader = archive_file.take(compressed);
            compress::inflate_stream(&mut reader, &mut spool)
                .map_err(|e| corrupt(e, header, archive))?;
            spool.seek(SeekFrom::Start(0))?;
            pump(&mut spool, out)
        }
        Some(CompressionMethod::Deflate) => {
            let mut payload = vec![0u8; usize::try_from(compressed).unwrap_or(usize::MAX)];
            archive_file.read_exact(&mut payload)?;
            let content = compress::inflate(&payload, expected)
                .map_err(|e| corrupt(e, header, archive))?;
            match out.write_all(&content) {
                Ok(()) => Ok(Ok(content.len() as u64)),
                Err(e) => Ok(Err(e)),
            }
        }
        None => Err(ZipError::UnsupportedCompression {
            name: header.stored_filename.clone(),
            method: header.central.compression,
        }),
    }
}

fn corrupt(source: io::Error, header: &EntryHeader, archive: &Path) -> ZipError {
    if source.kind() == io::ErrorKind::InvalidInput || source.kind() == io::ErrorKind::InvalidData {
        ZipError::InvalidArchiveFormat {
            path: archive.to_path_buf(),
            reason: format!(
                "corrupt deflate stream in entry '{}'",
                header.stored_filename
            ),
        }
    } else {
        ZipError::Io(source)
    }
}

/// Copies `reader` to `out`, keeping read failures fatal and write
/// failures recoverable.
fn pump<R: Read>(reader: &mut R, out: &mut dyn Write) -> Result<WriteOutcome> {
    let mut buffer = vec![0u8; BLOCK_SIZE];
    let mut written = 0u64;
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            return Ok(Ok(written));
        }
        if let Err(e) = out.write_all(&buffer[..n]) {
            return Ok(Err(e));
        }
        written += n as u64;
    }
}
