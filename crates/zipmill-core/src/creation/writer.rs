//! The sequential entry write path.
//!
//! Each entry becomes a local header followed by its payload. Large file
//! payloads are deflated into a temporary file first so the compressed
//! size and CRC are known before the header is written, without holding
//! the whole payload in memory.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::time::SystemTime;

use crate::compress::{self, CompressionMethod};
use crate::entry::FOLDER_ATTR;
use crate::error::Result;
use crate::format::{dostime, CentralFileHeader, LocalFileHeader};
use crate::options::AddOptions;

use super::expand::{ExpandedEntry, ExpandedKind};

/// ZIP version fields written for deflated entries.
const VERSION_DEFLATE: u16 = 20;
/// ZIP version fields written for stored entries and folders.
const VERSION_STORE: u16 = 10;

/// What `write_entry` produced for one entry.
pub struct WrittenEntry {
    /// Central-directory record for the rewrite at the end of the batch.
    pub central: CentralFileHeader,
    /// Local header plus payload length in bytes.
    pub bytes_written: u64,
}

/// Writes one entry's local header and payload at `offset`.
///
/// Returns `None` when the source file cannot be opened or read; the
/// caller records a read-error status and the batch continues.
pub fn write_entry<W: Write>(
    writer: &mut W,
    offset: u64,
    entry: &ExpandedEntry,
    stored_name: &str,
    options: &AddOptions,
) -> Result<Option<WrittenEntry>> {
    match &entry.kind {
        ExpandedKind::Folder => {
            let name = format!("{stored_name}/");
            let header = build_headers(
                &name,
                CompressionMethod::Store,
                0,
                0,
                0,
                mtime_of(entry),
                offset,
                entry.comment.as_deref(),
                true,
            );
            Ok(Some(write_with_payload(writer, header, &[])?))
        }
        ExpandedKind::Virtual(content) => {
            let payload = compress::compress(content, options.no_compression)?;
            let header = build_headers(
                stored_name,
                payload.method,
                payload.crc32,
                payload.bytes.len() as u64,
                content.len() as u64,
                mtime_of(entry),
                offset,
                entry.comment.as_deref(),
                false,
            );
            Ok(Some(write_with_payload(writer, header, &payload.bytes)?))
        }
        ExpandedKind::File => write_file_entry(writer, offset, entry, stored_name, options),
    }
}

fn write_file_entry<W: Write>(
    writer: &mut W,
    offset: u64,
    entry: &ExpandedEntry,
    stored_name: &str,
    options: &AddOptions,
) -> Result<Option<WrittenEntry>> {
    let Ok(mut source) = File::open(&entry.source) else {
        return Ok(None);
    };
    let Ok(meta) = source.metadata() else {
        return Ok(None);
    };
    let size = meta.len();
    let mtime = entry
        .mtime
        .or_else(|| meta.modified().ok())
        .unwrap_or_else(SystemTime::now);

    if !options.no_compression && options.temp_file.use_temp_file(size) {
        // Deflate into a temp file first so the sizes land in the header
        // without buffering the payload.
        let mut spool = tempfile::tempfile()?;
        let (read, compressed, crc) = compress::deflate_stream(&mut source, &mut spool)?;

        let header = build_headers(
            stored_name,
            CompressionMethod::Deflate,
            crc,
            compressed,
            read,
            mtime,
            offset,
            entry.comment.as_deref(),
            false,
        );
        header.local.write_to(writer)?;
        spool.seek(SeekFrom::Start(0))?;
        let copied = io::copy(&mut spool, writer)?;
        debug_assert_eq!(copied, compressed);

        return Ok(Some(WrittenEntry {
            bytes_written: local_len(&header.local) + compressed,
            central: header.central,
        }));
    }

    let mut content = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
    if source.read_to_end(&mut content).is_err() {
        return Ok(None);
    }
    let payload = compress::compress(&content, options.no_compression)?;
    let header = build_headers(
        stored_name,
        payload.method,
        payload.crc32,
        payload.bytes.len() as u64,
        content.len() as u64,
        mtime,
        offset,
        entry.comment.as_deref(),
        false,
    );
    Ok(Some(write_with_payload(writer, header, &payload.bytes)?))
}

struct HeaderPair {
    local: LocalFileHeader,
    central: CentralFileHeader,
}

#[allow(clippy::too_many_arguments)]
fn build_headers(
    stored_name: &str,
    method: CompressionMethod,
    crc32: u32,
    compressed_size: u64,
    uncompressed_size: u64,
    mtime: SystemTime,
    offset: u64,
    comment: Option<&str>,
    is_folder: bool,
) -> HeaderPair {
    let (mod_time, mod_date) = dostime::to_dos(mtime);
    let version = match method {
        CompressionMethod::Deflate => VERSION_DEFLATE,
        CompressionMethod::Store => VERSION_STORE,
    };

    let local = LocalFileHeader {
        version_needed: version,
        flags: 0,
        compression: method.code(),
        mod_time,
        mod_date,
        crc32,
        compressed_size: compressed_size as u32,
        uncompressed_size: uncompressed_size as u32,
        name: stored_name.as_bytes().to_vec(),
        extra: Vec::new(),
    };
    let central = CentralFileHeader {
        version_made_by: VERSION_DEFLATE,
        version_needed: version,
        flags: 0,
        compression: method.code(),
        mod_time,
        mod_date,
        crc32,
        compressed_size: compressed_size as u32,
        uncompressed_size: uncompressed_size as u32,
        disk_start: 0,
        internal_attrs: 0,
        external_attrs: if is_folder { FOLDER_ATTR } else { 0 },
        local_header_offset: offset as u32,
        name: stored_name.as_bytes().to_vec(),
        extra: Vec::new(),
        comment: comment.map(|c| c.as_bytes().to_vec()).unwrap_or_default(),
    };
    HeaderPair { local, central }
}

fn write_with_payload<W: Write>(
    writer: &mut W,
    header: HeaderPair,
    payload: &[u8],
) -> Result<WrittenEntry> {
    header.local.write_to(writer)?;
    writer.write_all(payload)?;
    Ok(WrittenEntry {
        bytes_written: local_len(&header.local) + payload.len() as u64,
        central: header.central,
    })
}

fn local_len(local: &LocalFileHeader) -> u64 {
    (crate::format::headers::LOCAL_SIZE + local.name.len() + local.extra.len()) as u64
}

fn mtime_of(entry: &ExpandedEntry) -> SystemTime {
    entry
        .mtime
        .or_else(|| std::fs::metadata(&entry.source).and_then(|m| m.modified()).ok())
        .unwrap_or_else(SystemTime::now)
}
