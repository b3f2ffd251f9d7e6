//! Binary codec for the three ZIP record types.
//!
//! All multi-byte fields are little-endian. Each record is a fixed-size
//! prefix followed by variable-length byte fields (name, extra, comment).
//! Decoding verifies the record signature and fails with
//! [`ZipError::InvalidArchiveFormat`] on mismatch or truncation.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Result, ZipError};

/// Local file header signature, `PK\x03\x04`.
pub const LOCAL_SIGNATURE: u32 = 0x0403_4b50;
/// Central directory file header signature, `PK\x01\x02`.
pub const CENTRAL_SIGNATURE: u32 = 0x0201_4b50;
/// End of central directory signature, `PK\x05\x06`.
pub const END_SIGNATURE: u32 = 0x0605_4b50;

/// Fixed prefix size of a local file header.
pub const LOCAL_SIZE: usize = 30;
/// Fixed prefix size of a central directory file header.
pub const CENTRAL_SIZE: usize = 46;
/// Fixed size of the end-of-central-directory record without its comment.
pub const END_SIZE: usize = 22;

/// Widest possible EOCD footprint: a 22-byte record preceded by up to
/// 0xFFFF comment bytes.
const MAX_END_SCAN: u64 = 65_557;

fn truncated(archive: &Path, record: &str, wanted: usize) -> ZipError {
    ZipError::InvalidArchiveFormat {
        path: archive.to_path_buf(),
        reason: format!("truncated {record} (fewer than {wanted} bytes)"),
    }
}

fn read_prefix<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    archive: &Path,
    record: &str,
) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            truncated(archive, record, buf.len())
        } else {
            ZipError::Io(e)
        }
    })
}

fn read_bytes<R: Read>(reader: &mut R, len: usize, archive: &Path, record: &str) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; len];
    read_prefix(reader, &mut bytes, archive, record)?;
    Ok(bytes)
}

/// The 30-byte local file header plus its variable name/extra fields.
#[derive(Debug, Clone, Default)]
pub struct LocalFileHeader {
    /// Minimum ZIP version needed to extract.
    pub version_needed: u16,
    /// General-purpose bit flags.
    pub flags: u16,
    /// Compression method code (0 = store, 8 = deflate).
    pub compression: u16,
    /// Modification time in DOS format.
    pub mod_time: u16,
    /// Modification date in DOS format.
    pub mod_date: u16,
    /// CRC-32 of the uncompressed content.
    pub crc32: u32,
    /// Size of the compressed payload in bytes.
    pub compressed_size: u32,
    /// Size of the uncompressed content in bytes.
    pub uncompressed_size: u32,
    /// Stored name bytes.
    pub name: Vec<u8>,
    /// Raw extra-field bytes.
    pub extra: Vec<u8>,
}

impl LocalFileHeader {
    /// Decodes a local file header from the reader's current position.
    pub fn read_from<R: Read>(reader: &mut R, archive: &Path) -> Result<Self> {
        let mut prefix = [0u8; LOCAL_SIZE];
        read_prefix(reader, &mut prefix, archive, "local file header")?;

        let mut cursor = Cursor::new(&prefix[..]);
        let signature = cursor.read_u32::<LittleEndian>()?;
        if signature != LOCAL_SIGNATURE {
            return Err(ZipError::InvalidArchiveFormat {
                path: archive.to_path_buf(),
                reason: format!("bad local file header signature {signature:#010x}"),
            });
        }

        let version_needed = cursor.read_u16::<LittleEndian>()?;
        let flags = cursor.read_u16::<LittleEndian>()?;
        let compression = cursor.read_u16::<LittleEndian>()?;
        let mod_time = cursor.read_u16::<LittleEndian>()?;
        let mod_date = cursor.read_u16::<LittleEndian>()?;
        let crc32 = cursor.read_u32::<LittleEndian>()?;
        let compressed_size = cursor.read_u32::<LittleEndian>()?;
        let uncompressed_size = cursor.read_u32::<LittleEndian>()?;
        let name_len = cursor.read_u16::<LittleEndian>()? as usize;
        let extra_len = cursor.read_u16::<LittleEndian>()? as usize;

        let name = read_bytes(reader, name_len, archive, "local file header name")?;
        let extra = read_bytes(reader, extra_len, archive, "local file header extra")?;

        Ok(Self {
            version_needed,
            flags,
            compression,
            mod_time,
            mod_date,
            crc32,
            compressed_size,
            uncompressed_size,
            name,
            extra,
        })
    }

    /// Encodes the header at the writer's current position.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(LOCAL_SIGNATURE)?;
        writer.write_u16::<LittleEndian>(self.version_needed)?;
        writer.write_u16::<LittleEndian>(self.flags)?;
        writer.write_u16::<LittleEndian>(self.compression)?;
        writer.write_u16::<LittleEndian>(self.mod_time)?;
        writer.write_u16::<LittleEndian>(self.mod_date)?;
        writer.write_u32::<LittleEndian>(self.crc32)?;
        writer.write_u32::<LittleEndian>(self.compressed_size)?;
        writer.write_u32::<LittleEndian>(self.uncompressed_size)?;
        writer.write_u16::<LittleEndian>(self.name.len() as u16)?;
        writer.write_u16::<LittleEndian>(self.extra.len() as u16)?;
        writer.write_all(&self.name)?;
        writer.write_all(&self.extra)?;
        Ok(())
    }
}

/// The 46-byte central directory file header plus name/extra/comment.
#[derive(Debug, Clone, Default)]
pub struct CentralFileHeader {
    /// Version of the writer that produced the entry.
    pub version_made_by: u16,
    /// Minimum ZIP version needed to extract.
    pub version_needed: u16,
    /// General-purpose bit flags.
    pub flags: u16,
    /// Compression method code.
    pub compression: u16,
    /// Modification time in DOS format.
    pub mod_time: u16,
    /// Modification date in DOS format.
    pub mod_date: u16,
    /// CRC-32 of the uncompressed content.
    pub crc32: u32,
    /// Size of the compressed payload in bytes.
    pub compressed_size: u32,
    /// Size of the uncompressed content in bytes.
    pub uncompressed_size: u32,
    /// Disk on which the entry starts. Always 0 here.
    pub disk_start: u16,
    /// Internal attribute bits.
    pub internal_attrs: u16,
    /// External attribute bits; `0x10` marks a folder.
    pub external_attrs: u32,
    /// Offset of the entry's local header from the start of the archive.
    pub local_header_offset: u32,
    /// Stored name bytes.
    pub name: Vec<u8>,
    /// Raw extra-field bytes.
    pub extra: Vec<u8>,
    /// Per-entry comment bytes.
    pub comment: Vec<u8>,
}

impl CentralFileHeader {
    /// Decodes a central directory file header from the reader's current
    /// position.
    pub fn read_from<R: Read>(reader: &mut R, archive: &Path) -> Result<Self> {
        let mut prefix = [0u8; CENTRAL_SIZE];
        read_prefix(reader, &mut prefix, archive, "central directory header")?;

        let mut cursor = Cursor::new(&prefix[..]);
        let signature = cursor.read_u32::<LittleEndian>()?;
        if signature != CENTRAL_SIGNATURE {
            return Err(ZipError::InvalidArchiveFormat {
                path: archive.to_path_buf(),
                reason: format!("bad central directory signature {signature:#010x}"),
            });
        }

        let version_made_by = cursor.read_u16::<LittleEndian>()?;
        let version_needed = cursor.read_u16::<LittleEndian>()?;
        let flags = cursor.read_u16::<LittleEndian>()?;
        let compression = cursor.read_u16::<LittleEndian>()?;
        let mod_time = cursor.read_u16::<LittleEndian>()?;
        let mod_date = cursor.read_u16::<LittleEndian>()?;
        let crc32 = cursor.read_u32::<LittleEndian>()?;
        let compressed_size = cursor.read_u32::<LittleEndian>()?;
        let uncompressed_size = cursor.read_u32::<LittleEndian>()?;
        let name_len = cursor.read_u16::<LittleEndian>()? as usize;
        let extra_len = cursor.read_u16::<LittleEndian>()? as usize;
        let comment_len = cursor.read_u16::<LittleEndian>()? as usize;
        let disk_start = cursor.read_u16::<LittleEndian>()?;
        let internal_attrs = cursor.read_u16::<LittleEndian>()?;
        let external_attrs = cursor.read_u32::<LittleEndian>()?;
        let local_header_offset = cursor.read_u32::<LittleEndian>()?;

        let name = read_bytes(reader, name_len, archive, "central directory name")?;
        let extra = read_bytes(reader, extra_len, archive, "central directory extra")?;
        let comment = read_bytes(reader, comment_len, archive, "central directory comment")?;

        Ok(Self {
            version_made_by,
            version_needed,
            flags,
            compression,
            mod_time,
            mod_date,
            crc32,
            compressed_size,
            uncompressed_size,
            disk_start,
            internal_attrs,
            external_attrs,
            local_header_offset,
            name,
            extra,
            comment,
        })
    }

    /// Encodes the header at the writer's current position.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(CENTRAL_SIGNATURE)?;
        writer.write_u16::<LittleEndian>(self.version_made_by)?;
        writer.write_u16::<LittleEndian>(self.version_needed)?;
        writer.write_u16::<LittleEndian>(self.flags)?;
        writer.write_u16::<LittleEndian>(self.compression)?;
        writer.write_u16::<LittleEndian>(self.mod_time)?;
        writer.write_u16::<LittleEndian>(self.mod_date)?;
        writer.write_u32::<LittleEndian>(self.crc32)?;
        writer.write_u32::<LittleEndian>(self.compressed_size)?;
        writer.write_u32::<LittleEndian>(self.uncompressed_size)?;
        writer.write_u16::<LittleEndian>(self.name.len() as u16)?;
        writer.write_u16::<LittleEndian>(self.extra.len() as u16)?;
        writer.write_u16::<LittleEndian>(self.comment.len() as u16)?;
        writer.write_u16::<LittleEndian>(self.disk_start)?;
        writer.write_u16::<LittleEndian>(self.internal_attrs)?;
        writer.write_u32::<LittleEndian>(self.external_attrs)?;
        writer.write_u32::<LittleEndian>(self.local_header_offset)?;
        writer.write_all(&self.name)?;
        writer.write_all(&self.extra)?;
        writer.write_all(&self.comment)?;
        Ok(())
    }
}

/// The end-of-central-directory record.
#[derive(Debug, Clone, Default)]
pub struct EndOfCentralDirectory {
    /// Number of this disk. Always 0 here.
    pub disk_number: u16,
    /// Disk where the central directory starts. Always 0 here.
    pub disk_start: u16,
    /// Entry count on this disk.
    pub entries_on_disk: u16,
    /// Total entry count.
    pub total_entries: u16,
    /// Byte size of the central directory.
    pub central_dir_size: u32,
    /// Offset of the central directory from the start of the archive.
    pub central_dir_offset: u32,
    /// Archive-level comment bytes.
    pub comment: Vec<u8>,
}

impl EndOfCentralDirectory {
    /// Builds the record for an archive with `entries` entries whose
    /// central directory spans `[offset, offset + size)`.
    #[must_use]
    pub fn new(entries: u16, size: u32, offset: u32, comment: Vec<u8>) -> Self {
        Self {
            disk_number: 0,
            disk_start: 0,
            entries_on_disk: entries,
            total_entries: entries,
            central_dir_size: size,
            central_dir_offset: offset,
            comment,
        }
    }

    /// Locates and decodes the EOCD record of `archive`.
    ///
    /// Probes exactly 22 bytes before end-of-file first (the common,
    /// comment-free layout). When the signature is not there, scans
    /// backward over at most `min(file_size, 65557)` bytes. Returns the
    /// record and its byte offset in the file.
    pub fn find<R: Read + Seek>(reader: &mut R, archive: &Path) -> Result<(Self, u64)> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        if file_size < END_SIZE as u64 {
            return Err(ZipError::InvalidArchiveFormat {
                path: archive.to_path_buf(),
                reason: format!(
                    "file of {file_size} bytes cannot hold an end of central directory record"
                ),
            });
        }

        let probe = file_size - END_SIZE as u64;
        reader.seek(SeekFrom::Start(probe))?;
        if reader.read_u32::<LittleEndian>()? == END_SIGNATURE {
            let record = Self::read_after_signature(reader, archive)?;
            return Ok((record, probe));
        }

        // A comment pushes the record away from the end; scan backward
        // for the signature over the widest possible comment span.
        let scan_len = MAX_END_SCAN.min(file_size);
        let scan_start = file_size - scan_len;
        reader.seek(SeekFrom::Start(scan_start))?;
        let mut window = vec![0u8; scan_len as usize];
        reader.read_exact(&mut window)?;

        let signature = END_SIGNATURE.to_le_bytes();
        // scan_len >= END_SIZE after the size guard above.
        let last_candidate = window.len() - END_SIZE;
        for i in (0..=last_candidate).rev() {
            if window[i..i + 4] == signature {
                let offset = scan_start + i as u64;
                reader.seek(SeekFrom::Start(offset + 4))?;
                let record = Self::read_after_signature(reader, archive)?;
                return Ok((record, offset));
            }
        }

        Err(ZipError::InvalidArchiveFormat {
            path: archive.to_path_buf(),
            reason: "end of central directory signature not found".into(),
        })
    }

    fn read_after_signature<R: Read>(reader: &mut R, archive: &Path) -> Result<Self> {
        let mut prefix = [0u8; END_SIZE - 4];
        read_prefix(reader, &mut prefix, archive, "end of central directory")?;

        let mut cursor = Cursor::new(&prefix[..]);
        let disk_number = cursor.read_u16::<LittleEndian>()?;
        let disk_start = cursor.read_u16::<LittleEndian>()?;
        let entries_on_disk = cursor.read_u16::<LittleEndian>()?;
        let total_entries = cursor.read_u16::<LittleEndian>()?;
        let central_dir_size = cursor.read_u32::<LittleEndian>()?;
        let central_dir_offset = cursor.read_u32::<LittleEndian>()?;
        let comment_len = cursor.read_u16::<LittleEndian>()? as usize;

        let comment = read_bytes(reader, comment_len, archive, "archive comment")?;

        Ok(Self {
            disk_number,
            disk_start,
            entries_on_disk,
            total_entries,
            central_dir_size,
            central_dir_offset,
            comment,
        })
    }

    /// Encodes the record at the writer's current position.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(END_SIGNATURE)?;
        writer.write_u16::<LittleEndian>(self.disk_number)?;
        writer.write_u16::<LittleEndian>(self.disk_start)?;
        writer.write_u16::<LittleEndian>(self.entries_on_disk)?;
        writer.write_u16::<LittleEndian>(self.total_entries)?;
        writer.write_u32::<LittleEndian>(self.central_dir_size)?;
        writer.write_u32::<LittleEndian>(self.central_dir_offset)?;
        writer.write_u16::<LittleEndian>(self.comment.len() as u16)?;
        writer.write_all(&self.comment)?;
        Ok(())
    }
}
