//! Adapter over the external DEFLATE codec.
//!
//! The engine never re-implements compression: raw DEFLATE streams come
//! from `flate2`, and CRC-32 is always computed over the *uncompressed*
//! content. Whether an entry is stored or deflated is purely the
//! caller's choice (the `no_compression` option); there is no automatic
//! fall-back to store when deflate happens to grow the payload.

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::{Compression, Crc};
use std::io::{self, Read, Write};

/// Copy buffer for the streaming paths.
const BLOCK_SIZE: usize = 64 * 1024;

/// Compression methods the engine reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Method 0: raw bytes.
    Store,
    /// Method 8: DEFLATE.
    Deflate,
}

impl CompressionMethod {
    /// Maps a raw method code; any code other than 0 or 8 is unsupported.
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::Store),
            8 => Some(Self::Deflate),
            _ => None,
        }
    }

    /// The on-disk method code.
    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            Self::Store => 0,
            Self::Deflate => 8,
        }
    }
}

/// An in-memory compressed payload ready to be written after its header.
#[derive(Debug)]
pub struct CompressedPayload {
    /// Method that produced `bytes`.
    pub method: CompressionMethod,
    /// The payload as it will appear in the archive.
    pub bytes: Vec<u8>,
    /// CRC-32 of the uncompressed content.
    pub crc32: u32,
}

/// CRC-32 of a byte slice.
#[must_use]
pub fn crc32(content: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(content);
    crc.sum()
}

/// Compresses `content` according to the caller's policy.
pub fn compress(content: &[u8], no_compression: bool) -> io::Result<CompressedPayload> {
    let crc = crc32(content);
    if no_compression {
        return Ok(CompressedPayload {
            method: CompressionMethod::Store,
            bytes: content.to_vec(),
            crc32: crc,
        });
    }

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content)?;
    Ok(CompressedPayload {
        method: CompressionMethod::Deflate,
        bytes: encoder.finish()?,
        crc32: crc,
    })
}

/// Decompresses a DEFLATE payload, verifying nothing beyond the stream
/// itself; size verification is the caller's job.
pub fn inflate(payload: &[u8], expected_size: u64) -> io::Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(payload);
    let mut content = Vec::with_capacity(usize::try_from(expected_size).unwrap_or(0));
    decoder.read_to_end(&mut content)?;
    Ok(content)
}

/// Streams `source` through DEFLATE into `dest` without buffering the
/// whole payload. Returns `(uncompressed, compressed, crc32)` totals.
pub fn deflate_stream<R: Read, W: Write>(
    source: &mut R,
    dest: &mut W,
) -> io::Result<(u64, u64, u32)> {
    let mut counter = CountingWriter::new(dest);
    let mut encoder = DeflateEncoder::new(&mut counter, Compression::default());
    let mut crc = Crc::new();
    let mut buffer = vec![0u8; BLOCK_SIZE];
    let mut read_total = 0u64;

    loop {
        let n = source.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        crc.update(&buffer[..n]);
        encoder.write_all(&buffer[..n])?;
        read_total += n as u64;
    }
    encoder.finish()?;

    Ok((read_total, counter.written, crc.sum()))
}

/// Streams a DEFLATE payload from `source` into `dest`. Returns the
/// number of decompressed bytes written.
pub fn inflate_stream<R: Read, W: Write>(source: &mut R, dest: &mut W) -> io::Result<u64> {
    let mut decoder = DeflateDecoder::new(source);
    let mut buffer = vec![0u8; BLOCK_SIZE];
    let mut written = 0u64;

    loop {
        let n = decoder.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        dest.write_all(&buffer[..n])?;
        written += n as u64;
    }
    Ok(written)
}

struct CountingWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
