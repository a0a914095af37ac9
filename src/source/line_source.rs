//! Forward-only line cursor over a (possibly compressed) file
//!
//! The decoder and the file handle live inside one owned `LineSource`;
//! dropping it releases both, whichever way the caller leaves.

use super::Compression;
use crate::{Result, TickIngestError};
use bzip2::read::MultiBzDecoder;
use flate2::read::{DeflateDecoder, MultiGzDecoder, ZlibDecoder};
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::str::Utf8Error;
use zip::{CompressionMethod, ZipArchive};

/// Read buffer size for the decoded stream
const READ_BUFFER_BYTES: usize = 64 * 1024;

/// One decompressed line, valid until the next read.
///
/// Bytes are passed through undecoded; a line that is not UTF-8 is still a
/// line and keeps its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number
    pub number: u64,
    /// Content without the line terminator
    pub bytes: &'a [u8],
}

impl<'a> Line<'a> {
    #[inline]
    pub fn text(&self) -> std::result::Result<&'a str, Utf8Error> {
        std::str::from_utf8(self.bytes)
    }

    /// Text with invalid sequences replaced by U+FFFD; borrows when valid
    #[inline]
    pub fn text_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.bytes)
    }
}

/// Decompressing line cursor
pub struct LineSource {
    path: PathBuf,
    compression: Compression,
    reader: Box<dyn BufRead + Send>,
    buf: Vec<u8>,
    line_number: u64,
    exhausted: bool,
}

impl LineSource {
    /// Open `path` under `compression`.
    ///
    /// `Compression::Infer` is resolved from the file extension. A zip
    /// archive yields the lines of its first entry.
    pub fn open(path: impl AsRef<Path>, compression: Compression) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let compression = compression.resolve(&path);

        let file = File::open(&path).map_err(|source| TickIngestError::Open {
            path: path.clone(),
            source,
        })?;

        let decoded: Box<dyn Read + Send> = match compression {
            Compression::None | Compression::Infer => Box::new(file),
            Compression::Gzip => Box::new(MultiGzDecoder::new(file)),
            Compression::Bzip2 => Box::new(MultiBzDecoder::new(file)),
            Compression::Zlib => Box::new(ZlibDecoder::new(file)),
            Compression::Zip => open_first_zip_entry(&path, file)?,
        };

        tracing::debug!(path = %path.display(), %compression, "opened line source");

        Ok(Self {
            path,
            compression,
            reader: Box::new(BufReader::with_capacity(READ_BUFFER_BYTES, decoded)),
            buf: Vec::new(),
            line_number: 0,
            exhausted: false,
        })
    }

    /// Next decoded line, or `None` at end of stream.
    ///
    /// End of stream is terminal: once `None` has been returned every later
    /// call returns `None` without touching the reader. A decoder or I/O
    /// fault is a `Read` error naming the line that was being read.
    pub fn next_line(&mut self) -> Result<Option<Line<'_>>> {
        if self.exhausted {
            return Ok(None);
        }

        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| TickIngestError::Read {
                path: self.path.clone(),
                line_number: self.line_number + 1,
                source,
            })?;

        if read == 0 {
            self.exhausted = true;
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }
        self.line_number += 1;

        Ok(Some(Line {
            number: self.line_number,
            bytes: &self.buf,
        }))
    }

    /// Number of the last line returned (0 before the first read)
    #[inline(always)]
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Concrete scheme in use (never `Infer`)
    pub fn compression(&self) -> Compression {
        self.compression
    }
}

impl Drop for LineSource {
    fn drop(&mut self) {
        tracing::trace!(
            path = %self.path.display(),
            lines = self.line_number,
            "line source released"
        );
    }
}

impl std::fmt::Debug for LineSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineSource")
            .field("path", &self.path)
            .field("compression", &self.compression)
            .field("line_number", &self.line_number)
            .finish_non_exhaustive()
    }
}

/// Stream the first archive entry straight from the file: locate its data
/// through the central directory, then read the raw bytes through the
/// matching decoder. Nothing is buffered beyond the read buffer.
fn open_first_zip_entry(path: &Path, file: File) -> Result<Box<dyn Read + Send>> {
    let open_err = |source: io::Error| TickIngestError::Open {
        path: path.to_path_buf(),
        source,
    };

    let mut archive = ZipArchive::new(file).map_err(|e| open_err(io::Error::other(e)))?;
    if archive.is_empty() {
        return Err(open_err(io::Error::new(
            io::ErrorKind::InvalidData,
            "zip archive has no entries",
        )));
    }

    let (data_start, compressed_size, method) = {
        let entry = archive
            .by_index_raw(0)
            .map_err(|e| open_err(io::Error::other(e)))?;
        (entry.data_start(), entry.compressed_size(), entry.compression())
    };

    let mut file = archive.into_inner();
    file.seek(SeekFrom::Start(data_start)).map_err(open_err)?;
    let raw = file.take(compressed_size);

    match method {
        CompressionMethod::Stored => Ok(Box::new(raw)),
        CompressionMethod::Deflated => Ok(Box::new(DeflateDecoder::new(raw))),
        other => Err(TickIngestError::Config(format!(
            "unsupported zip entry compression {other:?} in {}",
            path.display()
        ))),
    }
}
