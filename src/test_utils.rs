//! Shared fixtures for unit tests
//!
//! File writers for every compression scheme, record builders and a log
//! capture helper.

use crate::core::{FixedPoint8, OpenInterestRecord, QuoteRecord, QuoteSide, TradeRecord};
use crate::source::{Compression, LineSource};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Every concrete scheme `LineSource` can read
pub const ALL_SCHEMES: [Compression; 5] = [
    Compression::None,
    Compression::Gzip,
    Compression::Bzip2,
    Compression::Zlib,
    Compression::Zip,
];

fn file_name(scheme: Compression) -> &'static str {
    match scheme {
        Compression::Gzip => "lines.gz",
        Compression::Bzip2 => "lines.bz2",
        Compression::Zlib => "lines.zz",
        Compression::Zip => "lines.zip",
        Compression::None | Compression::Infer => "lines.txt",
    }
}

/// Write `lines` (each newline-terminated) into `dir` compressed with
/// `scheme`. The file extension matches the scheme so `Infer` works.
pub fn write_lines<S: AsRef<str>>(dir: &Path, lines: &[S], scheme: Compression) -> PathBuf {
    let mut text = String::new();
    for line in lines {
        text.push_str(line.as_ref());
        text.push('\n');
    }

    let path = dir.join(file_name(scheme));
    let file = File::create(&path).unwrap();
    match scheme {
        Compression::None | Compression::Infer => {
            let mut file = file;
            file.write_all(text.as_bytes()).unwrap();
        }
        Compression::Gzip => {
            let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            encoder.write_all(text.as_bytes()).unwrap();
            encoder.finish().unwrap();
        }
        Compression::Zlib => {
            let mut encoder = flate2::write::ZlibEncoder::new(file, flate2::Compression::default());
            encoder.write_all(text.as_bytes()).unwrap();
            encoder.finish().unwrap();
        }
        Compression::Bzip2 => {
            let mut encoder = bzip2::write::BzEncoder::new(file, bzip2::Compression::default());
            encoder.write_all(text.as_bytes()).unwrap();
            encoder.finish().unwrap();
        }
        Compression::Zip => {
            let mut writer = zip::ZipWriter::new(file);
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated);
            writer.start_file("lines.txt", options).unwrap();
            writer.write_all(text.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
    }
    path
}

/// Drain a source into owned lines
pub fn read_all_lines(path: &Path, scheme: Compression) -> Vec<String> {
    let mut source = LineSource::open(path, scheme).unwrap();
    let mut lines = Vec::new();
    while let Some(line) = source.next_line().unwrap() {
        lines.push(line.text().unwrap().to_string());
    }
    lines
}

pub fn fp(value: i64) -> FixedPoint8 {
    FixedPoint8::from_int(value).unwrap()
}

/// Bid quote with optional integer price/qty
pub fn quote(id: &str, price: Option<i64>, qty: Option<i64>) -> QuoteRecord {
    QuoteRecord {
        id: id.into(),
        timestamp: 0,
        side: QuoteSide::Bid,
        price: price.map(fp),
        qty: qty.map(fp),
    }
}

pub fn trade(id: &str, price: Option<i64>, qty: Option<i64>) -> TradeRecord {
    TradeRecord {
        id: id.into(),
        timestamp: 0,
        price: price.map(fp),
        qty: qty.map(fp),
    }
}

pub fn open_interest(id: &str, qty: Option<i64>) -> OpenInterestRecord {
    OpenInterestRecord {
        id: id.into(),
        timestamp: 0,
        qty: qty.map(fp),
    }
}

/// In-memory log sink for `capture_logs`
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a thread-local subscriber and return what it logged at
/// WARN and above
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer.contents())
}
