//! JSONL capture files on disk, optionally gzip compressed.
//!
//! [`open`] hands back a lazy exchange iterator that owns the file, and
//! [`create`] a [`CaptureWriter`] whose [`close`](CaptureWriter::close)
//! writes the gzip trailer. Files are released on drop on every path,
//! including when reading stops at a malformed line.

use std::borrow::Borrow;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use crate::config::CodecConfig;
use crate::error::Result;
use crate::http::HttpExchange;
use crate::jsonl::{ExchangeLines, ExchangeWriter};

pub type CaptureReader = ExchangeLines<Box<dyn BufRead + Send>>;

/// Opens a capture for reading. Gzip members are decoded back to back, so
/// captures appended to over several runs read as one sequence.
pub fn open(path: impl AsRef<Path>, cfg: &CodecConfig) -> Result<CaptureReader> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let gzip = cfg.compression.is_gzip(path);
    tracing::debug!(path = %path.display(), gzip, "opening capture for reading");

    let source: Box<dyn BufRead + Send> = if gzip {
        Box::new(BufReader::with_capacity(cfg.buffer_size, MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::with_capacity(cfg.buffer_size, file))
    };
    Ok(ExchangeLines::with_config(source, cfg))
}

/// Sink behind a [`CaptureWriter`].
pub enum CaptureFile {
    Plain(File),
    Gzip(GzEncoder<File>),
}

impl CaptureFile {
    /// Completes the gzip stream, if any, and flushes the file.
    pub fn finish(self) -> io::Result<File> {
        let mut file = match self {
            CaptureFile::Plain(file) => file,
            CaptureFile::Gzip(encoder) => encoder.finish()?,
        };
        file.flush()?;
        Ok(file)
    }
}

impl Write for CaptureFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            CaptureFile::Plain(file) => file.write(buf),
            CaptureFile::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            CaptureFile::Plain(file) => file.flush(),
            CaptureFile::Gzip(encoder) => encoder.flush(),
        }
    }
}

pub struct CaptureWriter {
    inner: ExchangeWriter<CaptureFile>,
}

impl CaptureWriter {
    pub fn write(&mut self, exchange: &HttpExchange) -> Result<()> {
        self.inner.write(exchange)
    }

    pub fn write_all<I>(&mut self, exchanges: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Borrow<HttpExchange>,
    {
        self.inner.write_all(exchanges)
    }

    pub fn written(&self) -> usize {
        self.inner.written()
    }

    /// Flushes every buffered line and finishes the file.
    pub fn close(self) -> Result<()> {
        self.inner.close()?.finish()?;
        Ok(())
    }
}

/// Creates (or truncates) a capture for writing.
pub fn create(path: impl AsRef<Path>, cfg: &CodecConfig) -> Result<CaptureWriter> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let gzip = cfg.compression.is_gzip(path);
    tracing::debug!(path = %path.display(), gzip, "creating capture");

    let sink = if gzip {
        CaptureFile::Gzip(GzEncoder::new(file, cfg.gzip_level()))
    } else {
        CaptureFile::Plain(file)
    };
    Ok(CaptureWriter {
        inner: ExchangeWriter::with_config(sink, cfg),
    })
}

/// Writes `exchanges` to a new capture at `path` and closes it, returning how
/// many were written.
pub fn write_all<I>(path: impl AsRef<Path>, exchanges: I, cfg: &CodecConfig) -> Result<usize>
where
    I: IntoIterator,
    I::Item: Borrow<HttpExchange>,
{
    let mut writer = create(path, cfg)?;
    writer.write_all(exchanges)?;
    let written = writer.written();
    writer.close()?;
    Ok(written)
}
