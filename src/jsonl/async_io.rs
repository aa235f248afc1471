//! Async counterparts of [`ExchangeLines`](crate::jsonl::ExchangeLines) and
//! [`ExchangeWriter`](crate::jsonl::ExchangeWriter) over `async-std` I/O.
//!
//! The line format, the single-pass reading and the "first error ends the
//! sequence" rule are the same as for the blocking versions. Each
//! `next_exchange().await` pulls exactly one line, so the caller controls the
//! pace.

use async_std::io::prelude::*;
use async_std::io::{BufRead, Write};

use crate::config::{CodecConfig, config};
use crate::error::Result;
use crate::http::HttpExchange;
use crate::jsonl::reader::{LineDecoder, Step};
use crate::jsonl::writer::encode_line;

pub struct AsyncExchangeReader<R> {
    reader: R,
    buf: Vec<u8>,
    decoder: LineDecoder,
}

impl<R: BufRead + Unpin> AsyncExchangeReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, config())
    }

    pub fn with_config(reader: R, cfg: &CodecConfig) -> Self {
        tracing::debug!(max_line_size = cfg.max_line_size, "opening async exchange reader");
        Self {
            reader,
            buf: Vec::new(),
            decoder: LineDecoder::new(cfg),
        }
    }

    /// Reads the next exchange; `None` once the input or the sequence has ended.
    pub async fn next_exchange(&mut self) -> Option<Result<HttpExchange>> {
        while !self.decoder.is_done() {
            self.buf.clear();
            let limit = self.decoder.read_limit();
            let read = (&mut self.reader)
                .take(limit)
                .read_until(b'\n', &mut self.buf)
                .await;
            let step = match read {
                Ok(_) => self.decoder.accept(&self.buf),
                Err(err) => self.decoder.fail(err),
            };
            match step {
                Step::Skip => continue,
                Step::Item(item) => return Some(item),
                Step::End => return None,
            }
        }
        None
    }

    /// Drains the remaining input, stopping at the first error.
    pub async fn read_all(mut self) -> Result<Vec<HttpExchange>> {
        let mut exchanges = Vec::new();
        while let Some(exchange) = self.next_exchange().await {
            exchanges.push(exchange?);
        }
        Ok(exchanges)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

pub struct AsyncExchangeWriter<W> {
    out: W,
    write_timestamps: bool,
    written: usize,
}

impl<W: Write + Unpin> AsyncExchangeWriter<W> {
    pub fn new(out: W) -> Self {
        Self::with_config(out, config())
    }

    pub fn with_config(out: W, cfg: &CodecConfig) -> Self {
        tracing::debug!("opening async exchange writer");
        Self {
            out,
            write_timestamps: cfg.write_timestamps,
            written: 0,
        }
    }

    pub async fn write(&mut self, exchange: &HttpExchange) -> Result<()> {
        let line = encode_line(exchange, self.write_timestamps)?;
        if self.written > 0 {
            self.out.write_all(b"\n").await?;
        }
        self.out.write_all(&line).await?;
        self.written += 1;
        tracing::trace!(line = self.written, "wrote exchange");
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes the sink and hands it back.
    pub async fn close(mut self) -> Result<W> {
        self.out.flush().await?;
        tracing::debug!(written = self.written, "closed async exchange writer");
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpUrl};
    use async_std::task;

    fn exchange(status_code: u16) -> HttpExchange {
        HttpExchange::new(
            HttpRequest::builder()
                .url(HttpUrl::parse("http://localhost:3000/items?id=1").unwrap())
                .method(HttpMethod::Post)
                .header("Content-Type", "application/json")
                .body(r#"{"name":"x"}"#)
                .build()
                .unwrap(),
            HttpResponse::builder()
                .status_code(status_code)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_async_round_trip() {
        task::block_on(async {
            let cfg = CodecConfig::default();
            let mut writer = AsyncExchangeWriter::with_config(Vec::new(), &cfg);
            writer.write(&exchange(201)).await.unwrap();
            writer.write(&exchange(409)).await.unwrap();
            let out = writer.close().await.unwrap();

            let reader = AsyncExchangeReader::with_config(out.as_slice(), &cfg);
            let exchanges = reader.read_all().await.unwrap();
            assert_eq!(exchanges, vec![exchange(201), exchange(409)]);
        });
    }

    #[test]
    fn test_async_reader_stops_at_error() {
        task::block_on(async {
            let line = crate::jsonl::to_json(&exchange(200)).unwrap();
            let input = format!("{line}\nnot json\n{line}");
            let mut reader =
                AsyncExchangeReader::with_config(input.as_bytes(), &CodecConfig::default());

            assert!(reader.next_exchange().await.unwrap().is_ok());
            let err = reader.next_exchange().await.unwrap().unwrap_err();
            assert!(matches!(err, Error::Line { line: 2, .. }));
            assert!(reader.next_exchange().await.is_none());
        });
    }
}
