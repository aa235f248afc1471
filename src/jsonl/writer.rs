//! [`HttpExchange`] → JSON, one object per line.
//!
//! Output always uses the `pathname` + `query` request shape, lower-case
//! `protocol` and `method`, and arrays for every header value. `query`,
//! `host`, `body` and `timestamp` are left out entirely when absent.

use std::borrow::Borrow;
use std::io::{BufWriter, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::config::{CodecConfig, config};
use crate::error::{Error, Result};
use crate::http::{HttpExchange, HttpHeaders, QueryParameters};

#[derive(Serialize)]
struct ExchangeRecord<'a> {
    request: RequestRecord<'a>,
    response: ResponseRecord<'a>,
}

#[derive(Serialize)]
struct RequestRecord<'a> {
    protocol: &'static str,
    method: String,
    headers: &'a HttpHeaders,
    pathname: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<&'a str>,
    #[serde(skip_serializing_if = "no_query")]
    query: &'a QueryParameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponseRecord<'a> {
    status_code: u16,
    headers: &'a HttpHeaders,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

fn no_query(query: &&QueryParameters) -> bool {
    query.is_empty()
}

fn format_timestamp(at: Option<DateTime<Utc>>, enabled: bool) -> Option<String> {
    at.filter(|_| enabled)
        .map(|at| at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn record(exchange: &HttpExchange, write_timestamps: bool) -> ExchangeRecord<'_> {
    let request = exchange.request();
    let url = request.url();
    let response = exchange.response();

    ExchangeRecord {
        request: RequestRecord {
            protocol: url.protocol().scheme(),
            method: request.method().as_str().to_ascii_lowercase(),
            headers: request.headers(),
            pathname: url.pathname(),
            host: url.host(),
            query: url.query_parameters(),
            body: request.body(),
            timestamp: format_timestamp(request.timestamp(), write_timestamps),
        },
        response: ResponseRecord {
            status_code: response.status_code(),
            headers: response.headers(),
            body: response.body(),
            timestamp: format_timestamp(response.timestamp(), write_timestamps),
        },
    }
}

/// Encodes one exchange as a single line of JSON, without the trailing newline.
pub(crate) fn encode_line(exchange: &HttpExchange, write_timestamps: bool) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&record(exchange, write_timestamps))?)
}

/// Serializes one exchange as a single JSON line.
pub fn to_json(exchange: &HttpExchange) -> Result<String> {
    Ok(serde_json::to_string(&record(exchange, config().write_timestamps))?)
}

/// Serializes a sequence of exchanges, one per line, joined by `\n`.
pub fn to_json_lines<I>(exchanges: I) -> Result<String>
where
    I: IntoIterator,
    I::Item: Borrow<HttpExchange>,
{
    let lines = exchanges
        .into_iter()
        .map(|exchange| to_json(exchange.borrow()))
        .collect::<Result<Vec<String>>>()?;
    Ok(lines.join("\n"))
}

/// Writes exchanges to a byte sink, one JSON object per line.
///
/// Lines are separated by `\n`: the first line has no separator in front and
/// nothing follows the last one. Output is buffered, so call
/// [`close`](Self::close) to flush it and get the sink back.
pub struct ExchangeWriter<W: Write> {
    out: BufWriter<W>,
    write_timestamps: bool,
    written: usize,
}

impl<W: Write> ExchangeWriter<W> {
    pub fn new(out: W) -> Self {
        Self::with_config(out, config())
    }

    pub fn with_config(out: W, cfg: &CodecConfig) -> Self {
        tracing::debug!(buffer_size = cfg.buffer_size, "opening exchange writer");
        Self {
            out: BufWriter::with_capacity(cfg.buffer_size, out),
            write_timestamps: cfg.write_timestamps,
            written: 0,
        }
    }

    pub fn write(&mut self, exchange: &HttpExchange) -> Result<()> {
        let line = encode_line(exchange, self.write_timestamps)?;
        if self.written > 0 {
            self.out.write_all(b"\n")?;
        }
        self.out.write_all(&line)?;
        self.written += 1;
        tracing::trace!(line = self.written, "wrote exchange");
        Ok(())
    }

    pub fn write_all<I>(&mut self, exchanges: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Borrow<HttpExchange>,
    {
        for exchange in exchanges {
            self.write(exchange.borrow())?;
        }
        Ok(())
    }

    /// Number of exchanges written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes buffered output and returns the underlying sink.
    pub fn close(self) -> Result<W> {
        let written = self.written;
        let out = self
            .out
            .into_inner()
            .map_err(|err| Error::Io(err.into_error()))?;
        tracing::debug!(written, "closed exchange writer");
        Ok(out)
    }
}
