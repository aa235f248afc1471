//! JSON → [`HttpExchange`].
//!
//! The input is first parsed into a `serde_json::Value` tree and then walked
//! field by field, so every failure can name the JSON path it happened at.
//! Two historical request shapes are accepted:
//!
//! - `pathname` plus an optional `query` object (what the writer emits);
//! - a single combined `path` string (`/user/repos?page=2`).
//!
//! Header and query values may be a single string or an array of strings.

use std::io::{BufRead, Read};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::http::headers::HttpHeadersBuilder;
use crate::http::{
    HttpExchange, HttpHeaders, HttpMethod, HttpProtocol, HttpRequest, HttpResponse, HttpUrl,
};

type Object = Map<String, Value>;

/// Parses one exchange from JSON text. The object may span several lines.
pub fn from_json(text: &str) -> Result<HttpExchange> {
    let value: Value = serde_json::from_str(text)?;
    parse_exchange(&value)
}

/// Reads one exchange from a UTF-8 byte source.
pub fn from_reader<R: Read>(mut reader: R) -> Result<HttpExchange> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(Error::from_text_io)?;
    from_json(&text)
}

/// Converts an already parsed JSON tree into an exchange.
pub fn parse_exchange(value: &Value) -> Result<HttpExchange> {
    let root = as_object(value, "")?;
    let request = parse_request(as_object(required(root, "request", "")?, "request")?)?;
    let response = parse_response(as_object(required(root, "response", "")?, "response")?)?;
    Ok(HttpExchange::new(request, response))
}

fn parse_request(obj: &Object) -> Result<HttpRequest> {
    let path = "request";
    let method: HttpMethod = required_str(obj, "method", path)?.parse()?;
    let protocol: HttpProtocol = required_str(obj, "protocol", path)?.parse()?;

    let mut builder = HttpRequest::builder()
        .method(method)
        .url(parse_url(obj, protocol, path)?)
        .headers(parse_headers(obj, path)?);
    if let Some(body) = optional_str(obj, "body", path)? {
        builder = builder.body(body);
    }
    if let Some(timestamp) = optional_timestamp(obj, "timestamp", path)? {
        builder = builder.timestamp(timestamp);
    }
    builder.build()
}

fn parse_url(obj: &Object, protocol: HttpProtocol, path: &str) -> Result<HttpUrl> {
    let mut builder = HttpUrl::builder().protocol(protocol);

    if let Some(pathname) = optional_str(obj, "pathname", path)? {
        builder = builder.pathname(pathname)?;
        if let Some(query) = optional_object(obj, "query", path)? {
            let query_path = join(path, "query");
            for (key, value) in query {
                for value in string_values(value, &join(&query_path, key))? {
                    builder = builder.add_query_parameter(key.as_str(), value);
                }
            }
        }
    } else if let Some(combined) = optional_str(obj, "path", path)? {
        builder = builder.path(combined)?;
    } else {
        return Err(Error::malformed(
            join(path, "pathname"),
            "missing required field (neither `pathname` nor `path` present)",
        ));
    }

    if let Some(host) = optional_str(obj, "host", path)? {
        builder = builder.host(host);
    }
    builder.build()
}

fn parse_response(obj: &Object) -> Result<HttpResponse> {
    let path = "response";
    let status_path = join(path, "statusCode");
    let status_code = required(obj, "statusCode", path)?
        .as_u64()
        .and_then(|code| u16::try_from(code).ok())
        .ok_or_else(|| Error::malformed(&status_path, "expected an integer status code"))?;

    let mut builder = HttpResponse::builder()
        .status_code(status_code)
        .headers(parse_headers(obj, path)?);
    if let Some(body) = optional_str(obj, "body", path)? {
        builder = builder.body(body);
    }
    if let Some(timestamp) = optional_timestamp(obj, "timestamp", path)? {
        builder = builder.timestamp(timestamp);
    }
    builder.build()
}

fn parse_headers(obj: &Object, path: &str) -> Result<HttpHeaders> {
    let headers_path = join(path, "headers");
    let headers = as_object(required(obj, "headers", path)?, &headers_path)?;

    let mut builder = HttpHeadersBuilder::default();
    for (name, value) in headers {
        let value_path = join(&headers_path, name);
        let values = string_values(value, &value_path)?
            .into_iter()
            .map(|value| value.ok_or_else(|| Error::malformed(&value_path, "header value is null")))
            .collect::<Result<Vec<String>>>()?;
        builder = builder.add_all(name, values);
    }
    Ok(builder.build())
}

/// Accepts `"v"`, `null` or `["v1", null, ...]`; `null` stands for "no value".
fn string_values(value: &Value, path: &str) -> Result<Vec<Option<String>>> {
    match value {
        Value::String(s) => Ok(vec![Some(s.clone())]),
        Value::Null => Ok(vec![None]),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(Some(s.clone())),
                Value::Null => Ok(None),
                other => Err(Error::malformed(
                    format!("{path}[{i}]"),
                    format!("expected a string, found {}", kind(other)),
                )),
            })
            .collect(),
        other => Err(Error::malformed(
            path,
            format!("expected a string or an array of strings, found {}", kind(other)),
        )),
    }
}

fn required<'a>(obj: &'a Object, key: &str, path: &str) -> Result<&'a Value> {
    obj.get(key)
        .ok_or_else(|| Error::malformed(join(path, key), "missing required field"))
}

fn required_str<'a>(obj: &'a Object, key: &str, path: &str) -> Result<&'a str> {
    let value = required(obj, key, path)?;
    value
        .as_str()
        .ok_or_else(|| Error::malformed(join(path, key), format!("expected a string, found {}", kind(value))))
}

/// `None` when the key is absent or `null`; any other non-string is an error.
fn optional_str<'a>(obj: &'a Object, key: &str, path: &str) -> Result<Option<&'a str>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(Error::malformed(
            join(path, key),
            format!("expected a string, found {}", kind(other)),
        )),
    }
}

fn optional_object<'a>(obj: &'a Object, key: &str, path: &str) -> Result<Option<&'a Object>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => as_object(value, &join(path, key)).map(Some),
    }
}

fn optional_timestamp(obj: &Object, key: &str, path: &str) -> Result<Option<DateTime<Utc>>> {
    let Some(text) = optional_str(obj, key, path)? else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(text)
        .map(|at| Some(at.with_timezone(&Utc)))
        .map_err(|err| Error::malformed(join(path, key), format!("invalid ISO-8601 timestamp `{text}`: {err}")))
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Object> {
    value.as_object().ok_or_else(|| {
        let path = if path.is_empty() { "$" } else { path };
        Error::malformed(path, format!("expected an object, found {}", kind(value)))
    })
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Line bookkeeping shared by the blocking and async JSONL readers.
#[derive(Debug)]
pub(crate) struct LineDecoder {
    line: usize,
    max_line_size: usize,
    skip_blank_lines: bool,
    done: bool,
}

pub(crate) enum Step {
    Skip,
    Item(Result<HttpExchange>),
    End,
}

impl LineDecoder {
    pub(crate) fn new(cfg: &CodecConfig) -> Self {
        Self {
            line: 0,
            max_line_size: cfg.max_line_size,
            skip_blank_lines: cfg.skip_blank_lines,
            done: false,
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done
    }

    /// How many bytes to read for the next line: the limit plus room for a
    /// `\r\n` terminator, so an oversized line can be told apart from one
    /// that fits exactly.
    pub(crate) fn read_limit(&self) -> u64 {
        match self.max_line_size {
            0 => u64::MAX,
            max => max as u64 + 2,
        }
    }

    /// Ends the sequence with an error from the underlying resource.
    pub(crate) fn fail(&mut self, err: std::io::Error) -> Step {
        self.done = true;
        Step::Item(Err(Error::Io(err)))
    }

    /// Decodes one raw line as returned by `read_until(b'\n')`; empty means end of input.
    pub(crate) fn accept(&mut self, raw: &[u8]) -> Step {
        if raw.is_empty() {
            self.done = true;
            tracing::debug!(lines = self.line, "reached end of JSONL input");
            return Step::End;
        }
        self.line += 1;

        let content = raw.strip_suffix(b"\n").unwrap_or(raw);
        let content = content.strip_suffix(b"\r").unwrap_or(content);
        if self.max_line_size > 0 && content.len() > self.max_line_size {
            return self.terminate(Error::LineTooLong {
                line: self.line,
                limit: self.max_line_size,
            });
        }

        let text = match std::str::from_utf8(content) {
            Ok(text) => text,
            Err(err) => {
                return self.terminate(Error::Decode(format!("input is not valid UTF-8: {err}")));
            }
        };
        if self.skip_blank_lines && text.trim().is_empty() {
            return Step::Skip;
        }

        match from_json(text) {
            Ok(exchange) => {
                tracing::trace!(line = self.line, "parsed exchange");
                Step::Item(Ok(exchange))
            }
            Err(err) => self.terminate(err),
        }
    }

    fn terminate(&mut self, err: Error) -> Step {
        self.done = true;
        let err = err.at_line(self.line);
        tracing::warn!(line = self.line, error = %err, "stopping JSONL input at malformed line");
        Step::Item(Err(err))
    }
}

/// Lazy, single-pass sequence of exchanges read one line at a time.
///
/// The first error ends the sequence; later calls to `next` return `None`.
#[derive(Debug)]
pub struct ExchangeLines<R> {
    reader: R,
    buf: Vec<u8>,
    decoder: LineDecoder,
}

impl<R: BufRead> ExchangeLines<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, crate::config::config())
    }

    pub fn with_config(reader: R, cfg: &CodecConfig) -> Self {
        tracing::debug!(max_line_size = cfg.max_line_size, "opening exchange reader");
        Self {
            reader,
            buf: Vec::new(),
            decoder: LineDecoder::new(cfg),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> Iterator for ExchangeLines<R> {
    type Item = Result<HttpExchange>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.decoder.is_done() {
            self.buf.clear();
            let limit = self.decoder.read_limit();
            let step = match (&mut self.reader).take(limit).read_until(b'\n', &mut self.buf) {
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
}
