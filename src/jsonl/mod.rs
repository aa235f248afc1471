//! HTTP exchanges in JSON Lines: one JSON object per exchange, one exchange
//! per line.
//!
//! ```text
//! {"request":{"protocol":"https","method":"get","headers":{...},"pathname":"/user/repos","host":"api.github.com","query":{...}},"response":{"statusCode":200,"headers":{...},"body":"..."}}
//! {"request":{...},"response":{...}}
//! ```
//!
//! Reading is lazy: [`ExchangeLines`] parses one line per call to `next`.
//! Writing goes through [`ExchangeWriter`], which must be closed to flush.

use std::io::{BufRead, BufReader, Read};

use crate::config::config;

pub mod async_io;
mod reader;
mod writer;

pub use async_io::{AsyncExchangeReader, AsyncExchangeWriter};
pub use reader::{ExchangeLines, from_json, from_reader, parse_exchange};
pub use writer::{ExchangeWriter, to_json, to_json_lines};

/// Lazily parses exchanges from JSONL text.
pub fn from_json_lines(text: &str) -> ExchangeLines<&[u8]> {
    ExchangeLines::new(text.as_bytes())
}

/// Lazily parses exchanges from a buffered text source.
pub fn read_exchanges<R: BufRead>(reader: R) -> ExchangeLines<R> {
    ExchangeLines::new(reader)
}

/// Lazily parses exchanges from a UTF-8 byte stream, buffering it first.
pub fn from_json_lines_reader<R: Read>(reader: R) -> ExchangeLines<BufReader<R>> {
    ExchangeLines::new(BufReader::with_capacity(config().buffer_size, reader))
}
