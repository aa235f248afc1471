//! Immutable HTTP exchange model and a streaming JSON Lines codec for
//! captured HTTP traffic.
//!
//! ```text
//! HttpExchange ──writer──▶ {"request":{...},"response":{...}}\n{...}
//!              ◀──reader──
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod http;
pub mod jsonl;

pub use config::CodecConfig;
pub use error::{Error, Result};
pub use http::{
    HttpExchange, HttpHeaders, HttpMethod, HttpProtocol, HttpRequest, HttpResponse, HttpUrl,
    QueryParameters,
};
pub use jsonl::{ExchangeLines, ExchangeWriter};
