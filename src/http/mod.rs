//! Immutable model of a captured HTTP exchange.
//!
//! Every entity is created through its builder and never mutated afterwards.
//! Updates go through `to_builder()`, which copies the current fields into a
//! fresh builder.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::Error;

pub mod exchange;
pub mod headers;
pub mod query;
pub mod request;
pub mod response;
pub mod url;

pub use exchange::HttpExchange;
pub use headers::HttpHeaders;
pub use query::QueryParameters;
pub use request::HttpRequest;
pub use response::HttpResponse;
pub use url::HttpUrl;

/// HTTP protocol, either plain `http` or encrypted `https`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpProtocol {
    Http,
    Https,
}

impl HttpProtocol {
    /// Lower-case URL scheme, as written on the wire.
    pub fn scheme(&self) -> &'static str {
        match self {
            HttpProtocol::Http => "http",
            HttpProtocol::Https => "https",
        }
    }
}

impl FromStr for HttpProtocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(HttpProtocol::Http),
            "https" => Ok(HttpProtocol::Https),
            _ => Err(Error::UnrecognizedEnumValue {
                kind: "protocol",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for HttpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Connect,
    Options,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 9] = [
        HttpMethod::Get,
        HttpMethod::Head,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Connect,
        HttpMethod::Options,
        HttpMethod::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }
}

/// Case-insensitive: `get`, `Get` and `GET` all parse to [`HttpMethod::Get`].
impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnrecognizedEnumValue {
                kind: "method",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hashes an ordered map independently of its insertion order, so the hash
/// agrees with `IndexMap`'s order-insensitive equality.
pub(crate) fn hash_unordered<V: Hash, H: Hasher>(map: &IndexMap<String, V>, state: &mut H) {
    let mut entries: Vec<(&String, &V)> = map.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
    entries.hash(state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_str_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert_eq!("OPTIONS".parse::<HttpMethod>().unwrap(), HttpMethod::Options);
    }

    #[test]
    fn test_all_methods_round_trip_through_as_str() {
        for method in HttpMethod::ALL {
            assert_eq!(method.as_str().parse::<HttpMethod>().unwrap(), method);
        }
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_unknown_method() {
        let err = "FETCH".parse::<HttpMethod>().unwrap_err();
        assert!(matches!(
            err,
            Error::UnrecognizedEnumValue { kind: "method", ref value } if value == "FETCH"
        ));
    }

    #[test]
    fn test_protocol_from_str() {
        assert_eq!("HTTPS".parse::<HttpProtocol>().unwrap(), HttpProtocol::Https);
        assert_eq!("http".parse::<HttpProtocol>().unwrap(), HttpProtocol::Http);
        assert!("ftp".parse::<HttpProtocol>().is_err());
        assert_eq!(HttpProtocol::Https.to_string(), "https");
    }
}
