//! Multi-valued query parameters and the `pathname?query` codec.
//!
//! Keys keep their first-seen order and may repeat (`n=v1&n=v2`). A key
//! written without `=` has no value, which is stored as `None` rather than
//! an empty string. Encoding follows `application/x-www-form-urlencoded`
//! (space becomes `+`), and decoding accepts both `+` and `%20`.

use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use url::form_urlencoded;

use crate::error::{Error, Result};
use crate::http::hash_unordered;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParameters {
    params: IndexMap<String, Vec<Option<String>>>,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the list stored under `key`.
    pub fn add(&mut self, key: impl Into<String>, value: Option<String>) {
        self.params.entry(key.into()).or_default().push(value);
    }

    /// First value stored under `name`, or `None` when the key is absent or valueless.
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .and_then(|values| values.first())
            .and_then(|value| value.as_deref())
    }

    /// All values stored under `name`; empty when the key is absent.
    pub fn get_all(&self, name: &str) -> &[Option<String>] {
        self.params
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Option<String>])> {
        self.params
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parses a raw query string (the part after `?`).
    pub fn parse(query: &str) -> Result<Self> {
        let mut params = QueryParameters::new();
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            match pair.split_once('=') {
                Some((key, value)) => params.add(decode(key)?, Some(decode(value)?)),
                None => params.add(decode(pair)?, None),
            }
        }
        Ok(params)
    }

    /// Percent-encodes every pair into a query string, without the leading `?`.
    pub fn encode(&self) -> String {
        let mut pairs = Vec::new();
        for (key, values) in &self.params {
            let key = encode(key);
            for value in values {
                match value {
                    Some(value) => pairs.push(format!("{key}={}", encode(value))),
                    None => pairs.push(key.clone()),
                }
            }
        }
        pairs.join("&")
    }
}

impl Hash for QueryParameters {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_unordered(&self.params, state);
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for QueryParameters {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut params = QueryParameters::new();
        for (key, value) in iter {
            params.add(key, value);
        }
        params
    }
}

/// Splits `pathname [ '?' query ] [ '#' fragment ]`; the fragment is dropped.
pub(crate) fn split_path(path: &str) -> Result<(String, QueryParameters)> {
    let path = path.split_once('#').map_or(path, |(before, _)| before);
    match path.split_once('?') {
        Some((pathname, query)) => Ok((pathname.to_string(), QueryParameters::parse(query)?)),
        None => Ok((path.to_string(), QueryParameters::new())),
    }
}

/// Joins a pathname and its parameters; the pathname is returned verbatim when there are none.
pub(crate) fn join_path(pathname: &str, params: &QueryParameters) -> String {
    if params.is_empty() {
        pathname.to_string()
    } else {
        format!("{pathname}?{}", params.encode())
    }
}

fn encode(component: &str) -> String {
    form_urlencoded::byte_serialize(component.as_bytes()).collect()
}

fn decode(component: &str) -> Result<String> {
    check_escapes(component)?;
    let component = component.replace('+', " ");
    percent_decode_str(&component)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|err| Error::Decode(format!("`{component}` is not valid UTF-8 once decoded: {err}")))
}

// percent_decode_str passes broken escapes through untouched
fn check_escapes(component: &str) -> Result<()> {
    let bytes = component.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(Error::Decode(format!(
                    "incomplete percent escape at byte {i} of `{component}`"
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}
