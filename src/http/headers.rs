//! HTTP headers abstraction for [`HttpRequest`](crate::http::request::HttpRequest) and
//! [`HttpResponse`](crate::http::response::HttpResponse)
//!
//! Headers are stored in an ordered map keyed by the lower-cased header name,
//! each name holding the ordered list of its values. Names keep the order in
//! which they were first seen, values keep the order in which they were added.
//!
//! Both header names and values are stored as raw strings, without validation
//! or restrictions on which headers are allowed.

use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::Serialize;

use crate::http::hash_unordered;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HttpHeaders {
    headers: IndexMap<String, Vec<String>>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> HttpHeadersBuilder {
        HttpHeadersBuilder::default()
    }

    pub fn to_builder(&self) -> HttpHeadersBuilder {
        HttpHeadersBuilder {
            headers: self.headers.clone(),
        }
    }

    /// First value stored under `name`, compared case-insensitively.
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// All values stored under `name`; empty when the header is absent.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.headers
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_lowercase())
    }

    /// Iterates `(name, values)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.headers
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl Hash for HttpHeaders {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_unordered(&self.headers, state);
    }
}

/// Accumulates header values before freezing them into [`HttpHeaders`].
#[derive(Debug, Clone, Default)]
pub struct HttpHeadersBuilder {
    headers: IndexMap<String, Vec<String>>,
}

impl HttpHeadersBuilder {
    pub fn add(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.to_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    /// Appends every value in `values`; an empty list leaves the headers untouched.
    pub fn add_all<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values = values.into_iter().map(Into::into).peekable();
        if values.peek().is_some() {
            self.headers
                .entry(name.to_lowercase())
                .or_default()
                .extend(values);
        }
        self
    }

    pub fn build(self) -> HttpHeaders {
        HttpHeaders {
            headers: self.headers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(headers: &HttpHeaders) -> u64 {
        let mut hasher = DefaultHasher::new();
        headers.hash(&mut hasher);
        hasher.finish()
    }

    fn sample() -> HttpHeaders {
        HttpHeaders::builder()
            .add("header", "value")
            .add("header1", "value1")
            .add("header1", "value2")
            .add_all("headers", ["v1", "v2"])
            .build()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let headers = sample();
        assert_eq!(headers.get_first("header"), Some("value"));
        assert_eq!(headers.get_first("Header"), Some("value"));
        assert_eq!(headers.get_all("HEADER1"), ["value1", "value2"]);

        let headers = HttpHeaders::builder().add("X-Foo", "bar").build();
        assert_eq!(headers.get_first("x-foo"), Some("bar"));
        assert!(headers.contains("X-FOO"));
    }

    #[test]
    fn test_missing_header() {
        let headers = sample();
        assert!(headers.get_all("non-existing").is_empty());
        assert_eq!(headers.get_first("non-existing"), None);
    }

    #[test]
    fn test_values_keep_insertion_order() {
        let headers = sample();
        assert_eq!(headers.get_all("headers"), ["v1", "v2"]);
        assert_eq!(headers.get_first("headers"), Some("v1"));

        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["header", "header1", "headers"]);
    }

    #[test]
    fn test_mixed_case_names_share_one_entry() {
        let headers = HttpHeaders::builder()
            .add("Set-Cookie", "a=1")
            .add("set-cookie", "b=2")
            .build();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get_all("SET-COOKIE"), ["a=1", "b=2"]);
    }

    #[test]
    fn test_add_all_with_no_values_adds_nothing() {
        let headers = HttpHeaders::builder()
            .add_all("accept", Vec::<String>::new())
            .build();
        assert!(headers.is_empty());
        assert!(!headers.contains("accept"));
    }

    #[test]
    fn test_equality_and_hash() {
        assert_eq!(sample(), sample());
        assert_eq!(hash_of(&sample()), hash_of(&sample()));

        let reordered = HttpHeaders::builder()
            .add_all("headers", ["v1", "v2"])
            .add("header1", "value1")
            .add("header1", "value2")
            .add("header", "value")
            .build();
        assert_eq!(sample(), reordered);
        assert_eq!(hash_of(&sample()), hash_of(&reordered));

        let other = sample().to_builder().add("header", "value2").build();
        assert_ne!(sample(), other);
    }

    #[test]
    fn test_serializes_as_arrays() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"header":["value"],"header1":["value1","value2"],"headers":["v1","v2"]}"#
        );
    }
}
