//! Captured HTTP request: URL, method, headers, optional body and timestamp.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::http::headers::HttpHeaders;
use crate::http::url::HttpUrl;
use crate::http::{HttpMethod, HttpProtocol};

/// A captured HTTP request. The body is kept as raw text, never decoded
/// or decompressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HttpRequest {
    url: HttpUrl,
    method: HttpMethod,
    headers: HttpHeaders,
    body: Option<String>,
    timestamp: Option<DateTime<Utc>>,
}

impl HttpRequest {
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    pub fn to_builder(&self) -> HttpRequestBuilder {
        HttpRequestBuilder {
            url: Some(self.url.clone()),
            method: Some(self.method),
            headers: self.headers.clone(),
            body: self.body.clone(),
            timestamp: self.timestamp,
        }
    }

    pub fn url(&self) -> &HttpUrl {
        &self.url
    }

    pub fn protocol(&self) -> HttpProtocol {
        self.url.protocol()
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Instant the request was initiated.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }
}

/// Mutable config for an [`HttpRequest`]; `url` and `method` are required.
#[derive(Debug, Clone, Default)]
pub struct HttpRequestBuilder {
    url: Option<HttpUrl>,
    method: Option<HttpMethod>,
    headers: HttpHeaders,
    body: Option<String>,
    timestamp: Option<DateTime<Utc>>,
}

impl HttpRequestBuilder {
    pub fn url(mut self, url: HttpUrl) -> Self {
        self.url = Some(url);
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn headers(mut self, headers: HttpHeaders) -> Self {
        self.headers = headers;
        self
    }

    /// Appends a single header value to the headers set so far.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers = self.headers.to_builder().add(name, value).build();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn build(self) -> Result<HttpRequest> {
        Ok(HttpRequest {
            url: self.url.ok_or(Error::MissingField {
                entity: "HttpRequest",
                field: "url",
            })?,
            method: self.method.ok_or(Error::MissingField {
                entity: "HttpRequest",
                field: "method",
            })?,
            headers: self.headers,
            body: self.body,
            timestamp: self.timestamp,
        })
    }
}
