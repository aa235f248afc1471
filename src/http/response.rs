//! Captured HTTP response.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::http::headers::HttpHeaders;

/// A captured HTTP response. The status code is kept as a plain integer so
/// non-standard codes survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HttpResponse {
    status_code: u16,
    headers: HttpHeaders,
    body: Option<String>,
    timestamp: Option<DateTime<Utc>>,
}

impl HttpResponse {
    pub fn builder() -> HttpResponseBuilder {
        HttpResponseBuilder::default()
    }

    pub fn to_builder(&self) -> HttpResponseBuilder {
        HttpResponseBuilder {
            status_code: Some(self.status_code),
            headers: self.headers.clone(),
            body: self.body.clone(),
            timestamp: self.timestamp,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Instant the response was sent.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpResponseBuilder {
    status_code: Option<u16>,
    headers: HttpHeaders,
    body: Option<String>,
    timestamp: Option<DateTime<Utc>>,
}

impl HttpResponseBuilder {
    pub fn status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn headers(mut self, headers: HttpHeaders) -> Self {
        self.headers = headers;
        self
    }

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

    pub fn build(self) -> Result<HttpResponse> {
        Ok(HttpResponse {
            status_code: self.status_code.ok_or(Error::MissingField {
                entity: "HttpResponse",
                field: "statusCode",
            })?,
            headers: self.headers,
            body: self.body,
            timestamp: self.timestamp,
        })
    }
}
