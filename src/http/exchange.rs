//! Request/response pairs.

use crate::error::{Error, Result};
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;

/// A request paired with the response it received; the unit written to and
/// read from a JSONL capture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HttpExchange {
    request: HttpRequest,
    response: HttpResponse,
}

impl HttpExchange {
    pub fn new(request: HttpRequest, response: HttpResponse) -> Self {
        Self { request, response }
    }

    pub fn builder() -> HttpExchangeBuilder {
        HttpExchangeBuilder::default()
    }

    pub fn to_builder(&self) -> HttpExchangeBuilder {
        HttpExchangeBuilder {
            request: Some(self.request.clone()),
            response: Some(self.response.clone()),
        }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    pub fn into_parts(self) -> (HttpRequest, HttpResponse) {
        (self.request, self.response)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpExchangeBuilder {
    request: Option<HttpRequest>,
    response: Option<HttpResponse>,
}

impl HttpExchangeBuilder {
    pub fn request(mut self, request: HttpRequest) -> Self {
        self.request = Some(request);
        self
    }

    pub fn response(mut self, response: HttpResponse) -> Self {
        self.response = Some(response);
        self
    }

    pub fn build(self) -> Result<HttpExchange> {
        Ok(HttpExchange {
            request: self.request.ok_or(Error::MissingField {
                entity: "HttpExchange",
                field: "request",
            })?,
            response: self.response.ok_or(Error::MissingField {
                entity: "HttpExchange",
                field: "response",
            })?,
        })
    }
}
