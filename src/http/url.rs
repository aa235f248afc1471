//! HTTP(S) URL split into protocol, host, pathname and query parameters.
//!
//! The path and query have two interchangeable views: the structured
//! `pathname` + [`QueryParameters`] pair, and the combined percent-encoded
//! `path` string (`/user/repos?page=2`). Setting either view on the builder
//! produces the same [`HttpUrl`].

use indexmap::IndexMap;
use url::Url;

use crate::error::{Error, Result};
use crate::http::HttpProtocol;
use crate::http::query::{QueryParameters, join_path, split_path};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HttpUrl {
    protocol: HttpProtocol,
    host: Option<String>,
    pathname: String,
    query: QueryParameters,
}

impl HttpUrl {
    pub fn builder() -> HttpUrlBuilder {
        HttpUrlBuilder::default()
    }

    pub fn to_builder(&self) -> HttpUrlBuilder {
        HttpUrlBuilder {
            protocol: Some(self.protocol),
            host: self.host.clone(),
            pathname: Some(self.pathname.clone()),
            query: self.query.clone(),
        }
    }

    /// Parses an absolute `http://` or `https://` URL.
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input)
            .map_err(|err| Error::InvalidArgument(format!("invalid URL `{input}`: {err}")))?;
        HttpUrl::try_from(&url)
    }

    pub fn protocol(&self) -> HttpProtocol {
        self.protocol
    }

    /// Host, including a `:port` suffix when one was given.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    pub fn query_parameters(&self) -> &QueryParameters {
        &self.query
    }

    pub fn get_first_query_parameter(&self, name: &str) -> Option<&str> {
        self.query.get_first(name)
    }

    pub fn get_all_query_parameters(&self, name: &str) -> &[Option<String>] {
        self.query.get_all(name)
    }

    /// Pathname followed by `?` and the percent-encoded query, if any.
    pub fn path(&self) -> String {
        join_path(&self.pathname, &self.query)
    }

    /// Converts to a standard [`Url`]; fails when the URL has no host.
    pub fn to_url(&self) -> Result<Url> {
        let host = self.host.as_deref().ok_or_else(|| {
            Error::InvalidArgument("cannot build an absolute URL without a host".to_string())
        })?;
        let text = format!("{}://{}{}", self.protocol.scheme(), host, self.path());
        Url::parse(&text).map_err(|err| Error::InvalidArgument(format!("invalid URL `{text}`: {err}")))
    }
}

impl TryFrom<&Url> for HttpUrl {
    type Error = Error;

    fn try_from(url: &Url) -> Result<Self> {
        HttpUrl::builder().url(url)?.build()
    }
}

impl TryFrom<Url> for HttpUrl {
    type Error = Error;

    fn try_from(url: Url) -> Result<Self> {
        HttpUrl::try_from(&url)
    }
}

/// Mutable config for an [`HttpUrl`]; `protocol` and `pathname` are required.
#[derive(Debug, Clone, Default)]
pub struct HttpUrlBuilder {
    protocol: Option<HttpProtocol>,
    host: Option<String>,
    pathname: Option<String>,
    query: QueryParameters,
}

impl HttpUrlBuilder {
    pub fn protocol(mut self, protocol: HttpProtocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the pathname alone. A `?` or `#` is rejected; use
    /// [`path`](Self::path) for combined pathname and query strings.
    pub fn pathname(mut self, pathname: impl Into<String>) -> Result<Self> {
        let pathname = pathname.into();
        if let Some(c) = pathname.chars().find(|c| matches!(c, '?' | '#')) {
            return Err(Error::InvalidArgument(format!(
                "pathname `{pathname}` contains `{c}`, set it as a path instead"
            )));
        }
        self.pathname = Some(pathname);
        Ok(self)
    }

    /// Sets pathname and query from a combined `pathname[?query]` string,
    /// replacing any parameters added before.
    pub fn path(mut self, path: &str) -> Result<Self> {
        let (pathname, query) = split_path(path)?;
        self.pathname = Some(pathname);
        self.query = query;
        Ok(self)
    }

    pub fn add_query_parameter(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        self.query.add(key, value);
        self
    }

    /// Replaces the query with one value per key.
    pub fn query_parameters<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query = params
            .into_iter()
            .map(|(key, value)| (key, Some(value.into())))
            .collect();
        self
    }

    /// Replaces the query with a multi-valued map.
    pub fn query_parameters_multivalued(mut self, params: IndexMap<String, Vec<Option<String>>>) -> Self {
        self.query = params
            .into_iter()
            .flat_map(|(key, values)| values.into_iter().map(move |value| (key.clone(), value)))
            .collect();
        self
    }

    /// Takes protocol, host (with a non-default port) and path from `url`.
    pub fn url(self, url: &Url) -> Result<Self> {
        let protocol = match url.scheme() {
            "http" => HttpProtocol::Http,
            "https" => HttpProtocol::Https,
            other => {
                return Err(Error::InvalidArgument(format!(
                    "invalid protocol (only 'http' and 'https' supported): {other}"
                )));
            }
        };

        let mut builder = self.protocol(protocol);
        if let Some(host) = url.host_str() {
            builder = match url.port() {
                Some(port) => builder.host(format!("{host}:{port}")),
                None => builder.host(host),
            };
        }

        let path = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        builder.path(&path)
    }

    pub fn build(self) -> Result<HttpUrl> {
        Ok(HttpUrl {
            protocol: self.protocol.ok_or(Error::MissingField {
                entity: "HttpUrl",
                field: "protocol",
            })?,
            host: self.host,
            pathname: self.pathname.ok_or(Error::MissingField {
                entity: "HttpUrl",
                field: "pathname",
            })?,
            query: self.query,
        })
    }
}
