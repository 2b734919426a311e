//! Upstream base URLs.
//!
//! # Responsibilities
//! - Validate configured upstream URLs (scheme + host + optional port)
//! - Build the outbound URI for a forwarded path and query

use std::fmt;

use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::Uri;
use thiserror::Error;
use url::Url;

/// Error returned when an upstream URL is not a usable base URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("upstream `{url}` is not a valid URL: {reason}")]
    Invalid { url: String, reason: String },
    #[error("upstream `{0}` must use the http scheme")]
    UnsupportedScheme(String),
    #[error("upstream `{0}` has no host")]
    MissingHost(String),
    #[error("upstream `{0}` must not carry a path, query or fragment")]
    NotABaseUrl(String),
}

/// A backend base URL that matched requests are forwarded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    scheme: Scheme,
    authority: Authority,
}

impl Upstream {
    /// Parse a base URL such as `http://127.0.0.1:3000`.
    pub fn parse(raw: &str) -> Result<Self, UpstreamError> {
        let url = Url::parse(raw).map_err(|e| UpstreamError::Invalid {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if url.scheme() != "http" {
            return Err(UpstreamError::UnsupportedScheme(raw.to_string()));
        }
        let host = url
            .host_str()
            .ok_or_else(|| UpstreamError::MissingHost(raw.to_string()))?;
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(UpstreamError::NotABaseUrl(raw.to_string()));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(UpstreamError::Invalid {
                url: raw.to_string(),
                reason: "credentials are not allowed".to_string(),
            });
        }

        // Url strips the default port and keeps IPv6 brackets in host_str.
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority = authority.parse::<Authority>().map_err(|e| UpstreamError::Invalid {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            scheme: Scheme::HTTP,
            authority,
        })
    }

    /// Build the outbound URI: `upstream + path (+ "?" + query)`.
    pub fn join(&self, path: &str, query: Option<&str>) -> Result<Uri, axum::http::Error> {
        let path_and_query = match query {
            Some(q) => PathAndQuery::try_from(format!("{path}?{q}"))?,
            None => PathAndQuery::try_from(path)?,
        };
        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}
