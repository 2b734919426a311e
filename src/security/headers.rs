//! Header manipulation for the forwarded hop.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Add X-Forwarded-For, X-Forwarded-Proto, X-Forwarded-Host
//!
//! # Design Decisions
//! - Headers listed in `Connection` are hop-by-hop too (RFC 9110 §7.6.1)
//! - `Host` is dropped; the client sets it from the upstream URI
//! - Existing X-Forwarded-For is appended to, never replaced

use std::net::SocketAddr;

use axum::http::header::{HeaderMap, HeaderName, HeaderValue, CONNECTION, HOST};

/// Connection-management headers regenerated on every hop.
pub const HOP_BY_HOP_HEADERS: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
}

/// Prepare inbound headers for the upstream hop.
///
/// Returns the original `Host` value, which is removed here.
pub fn prepare_upstream_headers(headers: &mut HeaderMap) -> Option<HeaderValue> {
    strip_hop_by_hop(headers);
    headers.remove(HOST)
}

/// Append forwarding metadata describing the original request.
pub fn append_forwarded(
    headers: &mut HeaderMap,
    client_addr: Option<SocketAddr>,
    original_host: Option<&HeaderValue>,
) {
    if let Some(addr) = client_addr {
        let ip = addr.ip().to_string();
        let value = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{existing}, {ip}"),
            None => ip,
        };
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }

    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));

    if let Some(host) = original_host {
        headers.insert(X_FORWARDED_HOST, host.clone());
    }
}
