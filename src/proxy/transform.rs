//! URL rewriting and header filtering for proxied requests.
//!
//! The mount prefix is stripped before forwarding (`/auth/login` →
//! `<upstream>/login`), the query string is preserved, and hop-by-hop
//! headers are dropped in both directions. Everything else is relayed
//! untouched.

use axum::http::Uri;

/// Headers that belong to a single connection, not the end-to-end request.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Builds the upstream URL for a request: base URL + path with the mount
/// prefix stripped + original query string.
pub fn upstream_url(upstream_base: &str, prefix: &str, uri: &Uri) -> String {
    let stripped = match uri.path().strip_prefix(prefix) {
        Some("") | None => "/",
        Some(rest) => rest,
    };
    match uri.query() {
        Some(query) => format!("{}{}?{}", upstream_base.trim_end_matches('/'), stripped, query),
        None => format!("{}{}", upstream_base.trim_end_matches('/'), stripped),
    }
}

/// Copies request headers for forwarding, dropping hop-by-hop headers plus
/// `host` and `content-length`, which the client rebuilds.
pub fn request_headers(headers: &axum::http::HeaderMap) -> reqwest::header::HeaderMap {
    let mut out = reqwest::header::HeaderMap::new();
    for (name, value) in headers {
        let name_str = name.as_str();
        if is_hop_by_hop(name_str)
            || name_str.eq_ignore_ascii_case("host")
            || name_str.eq_ignore_ascii_case("content-length")
        {
            continue;
        }
        if let (Ok(n), Ok(v)) = (
            reqwest::header::HeaderName::from_bytes(name_str.as_bytes()),
            reqwest::header::HeaderValue::from_bytes(value.as_bytes()),
        ) {
            out.append(n, v);
        }
    }
    out
}

/// Copies upstream response headers for the relayed response, dropping
/// hop-by-hop headers and `content-length` (recomputed for the new body).
pub fn response_headers(headers: &reqwest::header::HeaderMap) -> axum::http::HeaderMap {
    let mut out = axum::http::HeaderMap::new();
    for (name, value) in headers {
        let name_str = name.as_str();
        if is_hop_by_hop(name_str) || name_str.eq_ignore_ascii_case("content-length") {
            continue;
        }
        if let (Ok(n), Ok(v)) = (
            axum::http::HeaderName::from_bytes(name_str.as_bytes()),
            axum::http::HeaderValue::from_bytes(value.as_bytes()),
        ) {
            out.append(n, v);
        }
    }
    out
}
