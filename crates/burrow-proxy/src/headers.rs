//! Header hygiene for both directions of the proxy hop

use http::header::{
    HeaderMap, HeaderName, HeaderValue, CONNECTION, CONTENT_LENGTH, HOST, PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION, TE, TRAILER, TRANSFER_ENCODING, UPGRADE,
};
use std::net::IpAddr;

pub const X_FORWARDED_HOST: &str = "x-forwarded-host";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Headers that describe the inbound hop, not the message. The outbound
/// client recomputes framing for the streamed body, so length and
/// encoding headers must not be copied either.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    name == CONNECTION
        || name == TRANSFER_ENCODING
        || name == CONTENT_LENGTH
        || name == TE
        || name == TRAILER
        || name == UPGRADE
        || name == PROXY_AUTHENTICATE
        || name == PROXY_AUTHORIZATION
        || name.as_str() == "keep-alive"
}

/// Build the header set for the upstream request.
///
/// Clones the inbound headers minus `Host` and hop-by-hop headers, then
/// stamps the `X-Forwarded-*` trio. An existing `X-Forwarded-For` chain
/// is appended to, never overwritten.
pub fn outbound_headers(
    inbound: &HeaderMap,
    original_host: &str,
    client_addr: Option<IpAddr>,
    proto: &str,
) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(inbound.len() + 3);

    for (name, value) in inbound {
        if name == HOST || is_hop_by_hop(name) {
            continue;
        }
        if name.as_str() == X_FORWARDED_HOST || name.as_str() == X_FORWARDED_PROTO {
            // Replaced below with this hop's values
            continue;
        }
        if name.as_str() == X_FORWARDED_FOR {
            // Folded into the appended chain below
            continue;
        }
        out.append(name.clone(), value.clone());
    }

    if let Ok(value) = HeaderValue::from_str(original_host) {
        out.insert(HeaderName::from_static(X_FORWARDED_HOST), value);
    }

    let upstream_chain = inbound
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());
    let chain = match (upstream_chain, client_addr) {
        (Some(existing), Some(addr)) => Some(format!("{existing}, {addr}")),
        (Some(existing), None) => Some(existing.to_string()),
        (None, Some(addr)) => Some(addr.to_string()),
        (None, None) => None,
    };
    if let Some(chain) = chain {
        if let Ok(value) = HeaderValue::from_str(&chain) {
            out.insert(HeaderName::from_static(X_FORWARDED_FOR), value);
        }
    }

    if let Ok(value) = HeaderValue::from_str(proto) {
        out.insert(HeaderName::from_static(X_FORWARDED_PROTO), value);
    }

    out
}

/// Copy upstream response headers for relay to the original client.
///
/// `Transfer-Encoding` is dropped when `Content-Length` is also present;
/// sending both is invalid and some upstreams emit the pair.
pub fn relayed_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let has_length = upstream.contains_key(CONTENT_LENGTH);
    let mut out = HeaderMap::with_capacity(upstream.len());

    for (name, value) in upstream {
        if name == TRANSFER_ENCODING && has_length {
            continue;
        }
        out.append(name.clone(), value.clone());
    }

    out
}
