//! Upstream forwarding
//!
//! Executes the outbound call for a matched tunnel: rewrites headers,
//! streams the inbound body upstream, and hands back the upstream
//! response for streaming relay. Redirects are never followed here; 3xx
//! responses belong to the original client.

pub mod forwarder;
pub mod headers;

pub use forwarder::{ForwardError, Forwarder};
pub use headers::{outbound_headers, relayed_response_headers};
