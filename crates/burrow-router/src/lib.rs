//! Routing logic for tunnel matching
//!
//! Resolves an inbound (host, path, query) triple against the ordered
//! tunnel set: exact-host subdomain tunnels first, then path-prefix
//! tunnels, first match wins. Produces the fully rewritten target URL.

pub mod matcher;
pub mod rewrite;

pub use matcher::{is_reserved_path, resolve, RouteMatch, RESERVED_PREFIXES};
pub use rewrite::{rewrite_target, RewriteError};
