//! Pure tunnel matching
//!
//! Side-effect free: takes the ordered tunnel list plus the inbound
//! request coordinates and decides where (or whether) to forward.
//! The list order from the store is the priority policy, so both scans
//! take the first hit and stop.

use crate::rewrite::rewrite_target;
use burrow_proto::{Tunnel, TunnelKind};
use tracing::error;
use url::Url;

/// Path prefixes reserved for the management API and internal pages.
/// Requests under these are never eligible for path-tunnel matching.
pub const RESERVED_PREFIXES: &[&str] = &["/api"];

/// Whether a request path sits in the reserved management namespace
pub fn is_reserved_path(path: &str) -> bool {
    RESERVED_PREFIXES.iter().any(|prefix| {
        path == *prefix || (path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'/'))
    })
}

/// Outcome of matching one inbound request
#[derive(Debug, Clone, PartialEq)]
pub enum RouteMatch {
    /// Forward to `target`, which already carries the rewritten path and query
    Forward { tunnel: Tunnel, target: Url },
    /// Normal outcome, surfaced to the client as a 404
    NoMatch,
}

/// Resolve an inbound (host, path, query) against the tunnel set.
///
/// Subdomain tunnels are checked first with an exact, case-sensitive host
/// comparison (no normalization, port included as received). Path tunnels
/// are checked second with a plain prefix test (`/ab` matches `/abc`),
/// unless the request path is reserved. First match wins in both passes.
///
/// A stored target that no longer parses is skipped with an error log so
/// stale data never produces a partial URL.
pub fn resolve(tunnels: &[Tunnel], host: &str, path: &str, query: Option<&str>) -> RouteMatch {
    for tunnel in tunnels.iter().filter(|t| t.kind == TunnelKind::Subdomain) {
        if host != tunnel.route {
            continue;
        }
        match rewrite_target(&tunnel.target, path, query) {
            Ok(target) => {
                return RouteMatch::Forward {
                    tunnel: tunnel.clone(),
                    target,
                }
            }
            Err(e) => {
                error!(id = %tunnel.id, route = %tunnel.route, target = %tunnel.target,
                       error = %e, "stored target is invalid, skipping tunnel");
            }
        }
    }

    if !is_reserved_path(path) {
        for tunnel in tunnels.iter().filter(|t| t.kind == TunnelKind::Path) {
            if !path.starts_with(&tunnel.route) {
                continue;
            }
            let remaining = &path[tunnel.route.len()..];
            match rewrite_target(&tunnel.target, remaining, query) {
                Ok(target) => {
                    return RouteMatch::Forward {
                        tunnel: tunnel.clone(),
                        target,
                    }
                }
                Err(e) => {
                    error!(id = %tunnel.id, route = %tunnel.route, target = %tunnel.target,
                           error = %e, "stored target is invalid, skipping tunnel");
                }
            }
        }
    }

    RouteMatch::NoMatch
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_proto::sort_tunnels;
    use chrono::Utc;

    fn tunnel(kind: TunnelKind, route: &str, target: &str) -> Tunnel {
        Tunnel {
            id: format!("id-{route}"),
            kind,
            route: route.to_string(),
            target: target.to_string(),
            name: None,
            created_at: Utc::now(),
        }
    }

    fn expect_target(result: RouteMatch) -> Url {
        match result {
            RouteMatch::Forward { target, .. } => target,
            RouteMatch::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn test_subdomain_match_carries_path_and_query() {
        let tunnels = vec![tunnel(
            TunnelKind::Subdomain,
            "a.example.com",
            "http://localhost:9000",
        )];

        let target = expect_target(resolve(&tunnels, "a.example.com", "/x", Some("y=1")));
        assert_eq!(target.as_str(), "http://localhost:9000/x?y=1");
    }

    #[test]
    fn test_path_match_strips_route_prefix() {
        let tunnels = vec![tunnel(TunnelKind::Path, "/api2", "https://up.example.com/v1")];

        let target = expect_target(resolve(&tunnels, "proxy.example.com", "/api2/users", None));
        assert_eq!(target.as_str(), "https://up.example.com/v1/users");
    }

    #[test]
    fn test_path_prefix_is_not_segment_aware() {
        let tunnels = vec![tunnel(TunnelKind::Path, "/ab", "http://localhost:9000")];

        let target = expect_target(resolve(&tunnels, "proxy.example.com", "/abc", None));
        assert_eq!(target.as_str(), "http://localhost:9000/c");
    }

    #[test]
    fn test_host_comparison_is_case_sensitive() {
        let tunnels = vec![tunnel(
            TunnelKind::Subdomain,
            "a.example.com",
            "http://localhost:9000",
        )];

        assert_eq!(
            resolve(&tunnels, "A.example.com", "/", None),
            RouteMatch::NoMatch
        );
    }

    #[test]
    fn test_host_with_port_must_match_verbatim() {
        let tunnels = vec![tunnel(
            TunnelKind::Subdomain,
            "a.example.com:8080",
            "http://localhost:9000",
        )];

        assert!(matches!(
            resolve(&tunnels, "a.example.com:8080", "/", None),
            RouteMatch::Forward { .. }
        ));
        assert_eq!(
            resolve(&tunnels, "a.example.com", "/", None),
            RouteMatch::NoMatch
        );
    }

    #[test]
    fn test_subdomain_beats_path_regardless_of_list_position() {
        let mut tunnels = vec![
            tunnel(TunnelKind::Path, "/", "http://path-target:1"),
            tunnel(TunnelKind::Subdomain, "a.example.com", "http://sub-target:2"),
        ];
        sort_tunnels(&mut tunnels);

        let target = expect_target(resolve(&tunnels, "a.example.com", "/anything", None));
        assert_eq!(target.host_str(), Some("sub-target"));
    }

    #[test]
    fn test_first_path_match_wins_in_list_order() {
        let mut tunnels = vec![
            tunnel(TunnelKind::Path, "/app/admin", "http://admin:1"),
            tunnel(TunnelKind::Path, "/app", "http://app:2"),
        ];
        sort_tunnels(&mut tunnels);

        // "/app" sorts before "/app/admin", so the shorter prefix wins
        let target = expect_target(resolve(&tunnels, "proxy.example.com", "/app/admin/x", None));
        assert_eq!(target.host_str(), Some("app"));
    }

    #[test]
    fn test_reserved_namespace_is_never_path_matched() {
        let tunnels = vec![tunnel(TunnelKind::Path, "/", "http://localhost:9000")];

        assert_eq!(
            resolve(&tunnels, "proxy.example.com", "/api/tunnels", None),
            RouteMatch::NoMatch
        );
        assert_eq!(
            resolve(&tunnels, "proxy.example.com", "/api", None),
            RouteMatch::NoMatch
        );
    }

    #[test]
    fn test_reserved_prefix_does_not_swallow_lookalikes() {
        let tunnels = vec![tunnel(TunnelKind::Path, "/apiary", "http://localhost:9000")];

        assert!(matches!(
            resolve(&tunnels, "proxy.example.com", "/apiary/hives", None),
            RouteMatch::Forward { .. }
        ));
    }

    #[test]
    fn test_reserved_namespace_still_allows_subdomain_match() {
        let tunnels = vec![tunnel(
            TunnelKind::Subdomain,
            "a.example.com",
            "http://localhost:9000",
        )];

        // The carve-out only applies to path tunnels
        let target = expect_target(resolve(&tunnels, "a.example.com", "/api/users", None));
        assert_eq!(target.as_str(), "http://localhost:9000/api/users");
    }

    #[test]
    fn test_invalid_stored_target_is_skipped_not_fatal() {
        let tunnels = vec![
            tunnel(TunnelKind::Subdomain, "a.example.com", "not a url"),
            tunnel(TunnelKind::Subdomain, "a.example.com", "http://localhost:9000"),
        ];

        let target = expect_target(resolve(&tunnels, "a.example.com", "/x", None));
        assert_eq!(target.as_str(), "http://localhost:9000/x");
    }

    #[test]
    fn test_no_tunnels_is_no_match() {
        assert_eq!(resolve(&[], "a.example.com", "/x", None), RouteMatch::NoMatch);
    }

    #[test]
    fn test_exact_prefix_match_lands_on_target_root() {
        let tunnels = vec![tunnel(TunnelKind::Path, "/api2", "https://up.example.com/v1")];

        let target = expect_target(resolve(&tunnels, "proxy.example.com", "/api2", None));
        assert_eq!(target.as_str(), "https://up.example.com/v1/");
    }
}
