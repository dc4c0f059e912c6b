//! Target URL construction for a matched tunnel

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("invalid target URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("target URL has no host")]
    NoHost,
}

/// Graft the carried request path and query onto a tunnel's target URL.
///
/// The target's own path keeps acting as a prefix: its trailing slash is
/// stripped, the carried path gets a leading slash ensured, and the two
/// are concatenated. The request query string is carried verbatim.
///
/// `carried` is the full request path for subdomain tunnels, or the
/// request path with the matched route prefix removed for path tunnels.
pub fn rewrite_target(
    target: &str,
    carried: &str,
    query: Option<&str>,
) -> Result<Url, RewriteError> {
    let mut url = Url::parse(target)?;
    if !url.has_host() {
        return Err(RewriteError::NoHost);
    }

    let base = url.path().trim_end_matches('/').to_string();
    let new_path = if carried.starts_with('/') {
        format!("{base}{carried}")
    } else {
        format!("{base}/{carried}")
    };
    url.set_path(&new_path);
    url.set_query(query);

    Ok(url)
}
