//! Draft normalization and validation shared by every backend

use crate::StoreError;
use burrow_proto::{Tunnel, TunnelDraft, TunnelKind};
use url::Url;

/// Normalize a draft and reject malformed routes/targets.
///
/// Path routes get a leading slash inserted when missing. The target must
/// parse as an absolute URL with a host or the write is rejected.
pub(crate) fn normalize_draft(mut draft: TunnelDraft) -> Result<TunnelDraft, StoreError> {
    if draft.route.is_empty() || draft.target.is_empty() {
        return Err(StoreError::Validation(
            "type, route and target are required".to_string(),
        ));
    }

    if draft.kind == TunnelKind::Path && !draft.route.starts_with('/') {
        draft.route = format!("/{}", draft.route);
    }

    // "/" alone is allowed: explicit root passthrough
    if draft.kind == TunnelKind::Path && draft.route != "/" && draft.route.len() < 2 {
        return Err(StoreError::Validation(
            "path route must be at least one character long after the leading slash (e.g. /p)"
                .to_string(),
        ));
    }

    let target = Url::parse(&draft.target)
        .map_err(|_| StoreError::Validation("invalid target URL format".to_string()))?;
    if !target.has_host() {
        return Err(StoreError::Validation(
            "target URL must be absolute with a scheme and host".to_string(),
        ));
    }

    Ok(draft)
}

/// Reject a write that would duplicate an existing `(type, route)` pair.
///
/// `exclude_id` skips the record being updated so an update can keep its
/// own route.
pub(crate) fn check_conflict(
    existing: &[Tunnel],
    draft: &TunnelDraft,
    exclude_id: Option<&str>,
) -> Result<(), StoreError> {
    let duplicate = existing.iter().any(|t| {
        t.kind == draft.kind && t.route == draft.route && Some(t.id.as_str()) != exclude_id
    });

    if duplicate {
        return Err(StoreError::Conflict {
            kind: draft.kind,
            route: draft.route.clone(),
        });
    }

    Ok(())
}
