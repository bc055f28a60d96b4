//! Version-token normalization for redirected service roots.
//!
//! The V2 read-write demo service answers with a per-session root, but it
//! doesn't agree with itself on where the session segment goes: sometimes
//! `/V2/(S(abc))/OData/`, sometimes `/(S(abc))/V2/OData/`. Callers want one
//! shape, so the version token is always moved to the front of the path.

use serde::Serialize;
use tracing::debug;

use crate::errors::ResolveError;

/// Post-redirect rewrite applied to a resolved URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteRule {
    /// Return the resolved URI untouched.
    #[default]
    None,
    /// Put the version token ahead of the segments the server placed
    /// between the host and the `/OData/` segment.
    NormalizeVersionToken,
}

impl RewriteRule {
    pub fn apply(self, resolved: &str) -> Result<String, ResolveError> {
        match self {
            RewriteRule::None => Ok(resolved.to_string()),
            RewriteRule::NormalizeVersionToken => normalize_version_token(resolved),
        }
    }
}

const ODATA_MARKERS: [&str; 2] = ["/OData/", "/odata/"];

/// Rewrite `scheme://host/<a>/<b>/OData/...` so the version token (`V2`,
/// `V3`, ...) is the first path segment. Everything from the OData marker
/// onward is kept byte-for-byte. Already-normalized input comes back as is.
pub fn normalize_version_token(resolved: &str) -> Result<String, ResolveError> {
    let authority_start = resolved
        .find("://")
        .map(|i| i + 3)
        .ok_or_else(|| ResolveError::malformed(resolved, "not an absolute URI"))?;

    let path_start = resolved[authority_start..]
        .find('/')
        .map(|i| authority_start + i)
        .ok_or_else(|| ResolveError::malformed(resolved, "URI has no path"))?;

    // Markers inside the query or fragment don't count.
    let path_end = resolved[path_start..]
        .find(|c: char| c == '?' || c == '#')
        .map_or(resolved.len(), |i| path_start + i);
    let path = &resolved[path_start..path_end];

    // Upper-case first; the server varies the casing between versions.
    let marker = ODATA_MARKERS
        .iter()
        .find_map(|m| path.find(*m))
        .map(|i| path_start + i)
        .ok_or_else(|| ResolveError::malformed(resolved, "no /OData/ or /odata/ segment"))?;

    if marker == path_start {
        return Err(ResolveError::malformed(
            resolved,
            "no path segments before the OData segment",
        ));
    }

    let leading: Vec<&str> = resolved[path_start + 1..marker].split('/').collect();
    let token_pos = leading
        .iter()
        .position(|s| is_version_token(s))
        .ok_or_else(|| {
            ResolveError::malformed(resolved, "no version token before the OData segment")
        })?;

    if token_pos == 0 {
        return Ok(resolved.to_string());
    }

    let mut reordered = Vec::with_capacity(leading.len());
    reordered.push(leading[token_pos]);
    reordered.extend(
        leading
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != token_pos)
            .map(|(_, s)| *s),
    );

    let normalized = format!(
        "{}/{}{}",
        &resolved[..path_start],
        reordered.join("/"),
        &resolved[marker..]
    );
    debug!(from = resolved, to = %normalized, "moved version token to front of path");
    Ok(normalized)
}

/// `V` followed by one or more ASCII digits.
fn is_version_token(segment: &str) -> bool {
    segment
        .strip_prefix('V')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}
