use std::error::Error as _;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed redirect target '{uri}': {reason}")]
    MalformedRedirectTarget { uri: String, reason: String },
}

impl ResolveError {
    pub(crate) fn malformed(uri: &str, reason: impl Into<String>) -> Self {
        ResolveError::MalformedRedirectTarget {
            uri: uri.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(e: reqwest::Error) -> Self {
        // Flatten the source chain so TLS and DNS causes survive into the message.
        let mut msg = e.to_string();
        let mut source = e.source();
        while let Some(inner) = source {
            msg.push_str(": ");
            msg.push_str(&inner.to_string());
            source = inner.source();
        }
        ResolveError::Transport(msg)
    }
}

/// Errors reported by an OData service once a client is talking to it.
#[derive(Debug, Error)]
pub enum ODataError {
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("odata protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_names_uri_and_reason() {
        let err = ResolveError::malformed("https://x.org/a", "no OData segment");
        assert_eq!(
            err.to_string(),
            "malformed redirect target 'https://x.org/a': no OData segment"
        );
    }

    #[test]
    fn test_resolve_error_converts_into_odata_error() {
        let err: ODataError = ResolveError::Transport("timed out".into()).into();
        assert!(matches!(err, ODataError::Resolve(ResolveError::Transport(_))));
        assert_eq!(err.to_string(), "transport failure: timed out");
    }
}
