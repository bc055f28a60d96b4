use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::ODataError;

// ── Payload Format ───────────────────────────────────────────

/// Wire format the OData client asks the service for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    #[default]
    Json,
    Atom,
}

impl FromStr for PayloadFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(PayloadFormat::Json),
            "atom" | "xml" => Ok(PayloadFormat::Atom),
            other => anyhow::bail!("unknown payload format '{}' (expected json or atom)", other),
        }
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadFormat::Json => f.write_str("json"),
            PayloadFormat::Atom => f.write_str("atom"),
        }
    }
}

// ── Name Matching ────────────────────────────────────────────

/// Decides whether a client-side identifier refers to a metadata name.
pub trait NameMatchResolver: Send + Sync {
    fn is_match(&self, actual: &str, requested: &str) -> bool;
}

pub struct ExactMatch;

impl NameMatchResolver for ExactMatch {
    fn is_match(&self, actual: &str, requested: &str) -> bool {
        actual == requested
    }
}

pub struct CaseInsensitiveMatch;

impl NameMatchResolver for CaseInsensitiveMatch {
    fn is_match(&self, actual: &str, requested: &str) -> bool {
        actual.eq_ignore_ascii_case(requested)
    }
}

/// Ignores case and anything that isn't alphanumeric, so `product_id`
/// matches `ProductID`.
pub struct AlphanumericMatch;

impl NameMatchResolver for AlphanumericMatch {
    fn is_match(&self, actual: &str, requested: &str) -> bool {
        let fold = |s: &str| {
            s.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        };
        fold(actual) == fold(requested)
    }
}

// ── Client Settings ──────────────────────────────────────────

pub type TraceFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Configuration handed to an OData client for one service root.
#[derive(Clone)]
pub struct ClientSettings {
    pub base_uri: Url,
    pub payload_format: PayloadFormat,
    /// Treat "resource not found" as an empty result instead of an error.
    pub ignore_resource_not_found: bool,
    pub on_trace: Option<TraceFn>,
    pub name_match_resolver: Option<Arc<dyn NameMatchResolver>>,
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("base_uri", &self.base_uri.as_str())
            .field("payload_format", &self.payload_format)
            .field("ignore_resource_not_found", &self.ignore_resource_not_found)
            .field("on_trace", &self.on_trace.is_some())
            .field("name_match_resolver", &self.name_match_resolver.is_some())
            .finish()
    }
}

impl ClientSettings {
    /// Fixture defaults: not-found is ignored and client traces go to `tracing`.
    pub fn defaults(base_uri: Url, payload_format: PayloadFormat) -> Self {
        let on_trace: TraceFn =
            Arc::new(|msg: &str| tracing::debug!(target: "odata_client", "{}", msg));
        Self {
            base_uri,
            payload_format,
            ignore_resource_not_found: true,
            on_trace: Some(on_trace),
            name_match_resolver: None,
        }
    }

    /// Defaults, then let the caller adjust them.
    pub fn defaults_with(
        base_uri: Url,
        payload_format: PayloadFormat,
        configure: impl FnOnce(&mut ClientSettings),
    ) -> Self {
        let mut settings = Self::defaults(base_uri, payload_format);
        configure(&mut settings);
        settings
    }

    pub fn with_name_resolver(
        base_uri: Url,
        payload_format: PayloadFormat,
        resolver: Arc<dyn NameMatchResolver>,
    ) -> Self {
        Self {
            name_match_resolver: Some(resolver),
            ..Self::defaults(base_uri, payload_format)
        }
    }

    pub fn trace(&self, message: &str) {
        if let Some(on_trace) = &self.on_trace {
            on_trace(message);
        }
    }

    /// Name comparison used for metadata lookups. Exact unless a resolver is set.
    pub fn names_match(&self, actual: &str, requested: &str) -> bool {
        match &self.name_match_resolver {
            Some(resolver) => resolver.is_match(actual, requested),
            None => actual == requested,
        }
    }

    /// Apply the not-found policy to a client call's outcome.
    pub fn screen_not_found<T>(&self, result: Result<T, ODataError>) -> Result<Option<T>, ODataError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(ODataError::ResourceNotFound(what)) if self.ignore_resource_not_found => {
                self.trace(&format!("ignoring not-found for {}", what));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn base() -> Url {
        Url::parse("https://services.odata.org/V4/OData/OData.svc/").unwrap()
    }

    #[test]
    fn test_defaults() {
        let s = ClientSettings::defaults(base(), PayloadFormat::Atom);
        assert_eq!(s.payload_format, PayloadFormat::Atom);
        assert!(s.ignore_resource_not_found);
        assert!(s.on_trace.is_some());
        assert!(s.name_match_resolver.is_none());
    }

    #[test]
    fn test_defaults_with_applies_configure_last() {
        let s = ClientSettings::defaults_with(base(), PayloadFormat::Json, |s| {
            s.ignore_resource_not_found = false;
            s.on_trace = None;
        });
        assert!(!s.ignore_resource_not_found);
        assert!(s.on_trace.is_none());
    }

    #[test]
    fn test_trace_invokes_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let s = ClientSettings::defaults_with(base(), PayloadFormat::Json, move |s| {
            let record: TraceFn = Arc::new(move |m: &str| sink.lock().unwrap().push(m.to_string()));
            s.on_trace = Some(record);
        });

        s.trace("GET Products");
        assert_eq!(*seen.lock().unwrap(), vec!["GET Products".to_string()]);
    }

    #[test]
    fn test_screen_not_found_respects_flag() {
        let ignoring = ClientSettings::defaults(base(), PayloadFormat::Json);
        let r: Result<u32, _> = Err(ODataError::ResourceNotFound("Products(99)".into()));
        assert!(ignoring.screen_not_found(r).unwrap().is_none());
        assert_eq!(ignoring.screen_not_found(Ok(7)).unwrap(), Some(7));

        let strict = ClientSettings::defaults_with(base(), PayloadFormat::Json, |s| {
            s.ignore_resource_not_found = false;
        });
        let r: Result<u32, _> = Err(ODataError::ResourceNotFound("Products(99)".into()));
        assert!(matches!(strict.screen_not_found(r), Err(ODataError::ResourceNotFound(_))));
    }

    #[test]
    fn test_screen_not_found_surfaces_other_errors() {
        let s = ClientSettings::defaults(base(), PayloadFormat::Json);
        let r: Result<u32, _> = Err(ODataError::Protocol("400 Bad Request".into()));
        assert!(matches!(s.screen_not_found(r), Err(ODataError::Protocol(_))));
    }

    #[test]
    fn test_name_resolvers() {
        let exact = ClientSettings::defaults(base(), PayloadFormat::Json);
        assert!(!exact.names_match("ProductID", "productid"));

        let ci = ClientSettings::with_name_resolver(base(), PayloadFormat::Json, Arc::new(CaseInsensitiveMatch));
        assert!(ci.names_match("ProductID", "productid"));
        assert!(!ci.names_match("ProductID", "product_id"));

        let alnum = ClientSettings::with_name_resolver(base(), PayloadFormat::Json, Arc::new(AlphanumericMatch));
        assert!(alnum.names_match("ProductID", "product_id"));
        assert!(!alnum.names_match("ProductID", "product_name"));
        assert!(ExactMatch.is_match("Name", "Name"));
    }

    #[test]
    fn test_payload_format_parse() {
        assert_eq!("JSON".parse::<PayloadFormat>().unwrap(), PayloadFormat::Json);
        assert_eq!("atom".parse::<PayloadFormat>().unwrap(), PayloadFormat::Atom);
        assert!("csv".parse::<PayloadFormat>().is_err());
        assert_eq!(PayloadFormat::Atom.to_string(), "atom");
    }
}
