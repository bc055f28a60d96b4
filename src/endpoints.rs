//! Catalogue of the public demo OData services used as test fixtures.
//!
//! Canonical URIs are compared in percent-decoded form, so
//! `.../V2/(S(readwrite))/OData/OData.svc/` and
//! `.../V2/%28S%28readwrite%29%29/OData/OData.svc/` name the same endpoint.

use std::borrow::Cow;

use serde::Serialize;

use crate::rewrite::RewriteRule;

/// A known demo service root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KnownEndpoint {
    ODataV2ReadWrite,
    ODataV3ReadOnly,
    ODataV3ReadWrite,
    ODataV4ReadOnly,
    ODataV4ReadWrite,
    NorthwindV2ReadOnly,
    NorthwindV3ReadOnly,
    NorthwindV4ReadOnly,
    TripPinV4ReadWrite,
    TripPinV4RESTier,
}

impl KnownEndpoint {
    pub const ALL: [KnownEndpoint; 10] = [
        KnownEndpoint::ODataV2ReadWrite,
        KnownEndpoint::ODataV3ReadOnly,
        KnownEndpoint::ODataV3ReadWrite,
        KnownEndpoint::ODataV4ReadOnly,
        KnownEndpoint::ODataV4ReadWrite,
        KnownEndpoint::NorthwindV2ReadOnly,
        KnownEndpoint::NorthwindV3ReadOnly,
        KnownEndpoint::NorthwindV4ReadOnly,
        KnownEndpoint::TripPinV4ReadWrite,
        KnownEndpoint::TripPinV4RESTier,
    ];

    /// The canonical URI, exactly as the upstream test suite spells it.
    pub fn uri(self) -> &'static str {
        match self {
            KnownEndpoint::ODataV2ReadWrite => {
                "https://services.odata.org/V2/%28S%28readwrite%29%29/OData/OData.svc/"
            }
            KnownEndpoint::ODataV3ReadOnly => "https://services.odata.org/V3/OData/OData.svc/",
            KnownEndpoint::ODataV3ReadWrite => {
                "https://services.odata.org/V3/%28S%28readwrite%29%29/OData/OData.svc/"
            }
            KnownEndpoint::ODataV4ReadOnly => "https://services.odata.org/V4/OData/OData.svc/",
            KnownEndpoint::ODataV4ReadWrite => {
                "https://services.odata.org/V4/OData/%28S%28readwrite%29%29/OData.svc/"
            }
            KnownEndpoint::NorthwindV2ReadOnly => {
                "https://services.odata.org/V2/Northwind/Northwind.svc/"
            }
            KnownEndpoint::NorthwindV3ReadOnly => {
                "https://services.odata.org/V3/Northwind/Northwind.svc/"
            }
            KnownEndpoint::NorthwindV4ReadOnly => {
                "https://services.odata.org/V4/Northwind/Northwind.svc/"
            }
            KnownEndpoint::TripPinV4ReadWrite => "https://services.odata.org/V4/TripPinServiceRW/",
            KnownEndpoint::TripPinV4RESTier => "https://services.odata.org/TripPinRESTierService/",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KnownEndpoint::ODataV2ReadWrite => "odata-v2-rw",
            KnownEndpoint::ODataV3ReadOnly => "odata-v3-ro",
            KnownEndpoint::ODataV3ReadWrite => "odata-v3-rw",
            KnownEndpoint::ODataV4ReadOnly => "odata-v4-ro",
            KnownEndpoint::ODataV4ReadWrite => "odata-v4-rw",
            KnownEndpoint::NorthwindV2ReadOnly => "northwind-v2-ro",
            KnownEndpoint::NorthwindV3ReadOnly => "northwind-v3-ro",
            KnownEndpoint::NorthwindV4ReadOnly => "northwind-v4-ro",
            KnownEndpoint::TripPinV4ReadWrite => "trippin-v4-rw",
            KnownEndpoint::TripPinV4RESTier => "trippin-v4-restier",
        }
    }

    /// Look up a canonical URI in the catalogue.
    pub fn match_uri(uri: &str) -> Option<KnownEndpoint> {
        let wanted = decode(uri.trim());
        Self::ALL
            .into_iter()
            .find(|e| decode(e.uri()) == wanted)
    }

    /// Look up a catalogue entry by its short name (e.g. `odata-v2-rw`).
    pub fn from_name(name: &str) -> Option<KnownEndpoint> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }

    pub fn requires_resolution(self) -> bool {
        requires_resolution(self.uri())
    }

    pub fn rewrite_rule(self) -> RewriteRule {
        match self {
            KnownEndpoint::ODataV2ReadWrite => RewriteRule::NormalizeVersionToken,
            _ => RewriteRule::None,
        }
    }
}

/// Read-write services hand out a per-session root through a redirect, so
/// their canonical URI can't be used directly. Read-only roots can.
pub fn requires_resolution(uri: &str) -> bool {
    decode(uri).contains("(readwrite)")
        || KnownEndpoint::match_uri(uri) == Some(KnownEndpoint::TripPinV4ReadWrite)
}

/// Rewrite policy for a canonical URI. Only the V2 read-write template has one.
pub fn rewrite_rule_for(uri: &str) -> RewriteRule {
    KnownEndpoint::match_uri(uri)
        .map(KnownEndpoint::rewrite_rule)
        .unwrap_or(RewriteRule::None)
}

fn decode(uri: &str) -> Cow<'_, str> {
    urlencoding::decode(uri).unwrap_or(Cow::Borrowed(uri))
}

/// Catalogue row for display.
#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub name: &'static str,
    pub uri: &'static str,
    pub requires_resolution: bool,
    pub rewrite: RewriteRule,
}

pub fn catalogue() -> Vec<EndpointInfo> {
    KnownEndpoint::ALL
        .into_iter()
        .map(|e| EndpointInfo {
            name: e.name(),
            uri: e.uri(),
            requires_resolution: e.requires_resolution(),
            rewrite: e.rewrite_rule(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_uri_accepts_both_encodings() {
        assert_eq!(
            KnownEndpoint::match_uri("https://services.odata.org/V2/(S(readwrite))/OData/OData.svc/"),
            Some(KnownEndpoint::ODataV2ReadWrite)
        );
        assert_eq!(
            KnownEndpoint::match_uri(KnownEndpoint::ODataV2ReadWrite.uri()),
            Some(KnownEndpoint::ODataV2ReadWrite)
        );
    }

    #[test]
    fn test_match_uri_is_exact_not_prefix() {
        assert_eq!(
            KnownEndpoint::match_uri("https://services.odata.org/V2/(S(readwrite))/OData/OData.svc/Products"),
            None
        );
        // V3 shares the shape but must not pick up the V2 rule
        assert_eq!(
            rewrite_rule_for("https://services.odata.org/V3/(S(readwrite))/OData/OData.svc/"),
            RewriteRule::None
        );
    }

    #[test]
    fn test_only_v2_read_write_has_rewrite_rule() {
        let with_rule: Vec<_> = KnownEndpoint::ALL
            .into_iter()
            .filter(|e| e.rewrite_rule() != RewriteRule::None)
            .collect();
        assert_eq!(with_rule, vec![KnownEndpoint::ODataV2ReadWrite]);
    }

    #[test]
    fn test_requires_resolution() {
        let needing: Vec<_> = KnownEndpoint::ALL
            .into_iter()
            .filter(|e| e.requires_resolution())
            .collect();
        assert_eq!(
            needing,
            vec![
                KnownEndpoint::ODataV2ReadWrite,
                KnownEndpoint::ODataV3ReadWrite,
                KnownEndpoint::ODataV4ReadWrite,
                KnownEndpoint::TripPinV4ReadWrite,
            ]
        );
        assert!(requires_resolution("https://example.org/V3/(S(readwrite))/svc/"));
        assert!(!requires_resolution("https://example.org/V3/svc/"));
    }

    #[test]
    fn test_from_name_round_trips_catalogue() {
        for e in KnownEndpoint::ALL {
            assert_eq!(KnownEndpoint::from_name(e.name()), Some(e));
        }
        assert_eq!(KnownEndpoint::from_name("nope"), None);
    }
}
