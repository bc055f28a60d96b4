use std::time::Duration;

use crate::settings::PayloadFormat;
use crate::transport::{TlsFloor, TransportConfig};

#[derive(Debug, Clone)]
pub struct Config {
    /// Total request timeout in seconds, redirects included.
    /// Set via ODATA_HTTP_TIMEOUT_SECS. Default: 30.
    pub timeout_secs: u64,
    /// Set via ODATA_HTTP_CONNECT_TIMEOUT_SECS. Default: 5.
    pub connect_timeout_secs: u64,
    /// Set via ODATA_MAX_REDIRECTS. Default: 10.
    pub max_redirects: usize,
    pub user_agent: String,
    /// Payload format for fixture clients. Set via ODATA_PAYLOAD_FORMAT.
    pub payload_format: PayloadFormat,
}

impl Config {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            min_tls: TlsFloor::Tls12,
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            max_redirects: self.max_redirects,
            user_agent: self.user_agent.clone(),
        }
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
    let defaults = TransportConfig::default();

    let payload_format = match var("ODATA_PAYLOAD_FORMAT") {
        Some(raw) => raw.parse()?,
        None => PayloadFormat::default(),
    };

    Ok(Config {
        timeout_secs: var("ODATA_HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.timeout.as_secs()),
        connect_timeout_secs: var("ODATA_HTTP_CONNECT_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.connect_timeout.as_secs()),
        max_redirects: var("ODATA_MAX_REDIRECTS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_redirects),
        user_agent: var("ODATA_USER_AGENT")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.user_agent),
        payload_format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let cfg = load_from(&[]).unwrap();
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.connect_timeout_secs, 5);
        assert_eq!(cfg.max_redirects, 10);
        assert!(cfg.user_agent.starts_with("odata-endpoint/"));
        assert_eq!(cfg.payload_format, PayloadFormat::Json);
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let cfg = load_from(&[
            ("ODATA_HTTP_TIMEOUT_SECS", "90"),
            ("ODATA_MAX_REDIRECTS", "lots"),
            ("ODATA_PAYLOAD_FORMAT", "atom"),
            ("ODATA_USER_AGENT", "fixture-bot/2"),
        ])
        .unwrap();
        assert_eq!(cfg.timeout_secs, 90);
        assert_eq!(cfg.max_redirects, 10, "unparseable falls back to default");
        assert_eq!(cfg.payload_format, PayloadFormat::Atom);

        let transport = cfg.transport();
        assert_eq!(transport.timeout, Duration::from_secs(90));
        assert_eq!(transport.min_tls, TlsFloor::Tls12);
        assert_eq!(transport.user_agent, "fixture-bot/2");
    }

    #[test]
    fn test_unknown_payload_format_is_an_error() {
        assert!(load_from(&[("ODATA_PAYLOAD_FORMAT", "protobuf")]).is_err());
    }
}
