//! Service definitions as they appear in config documents.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use thiserror::Error;

/// A named logical group of domains and IP-set labels.
///
/// ```json
/// {
///   "billing": {
///     "desc": "payment frontends",
///     "domains": { "pay.example.com": ["edge", "203.0.113.9"] },
///     "ips": { "edge": ["203.0.113.1", "203.0.113.2"] }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Service {
    /// Free-text description.
    #[serde(default)]
    pub desc: Option<String>,

    /// Domain → address references (literal IPs or labels).
    pub domains: HashMap<String, Vec<String>>,

    /// Label → literal IPs.
    #[serde(default)]
    pub ips: HashMap<String, Vec<String>>,
}

/// A config document could not be decoded.
#[derive(Debug, Error)]
#[error("malformed config document: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Decode one config document into its services, keyed by service name.
pub fn decode_document(raw: &[u8]) -> Result<BTreeMap<String, Service>, DecodeError> {
    Ok(serde_json::from_slice(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_service() {
        let raw = br#"{
            "web": {
                "desc": "public sites",
                "domains": { "example.com": ["set1", "203.0.113.5"] },
                "ips": { "set1": ["203.0.113.1", "203.0.113.2"] }
            }
        }"#;

        let services = decode_document(raw).unwrap();
        let web = &services["web"];
        assert_eq!(web.desc.as_deref(), Some("public sites"));
        assert_eq!(web.domains["example.com"], vec!["set1", "203.0.113.5"]);
        assert_eq!(web.ips["set1"].len(), 2);
    }

    #[test]
    fn test_ips_and_desc_optional() {
        let raw = br#"{ "api": { "domains": { "api.example.com": [] } } }"#;
        let services = decode_document(raw).unwrap();
        assert!(services["api"].ips.is_empty());
        assert!(services["api"].desc.is_none());
    }

    #[test]
    fn test_domains_required() {
        let raw = br#"{ "api": { "ips": {} } }"#;
        assert!(decode_document(raw).is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = decode_document(b"{ not json").unwrap_err();
        assert!(err.to_string().starts_with("malformed config document"));
    }
}
