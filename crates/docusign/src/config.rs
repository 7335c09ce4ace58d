//! Credentials, regional endpoints and node tuning knobs.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DocuSignError, Result};
use crate::pagination::{DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT};
use crate::retry::DEFAULT_RETRY_AFTER;

/// REST API version every path is built against.
pub const API_VERSION: &str = "v2.1";

// ---------------------------------------------------------------------------
// Environment / Region
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    /// The developer sandbox (`demo.docusign.net`).
    #[serde(alias = "sandbox")]
    Demo,
}

impl FromStr for Environment {
    type Err = DocuSignError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "production" => Ok(Environment::Production),
            "demo" | "sandbox" => Ok(Environment::Demo),
            other => Err(DocuSignError::validation(format!(
                "environment must be one of production, demo (got '{other}')"
            ))),
        }
    }
}

/// Production data-centre region.  Ignored in the demo environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Na,
    Eu,
    Au,
    Ca,
}

impl FromStr for Region {
    type Err = DocuSignError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "na" | "us" => Ok(Region::Na),
            "eu" => Ok(Region::Eu),
            "au" => Ok(Region::Au),
            "ca" => Ok(Region::Ca),
            other => Err(DocuSignError::validation(format!(
                "region must be one of na, eu, au, ca (got '{other}')"
            ))),
        }
    }
}

/// Root of the eSignature REST API for an environment and region.
///
/// The demo environment has a single endpoint; production defaults to
/// North America when no region is given.
pub fn get_base_url(environment: Environment, region: Option<Region>) -> &'static str {
    match (environment, region.unwrap_or_default()) {
        (Environment::Demo, _) => "https://demo.docusign.net/restapi",
        (Environment::Production, Region::Na) => "https://www.docusign.net/restapi",
        (Environment::Production, Region::Eu) => "https://eu.docusign.net/restapi",
        (Environment::Production, Region::Au) => "https://au.docusign.net/restapi",
        (Environment::Production, Region::Ca) => "https://ca.docusign.net/restapi",
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// The non-secret half of the DocuSign credential.  The access token never
/// reaches the node; the host's transport attaches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocuSignCredentials {
    #[serde(default)]
    pub environment: Environment,
    pub account_id: String,
    #[serde(default)]
    pub region: Option<Region>,
}

impl DocuSignCredentials {
    /// Read `environment`, `accountId` and `region` from the host's secret map.
    pub fn from_secrets(secrets: &HashMap<String, String>) -> Result<Self> {
        let account_id = secrets
            .get("accountId")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DocuSignError::validation("accountId is required"))?;

        let environment = match secrets.get("environment") {
            Some(e) => e.parse()?,
            None => Environment::default(),
        };
        let region = match secrets.get("region").map(|r| r.trim()) {
            Some(r) if !r.is_empty() => Some(r.parse()?),
            _ => None,
        };

        Ok(Self {
            environment,
            account_id: account_id.to_owned(),
            region,
        })
    }

    /// `{base}/v2.1/accounts/{accountId}`; every resource path hangs off this.
    pub fn account_base_url(&self) -> String {
        format!(
            "{}/{}/accounts/{}",
            get_base_url(self.environment, self.region),
            API_VERSION,
            self.account_id
        )
    }
}

// ---------------------------------------------------------------------------
// NodeConfig
// ---------------------------------------------------------------------------

/// Tuning knobs for the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Items requested per page by "get many" operations.
    pub page_size: usize,
    /// Wall-clock budget for one listing; partial results are returned
    /// once it is spent.
    #[serde(with = "millis")]
    pub pagination_timeout: Duration,
    /// Back-off suggested for throttled responses without `Retry-After`.
    #[serde(with = "millis")]
    pub retry_after_fallback: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            pagination_timeout: DEFAULT_TIMEOUT,
            retry_after_fallback: DEFAULT_RETRY_AFTER,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn base_url_table() {
        assert_eq!(
            get_base_url(Environment::Production, None),
            "https://www.docusign.net/restapi"
        );
        assert_eq!(
            get_base_url(Environment::Production, Some(Region::Eu)),
            "https://eu.docusign.net/restapi"
        );
        assert_eq!(
            get_base_url(Environment::Production, Some(Region::Au)),
            "https://au.docusign.net/restapi"
        );
        assert_eq!(
            get_base_url(Environment::Production, Some(Region::Ca)),
            "https://ca.docusign.net/restapi"
        );
        // Demo ignores the region.
        assert_eq!(
            get_base_url(Environment::Demo, Some(Region::Eu)),
            "https://demo.docusign.net/restapi"
        );
    }

    #[test]
    fn credentials_from_secrets() {
        let creds = DocuSignCredentials::from_secrets(&secrets(&[
            ("environment", "sandbox"),
            ("accountId", "acc-1"),
        ]))
        .unwrap();
        assert_eq!(creds.environment, Environment::Demo);
        assert_eq!(creds.region, None);
        assert_eq!(
            creds.account_base_url(),
            "https://demo.docusign.net/restapi/v2.1/accounts/acc-1"
        );

        let creds = DocuSignCredentials::from_secrets(&secrets(&[
            ("accountId", "acc-2"),
            ("region", "EU"),
        ]))
        .unwrap();
        assert_eq!(creds.environment, Environment::Production);
        assert_eq!(
            creds.account_base_url(),
            "https://eu.docusign.net/restapi/v2.1/accounts/acc-2"
        );
    }

    #[test]
    fn credentials_require_account_id() {
        let err = DocuSignCredentials::from_secrets(&secrets(&[("environment", "demo")])).unwrap_err();
        assert_eq!(err.to_string(), "accountId is required");

        let err = DocuSignCredentials::from_secrets(&secrets(&[("accountId", "a"), ("region", "mars")]))
            .unwrap_err();
        assert!(err.to_string().contains("region must be one of"));
    }

    #[test]
    fn node_config_deserialises_with_defaults() {
        let cfg: NodeConfig = serde_json::from_str(r#"{ "page_size": 25 }"#).unwrap();
        assert_eq!(cfg.page_size, 25);
        assert_eq!(cfg.pagination_timeout, Duration::from_secs(300));
        assert_eq!(cfg.retry_after_fallback, Duration::from_secs(5));
    }
}
