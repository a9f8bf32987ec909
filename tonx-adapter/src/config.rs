use std::time::Duration;
use serde::Deserialize;
use config::Config;
use url::Url;
use crate::transport::Endpoint;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet"
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FamilyKind {
    #[default]
    Gateway,
    Explorer
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    #[serde(default)]
    pub network: Network,
    pub api_key: String,
    #[serde(default)]
    pub family: FamilyKind,
    pub endpoint: Option<Url>,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_inter_call_delay_ms")]
    pub inter_call_delay_ms: u64,
    #[serde(default = "default_run_method_settle_ms")]
    pub run_method_settle_ms: u64,
    pub method_prefix: Option<String>
}

fn default_timeout() -> u64 { 30 }

fn default_inter_call_delay_ms() -> u64 { 200 }

fn default_run_method_settle_ms() -> u64 { 1000 }

impl ClientConfig {
    pub fn new(network: Network, api_key: impl Into<String>, family: FamilyKind) -> Self {
        Self {
            network,
            api_key: api_key.into(),
            family,
            endpoint: None,
            timeout: default_timeout(),
            inter_call_delay_ms: default_inter_call_delay_ms(),
            run_method_settle_ms: default_run_method_settle_ms(),
            method_prefix: None
        }
    }

    /// Reads `TONX_API_KEY`, `TONX_NETWORK`, `TONX_FAMILY` and friends.
    pub fn from_env() -> anyhow::Result<Self> {
        let config: ClientConfig = Config::builder()
            .add_source(config::Environment::with_prefix("TONX").try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())?;

        Ok(config)
    }

    pub fn endpoint(&self) -> anyhow::Result<Endpoint> {
        Endpoint::new(self.family, self.network, self.endpoint.clone(), self.api_key.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn inter_call_delay(&self) -> Duration {
        Duration::from_millis(self.inter_call_delay_ms)
    }

    pub fn run_method_settle(&self) -> Duration {
        Duration::from_millis(self.run_method_settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use serde_json::json;
    use crate::config::{ClientConfig, FamilyKind, Network};

    #[test]
    fn defaults_apply() {
        let config: ClientConfig = serde_json::from_value(json!({"api_key": "key"})).unwrap();

        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.family, FamilyKind::Gateway);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.run_method_settle(), Duration::from_secs(1));
        assert_eq!(config.method_prefix, None);
    }

    #[test]
    fn explicit_values() {
        let config: ClientConfig = serde_json::from_value(json!({
            "api_key": "key",
            "network": "testnet",
            "family": "explorer",
            "endpoint": "http://localhost:8081/api/v3/",
            "inter_call_delay_ms": 0,
            "method_prefix": "ton_"
        })).unwrap();

        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.family, FamilyKind::Explorer);
        assert_eq!(config.inter_call_delay(), Duration::ZERO);
        assert_eq!(config.endpoint.as_ref().map(|u| u.as_str()), Some("http://localhost:8081/api/v3/"));
        assert_eq!(config.method_prefix.as_deref(), Some("ton_"));
    }
}
