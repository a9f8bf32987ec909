use derive_new::new;
use serde::{Deserialize, Serialize};
use crate::schema::{check_base64, Coins, Validate, Violation};

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInfo {
    pub cell: String,
    /// Empty when the upstream cannot tell.
    pub address: String,
    pub global_balance: Coins
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub config: ConfigInfo
}

impl Validate for Config {
    fn validate(&self) -> Result<(), Violation> {
        check_base64("config.cell", &self.config.cell)?;

        let coins = &self.config.global_balance.coins;
        if !coins.is_empty() {
            self.config.global_balance.validate().map_err(|v| v.within("config.globalBalance"))?;
        }

        Ok(())
    }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SendResult {
    pub status: i32
}

impl Validate for SendResult {
    fn validate(&self) -> Result<(), Violation> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::schema::{Coins, Config, ConfigInfo, Validate};

    #[test]
    fn empty_address_and_balance_are_accepted() {
        let config = Config::new(ConfigInfo::new("te6ccgEBAQEAAgAAAA==".to_owned(), String::new(), Coins::new(String::new())));

        assert!(config.validate().is_ok());
        assert_eq!(serde_json::to_value(&config).unwrap(), json!({
            "config": {"cell": "te6ccgEBAQEAAgAAAA==", "address": "", "globalBalance": {"coins": ""}}
        }));
    }

    #[test]
    fn populated_balance_must_be_decimal() {
        let config = Config::new(ConfigInfo::new("te6ccgEBAQEAAgAAAA==".to_owned(), String::new(), Coins::new("abc".to_owned())));

        assert_eq!(config.validate().unwrap_err().path, "config.globalBalance.coins");
    }
}
