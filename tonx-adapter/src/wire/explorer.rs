use serde::Deserialize;
use serde_json::Value;
use crate::deserialize::{deserialize_decimal_string, deserialize_empty_as_none, deserialize_number_from_string, deserialize_optional_decimal_string};
use crate::schema::AccountStatus;
use crate::wire::{BlockRef, Message};

#[derive(Debug, Deserialize)]
pub struct MasterchainInfo {
    pub first: BlockRef,
    pub last: BlockRef
}

#[derive(Debug, Deserialize)]
pub struct Blocks {
    #[serde(default)]
    pub blocks: Vec<BlockRef>
}

#[derive(Debug, Deserialize)]
pub struct AccountState {
    #[serde(default)]
    pub hash: String,
    #[serde(default, deserialize_with = "deserialize_empty_as_none")]
    pub account_status: Option<String>
}

#[derive(Debug, Deserialize)]
pub struct Transaction {
    pub account: String,
    pub hash: String,
    #[serde(deserialize_with = "deserialize_decimal_string")]
    pub lt: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub now: u32,
    pub orig_status: AccountStatus,
    pub end_status: AccountStatus,
    #[serde(deserialize_with = "deserialize_decimal_string")]
    pub total_fees: String,
    pub prev_trans_hash: String,
    #[serde(deserialize_with = "deserialize_decimal_string")]
    pub prev_trans_lt: String,
    pub description: Value,
    pub block_ref: BlockRef,
    #[serde(default)]
    pub in_msg: Option<Message>,
    #[serde(default)]
    pub out_msgs: Vec<Message>,
    pub account_state_before: Option<AccountState>,
    pub account_state_after: Option<AccountState>
}

#[derive(Debug, Deserialize)]
pub struct Transactions {
    #[serde(default)]
    pub transactions: Vec<Transaction>
}

#[derive(Debug, Deserialize)]
pub struct Account {
    pub address: String,
    #[serde(alias = "account_status")]
    pub status: String,
    #[serde(default, deserialize_with = "deserialize_optional_decimal_string")]
    pub balance: Option<String>,
    #[serde(default, deserialize_with = "deserialize_empty_as_none")]
    pub code_boc: Option<String>,
    #[serde(default, deserialize_with = "deserialize_empty_as_none")]
    pub data_boc: Option<String>,
    #[serde(default, deserialize_with = "deserialize_empty_as_none")]
    pub code_hash: Option<String>,
    #[serde(default, deserialize_with = "deserialize_empty_as_none")]
    pub data_hash: Option<String>,
    #[serde(default, deserialize_with = "deserialize_empty_as_none")]
    pub frozen_hash: Option<String>,
    #[serde(default, deserialize_with = "deserialize_empty_as_none")]
    pub last_transaction_hash: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal_string")]
    pub last_transaction_lt: Option<String>
}

#[derive(Debug, Deserialize)]
pub struct Accounts {
    #[serde(default)]
    pub accounts: Vec<Account>
}

#[derive(Debug, Deserialize)]
pub struct RunGetMethod {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub exit_code: i32,
    #[serde(default)]
    pub stack: Vec<Value>
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::schema::AccountStatus;
    use crate::wire::explorer::{Accounts, Transactions};

    #[test]
    fn transactions_envelope() {
        let page: Transactions = serde_json::from_value(json!({
            "transactions": [{
                "account": "0:A3935861F79DAF59A13D6D182E1640210C02F98E3DF18FDA74B8F5AB141ABF18",
                "hash": "AQI=", "lt": "47000000000002", "now": 1700000000,
                "orig_status": "nonexist", "end_status": "uninit",
                "total_fees": "0", "prev_trans_hash": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=", "prev_trans_lt": "0",
                "description": {"type": "ord", "aborted": true},
                "block_ref": {"workchain": 0, "shard": "8000000000000000", "seqno": 100},
                "in_msg": null,
                "out_msgs": [],
                "account_state_before": {"hash": "AQI="},
                "account_state_after": null
            }],
            "address_book": {}
        })).unwrap();

        assert_eq!(page.transactions[0].orig_status, AccountStatus::NonExisting);
        assert_eq!(page.transactions[0].end_status, AccountStatus::Uninitialized);
        assert!(page.transactions[0].account_state_after.is_none());
    }

    #[test]
    fn account_status_field_alias() {
        let accounts: Accounts = serde_json::from_value(json!({
            "accounts": [{"address": "0:ab", "account_status": "active", "balance": "10"}]
        })).unwrap();

        assert_eq!(accounts.accounts[0].status, "active");
        assert_eq!(accounts.accounts[0].balance.as_deref(), Some("10"));
    }
}
