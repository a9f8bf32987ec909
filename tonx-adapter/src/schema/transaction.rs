use derive_new::new;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::address::Address;
use crate::codec::{base64_to_byte_array, base64_to_decimal, decimal_to_base64};
use crate::schema::{check_base64, BlockReference, Validate, Violation};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AccountStatus {
    #[serde(alias = "uninit")]
    Uninitialized,
    Frozen,
    Active,
    #[serde(alias = "nonexist")]
    NonExisting
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CurrencyCollection {
    #[serde(with = "crate::deserialize::display_string")]
    pub coins: BigUint
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum CommonMessageInfo {
    Internal {
        ihr_disabled: bool,
        bounce: bool,
        bounced: bool,
        src: Address,
        dest: Address,
        value: CurrencyCollection,
        #[serde(with = "crate::deserialize::display_string")]
        ihr_fee: BigUint,
        #[serde(with = "crate::deserialize::display_string")]
        forward_fee: BigUint,
        #[serde(with = "crate::deserialize::display_string")]
        created_lt: u64,
        created_at: u32
    },
    ExternalIn {
        src: Option<Address>,
        dest: Address,
        #[serde(with = "crate::deserialize::display_string")]
        import_fee: BigUint
    },
    ExternalOut {
        src: Address,
        dest: Option<Address>,
        #[serde(with = "crate::deserialize::display_string")]
        created_lt: u64,
        created_at: u32
    }
}

impl CommonMessageInfo {
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    pub info: CommonMessageInfo,
    /// Serialized state init, opaque.
    pub init: Option<String>,
    /// Serialized body cell, opaque.
    pub body: Option<String>
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HashUpdate {
    #[serde(with = "crate::deserialize::bytes_base64")]
    pub old_hash: Vec<u8>,
    #[serde(with = "crate::deserialize::bytes_base64")]
    pub new_hash: Vec<u8>
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Account id without the workchain, as an integer.
    #[serde(with = "crate::deserialize::display_string")]
    pub address: BigUint,
    #[serde(with = "crate::deserialize::display_string")]
    pub lt: u64,
    pub hash: String,
    #[serde(with = "crate::deserialize::display_string")]
    pub prev_transaction_lt: u64,
    #[serde(with = "crate::deserialize::display_string")]
    pub prev_transaction_hash: BigUint,
    pub now: u32,
    pub out_messages_count: usize,
    pub old_status: AccountStatus,
    pub end_status: AccountStatus,
    pub in_message: Option<Message>,
    pub out_messages: Vec<Message>,
    pub total_fees: CurrencyCollection,
    pub state_update: HashUpdate,
    pub description: Value
}

impl Transaction {
    pub fn prev_transaction_hash_base64(&self) -> String {
        decimal_to_base64(&self.prev_transaction_hash, 32)
    }

    /// Compares the decoded hash, so either base64 alphabet and padding match.
    pub fn has_id(&self, lt: u64, hash: &[u8]) -> bool {
        self.lt == lt && base64_to_byte_array(&self.hash).is_ok_and(|own| own == hash)
    }

    pub fn follows(&self, older: &Transaction) -> bool {
        self.prev_transaction_lt == older.lt
            && base64_to_decimal(&older.hash).is_ok_and(|hash| hash == self.prev_transaction_hash)
    }

    pub fn is_aborted(&self) -> bool {
        self.description.get("aborted").and_then(Value::as_bool).unwrap_or(false)
    }
}

impl Validate for Transaction {
    fn validate(&self) -> Result<(), Violation> {
        check_base64("hash", &self.hash)?;

        if self.out_messages_count != self.out_messages.len() {
            return Err(Violation::new(
                "outMessagesCount".to_owned(),
                format!("{} does not match {} out messages", self.out_messages_count, self.out_messages.len())
            ));
        }

        match self.description.get("type") {
            Some(Value::String(_)) => Ok(()),
            _ => Err(Violation::new("description.type".to_owned(), "expected string".to_owned()))
        }
    }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AccountTransaction {
    pub block: BlockReference,
    pub tx: Transaction
}

impl Validate for AccountTransaction {
    fn validate(&self) -> Result<(), Violation> {
        self.block.validate().map_err(|v| v.within("block"))?;
        self.tx.validate().map_err(|v| v.within("tx"))
    }
}

/// Checks that every transaction in a newest-first list points back at the
/// one that follows it.
pub fn check_chain(transactions: &[AccountTransaction]) -> Result<(), Violation> {
    for (i, pair) in transactions.windows(2).enumerate() {
        let (newer, older) = (&pair[0].tx, &pair[1].tx);
        if !newer.follows(older) {
            return Err(Violation::new(
                format!("[{}].tx.prevTransactionLt", i),
                format!("expected {} to precede, got {}", older.lt, newer.prev_transaction_lt)
            ));
        }
    }

    Ok(())
}
