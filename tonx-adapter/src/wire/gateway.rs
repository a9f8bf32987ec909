use serde::Deserialize;
use serde_json::Value;
use crate::deserialize::{deserialize_decimal_string, deserialize_default_as_none, deserialize_number_from_string};
use crate::schema::AccountStatus;
use crate::wire::{BlockRef, Message};

#[derive(Debug, Deserialize)]
pub struct Hashes {
    pub file_hash: String,
    pub root_hash: String
}

#[derive(Debug, Deserialize)]
pub struct MasterchainInfo {
    pub first: Hashes,
    pub last: BlockRef,
    #[serde(default)]
    pub state_root_hash: String
}

#[derive(Debug, Deserialize)]
pub struct Shards {
    pub shards: Vec<BlockRef>
}

#[derive(Debug, Deserialize)]
pub struct ShortTransaction {
    pub account: String,
    pub hash: String,
    #[serde(deserialize_with = "deserialize_decimal_string")]
    pub lt: String
}

#[derive(Debug, Deserialize)]
pub struct BlockTransactions {
    pub id: BlockRef,
    pub transactions: Vec<ShortTransaction>
}

#[derive(Debug, Deserialize)]
pub struct TransactionId {
    #[serde(deserialize_with = "deserialize_decimal_string")]
    pub lt: String,
    pub hash: String
}

#[derive(Debug, Deserialize)]
pub struct AddressInformation {
    pub state: String,
    #[serde(deserialize_with = "deserialize_decimal_string")]
    pub balance: String,
    #[serde(default, deserialize_with = "deserialize_default_as_none")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_default_as_none")]
    pub data: Option<String>,
    #[serde(default)]
    pub frozen_hash: String,
    pub last_transaction_id: Option<TransactionId>,
    pub block_id: BlockRef
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OutMessages {
    List(Vec<Message>),
    Wrapped {
        #[serde(default)]
        out_msgs: Vec<Message>
    }
}

impl Default for OutMessages {
    fn default() -> Self {
        OutMessages::List(Vec::new())
    }
}

impl OutMessages {
    pub fn into_vec(self) -> Vec<Message> {
        match self {
            OutMessages::List(messages) | OutMessages::Wrapped { out_msgs: messages } => messages
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TransactionBlock {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub workchain: i32,
    #[serde(deserialize_with = "deserialize_decimal_string")]
    pub shard: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub seqno: u32
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
    pub block_ref: TransactionBlock,
    #[serde(default)]
    pub in_msg: Option<Message>,
    #[serde(default)]
    pub out_msgs: OutMessages,
    pub account_state_hash_before: String,
    pub account_state_hash_after: String
}

#[derive(Debug, Deserialize)]
pub struct ConfigBytes {
    pub bytes: String
}

#[derive(Debug, Deserialize)]
pub struct ConfigParam {
    pub config: ConfigBytes
}

#[derive(Debug, Deserialize)]
pub struct RunGetMethod {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub exit_code: i32,
    #[serde(default)]
    pub stack: Vec<Value>,
    #[serde(default)]
    pub block_id: Option<BlockRef>
}

#[derive(Debug, Deserialize)]
pub struct SendMessage {
    #[serde(default)]
    pub status: Option<i32>
}
