use derive_new::new;
use serde::{Deserialize, Serialize};
use crate::schema::{check_address, check_shard, check_unsigned, Validate, Violation};

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct BlockReference {
    pub workchain: i32,
    pub seqno: u32,
    /// Signed decimal form of the 64-bit shard id.
    pub shard: String,
    pub root_hash: String,
    pub file_hash: String
}

impl BlockReference {
    /// Stand-in for blocks the upstream does not report.
    pub fn placeholder() -> Self {
        Self::new(-2, 0, "0".to_owned(), String::new(), String::new())
    }
}

impl Validate for BlockReference {
    fn validate(&self) -> Result<(), Violation> {
        check_shard("shard", &self.shard)
    }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlockHashes {
    pub root_hash: String,
    pub file_hash: String
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LastBlock {
    pub init: BlockHashes,
    pub last: BlockReference,
    pub state_root_hash: String,
    /// Wall clock at the moment the record was built, not chain time.
    pub now: i64
}

impl Validate for LastBlock {
    fn validate(&self) -> Result<(), Violation> {
        self.last.validate().map_err(|v| v.within("last"))
    }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ShardTransaction {
    /// User-friendly form.
    pub account: String,
    pub hash: String,
    pub lt: String
}

impl Validate for ShardTransaction {
    fn validate(&self) -> Result<(), Violation> {
        check_address("account", &self.account)?;
        check_unsigned("lt", &self.lt)
    }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ShardBlock {
    #[serde(flatten)]
    pub id: BlockReference,
    pub transactions: Vec<ShardTransaction>
}

impl Validate for ShardBlock {
    fn validate(&self) -> Result<(), Violation> {
        self.id.validate()?;
        self.transactions.validate().map_err(|v| v.within("transactions"))
    }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Block {
    pub shards: Vec<ShardBlock>
}

impl Validate for Block {
    fn validate(&self) -> Result<(), Violation> {
        if self.shards.is_empty() {
            return Err(Violation::new("shards".to_owned(), "expected at least the masterchain block".to_owned()));
        }

        self.shards.validate().map_err(|v| v.within("shards"))
    }
}
