use derive_new::new;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use crate::schema::{check_base64, BlockReference, Validate, Violation};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TupleItem {
    Null,
    Int {
        #[serde(with = "crate::deserialize::display_string")]
        value: BigInt
    },
    Nan,
    Cell { cell: String },
    Slice { cell: String },
    Builder { cell: String },
    Tuple { items: Vec<TupleItem> }
}

impl Validate for TupleItem {
    fn validate(&self) -> Result<(), Violation> {
        match self {
            TupleItem::Cell { cell } | TupleItem::Slice { cell } | TupleItem::Builder { cell } => check_base64("cell", cell),
            TupleItem::Tuple { items } => items.validate().map_err(|v| v.within("items")),
            TupleItem::Null | TupleItem::Int { .. } | TupleItem::Nan => Ok(())
        }
    }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunMethodResult {
    pub exit_code: i32,
    pub result: Vec<TupleItem>,
    pub result_raw: Option<String>,
    pub block: BlockReference,
    pub shard_block: BlockReference
}

impl RunMethodResult {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0 || self.exit_code == 1
    }
}

impl Validate for RunMethodResult {
    fn validate(&self) -> Result<(), Violation> {
        self.result.validate().map_err(|v| v.within("result"))?;
        self.block.validate().map_err(|v| v.within("block"))?;
        self.shard_block.validate().map_err(|v| v.within("shardBlock"))
    }
}
