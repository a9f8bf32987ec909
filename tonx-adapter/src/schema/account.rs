use derive_new::new;
use serde::{Deserialize, Serialize};
use crate::schema::{check_unsigned, BlockReference, Validate, Violation};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum AccountState {
    Uninit,
    Active {
        code: Option<String>,
        data: Option<String>
    },
    Frozen {
        state_hash: String
    }
}

impl AccountState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Coins {
    pub coins: String
}

impl Validate for Coins {
    fn validate(&self) -> Result<(), Violation> {
        check_unsigned("coins", &self.coins)
    }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LastTransaction {
    pub lt: String,
    pub hash: String
}

impl Validate for LastTransaction {
    fn validate(&self) -> Result<(), Violation> {
        check_unsigned("lt", &self.lt)
    }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsed {
    pub bits: u64,
    pub cells: u64,
    pub public_cells: u64
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StorageStat {
    pub last_paid: u64,
    pub due_payment: Option<String>,
    pub used: StorageUsed
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub state: AccountState,
    pub balance: Coins,
    pub last: Option<LastTransaction>,
    pub storage_stat: Option<StorageStat>
}

impl Validate for AccountInfo {
    fn validate(&self) -> Result<(), Violation> {
        self.balance.validate().map_err(|v| v.within("balance"))?;
        self.last.validate().map_err(|v| v.within("last"))
    }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Account {
    pub account: AccountInfo,
    pub block: BlockReference
}

impl Validate for Account {
    fn validate(&self) -> Result<(), Violation> {
        self.account.validate().map_err(|v| v.within("account"))?;
        self.block.validate().map_err(|v| v.within("block"))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum LiteState {
    Uninit,
    Active {
        code_hash: String,
        data_hash: String
    },
    Frozen {
        state_hash: String
    }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountLiteInfo {
    pub state: LiteState,
    pub balance: Coins,
    pub last: Option<LastTransaction>,
    pub storage_stat: Option<StorageStat>
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AccountLite {
    pub account: AccountLiteInfo,
    pub block: BlockReference
}

impl Validate for AccountLite {
    fn validate(&self) -> Result<(), Violation> {
        self.account.balance.validate().map_err(|v| v.within("account.balance"))?;
        self.account.last.validate().map_err(|v| v.within("account.last"))?;
        self.block.validate().map_err(|v| v.within("block"))
    }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Changed {
    pub changed: bool,
    pub block: BlockReference
}

impl Validate for Changed {
    fn validate(&self) -> Result<(), Violation> {
        self.block.validate().map_err(|v| v.within("block"))
    }
}
