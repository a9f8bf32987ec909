use derive_new::new;
use serde::{Deserialize, Serialize};
use crate::schema::{check_address, check_signed, check_unsigned, AccountStatus, BlockReference, LastTransaction, Validate, Violation};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ParsedMessageInfo {
    Internal {
        value: String,
        dest: String,
        src: String,
        bounced: bool,
        bounce: bool,
        ihr_disabled: bool,
        created_at: u32,
        created_lt: String,
        fwd_fee: String,
        ihr_fee: String
    },
    ExternalIn {
        dest: String,
        src: Option<String>,
        import_fee: String
    },
    ExternalOut {
        dest: Option<String>
    }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    /// Serialized body cell, empty when absent.
    pub body: String,
    pub info: ParsedMessageInfo,
    pub init: Option<String>
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedHashUpdate {
    pub old_hash: String,
    pub new_hash: String
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionBody {
    Payload { cell: String }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Failed,
    Pending
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    In,
    Out
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSummary {
    pub seqno: Option<u32>,
    pub body: Option<TransactionBody>,
    pub status: TransactionStatus,
    pub dest: Option<String>,
    pub kind: TransactionKind,
    /// Signed: negative for outgoing value.
    pub amount: String,
    pub resolved_address: String,
    pub bounced: bool,
    pub mentioned: Vec<String>
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OperationItem {
    Ton { amount: String }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ParsedOperation {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
    pub items: Vec<OperationItem>
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTransaction {
    pub address: String,
    pub lt: String,
    pub hash: String,
    pub prev_transaction: LastTransaction,
    pub time: u32,
    pub out_messages_count: usize,
    pub old_status: AccountStatus,
    pub new_status: AccountStatus,
    pub fees: String,
    pub update: ParsedHashUpdate,
    pub in_message: Option<ParsedMessage>,
    pub out_messages: Vec<ParsedMessage>,
    pub parsed: ParsedSummary,
    pub operation: ParsedOperation
}

impl Validate for ParsedTransaction {
    fn validate(&self) -> Result<(), Violation> {
        check_address("address", &self.address)?;
        check_unsigned("lt", &self.lt)?;
        check_unsigned("fees", &self.fees)?;
        self.prev_transaction.validate().map_err(|v| v.within("prevTransaction"))?;
        check_signed("parsed.amount", &self.parsed.amount)?;

        if self.out_messages_count != self.out_messages.len() {
            return Err(Violation::new(
                "outMessagesCount".to_owned(),
                format!("{} does not match {} out messages", self.out_messages_count, self.out_messages.len())
            ));
        }

        Ok(())
    }
}

#[derive(new, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ParsedTransactions {
    pub blocks: Vec<BlockReference>,
    pub transactions: Vec<ParsedTransaction>
}

impl Validate for ParsedTransactions {
    fn validate(&self) -> Result<(), Violation> {
        self.blocks.validate().map_err(|v| v.within("blocks"))?;
        self.transactions.validate().map_err(|v| v.within("transactions"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::schema::{OperationItem, ParsedMessageInfo, ParsedOperation, TransactionKind};

    #[test]
    fn operation_item_is_tagged_by_kind() {
        let operation = ParsedOperation::new("addr".to_owned(), None, vec![OperationItem::Ton { amount: "5".to_owned() }]);

        assert_eq!(serde_json::to_value(&operation).unwrap(), json!({
            "address": "addr",
            "items": [{"kind": "ton", "amount": "5"}]
        }));
    }

    #[test]
    fn external_out_info_shape() {
        assert_eq!(
            serde_json::to_value(ParsedMessageInfo::ExternalOut { dest: None }).unwrap(),
            json!({"type": "external-out", "dest": null})
        );
        assert_eq!(serde_json::to_value(TransactionKind::In).unwrap(), json!("in"));
    }
}
