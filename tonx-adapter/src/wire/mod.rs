//! Upstream response shapes, exactly as providers send them. Nothing here is
//! trusted: converters turn these into [`crate::schema`] records.

use serde::Deserialize;
use crate::deserialize::{deserialize_empty_as_none, deserialize_number_from_string, deserialize_optional_decimal_string};

pub mod explorer;
pub mod gateway;

/// `{ok, result}` wrapper shared by the JSON-RPC and REST gateway endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_ok")]
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<String>
}

fn default_ok() -> bool { true }

impl<T> Envelope<T> {
    pub fn into_result(self) -> anyhow::Result<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (_, _) => Err(anyhow::anyhow!("result: missing{}", self.error.map(|e| format!(" ({})", e)).unwrap_or_default()))
        }
    }

    /// `None` when the upstream says it has nothing for the request.
    pub fn into_option(self) -> Option<T> {
        if self.ok { self.result } else { None }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BlockRef {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub workchain: i32,
    #[serde(deserialize_with = "crate::deserialize::deserialize_decimal_string")]
    pub shard: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub seqno: u32,
    #[serde(default)]
    pub root_hash: String,
    #[serde(default)]
    pub file_hash: String
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct MessageContent {
    #[serde(default, deserialize_with = "deserialize_empty_as_none")]
    pub body: Option<String>
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum InitState {
    Boc(String),
    Object {
        #[serde(default, deserialize_with = "deserialize_empty_as_none")]
        body: Option<String>
    }
}

impl InitState {
    pub fn into_boc(self) -> Option<String> {
        match self {
            InitState::Boc(boc) if boc.is_empty() => None,
            InitState::Boc(boc) => Some(boc),
            InitState::Object { body } => body
        }
    }
}

/// Message as both provider families describe it; every field may be
/// missing depending on the direction.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Message {
    #[serde(default, deserialize_with = "deserialize_empty_as_none")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "deserialize_empty_as_none")]
    pub destination: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal_string")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal_string")]
    pub fwd_fee: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal_string")]
    pub ihr_fee: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal_string")]
    pub import_fee: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal_string")]
    pub created_lt: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal_string")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub ihr_disabled: Option<bool>,
    #[serde(default)]
    pub bounce: Option<bool>,
    #[serde(default)]
    pub bounced: Option<bool>,
    #[serde(default)]
    pub message_content: Option<MessageContent>,
    #[serde(default)]
    pub init_state: Option<InitState>
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::wire::{BlockRef, Envelope, InitState, Message};

    #[test]
    fn envelope_ok_false_is_empty() {
        let envelope: Envelope<BlockRef> = serde_json::from_value(json!({"ok": false, "error": "not found"})).unwrap();

        assert!(envelope.into_option().is_none());
    }

    #[test]
    fn envelope_without_result_fails() {
        let envelope: Envelope<BlockRef> = serde_json::from_value(json!({"result": null})).unwrap();

        assert!(envelope.into_result().unwrap_err().to_string().starts_with("result"));
    }

    #[test]
    fn block_ref_numeric_strings() {
        let block: BlockRef = serde_json::from_value(json!({"workchain": "-1", "shard": "8000000000000000", "seqno": "42"})).unwrap();

        assert_eq!(block.workchain, -1);
        assert_eq!(block.seqno, 42);
        assert_eq!(block.root_hash, "");
    }

    #[test]
    fn block_ref_rejects_word_seqno() {
        assert!(serde_json::from_value::<BlockRef>(json!({"workchain": -1, "shard": "8000000000000000", "seqno": "not-a-number"})).is_err());
    }

    #[test]
    fn message_tolerates_missing_fields() {
        let message: Message = serde_json::from_value(json!({
            "source": null,
            "destination": "0:a3935861f79daf59a13d6d182e1640210c02f98e3df18fda74b8f5ab141abf18",
            "created_lt": null,
            "init_state": {"hash": "h", "body": "te6c"}
        })).unwrap();

        assert_eq!(message.source, None);
        assert_eq!(message.created_lt, None);
        assert_eq!(message.init_state.and_then(InitState::into_boc), Some("te6c".to_owned()));
    }
}
