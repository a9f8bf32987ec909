//! Conversion rules both provider families share.

use anyhow::{anyhow, bail, Context};
use base64::Engine;
use itertools::Itertools;
use num_bigint::{BigInt, BigUint, Sign};
use serde_json::{json, Map, Value};
use crate::address::Address;
use crate::codec::{base64_to_byte_array, base64_to_decimal, hex_shard_to_signed_decimal, parse_coins, parse_u64, raw_address_to_decimal, CodecError};
use crate::schema::{Account, AccountLite, AccountLiteInfo, AccountState, AccountStatus, AccountTransaction, BlockReference, Changed, CommonMessageInfo, CurrencyCollection, HashUpdate, LastTransaction, LiteState, Message, OperationItem, ParsedHashUpdate, ParsedMessage, ParsedMessageInfo, ParsedOperation, ParsedSummary, ParsedTransaction, ParsedTransactions, Transaction, TransactionBody, TransactionKind, TransactionStatus, TupleItem};
use crate::wire;
use crate::wire::InitState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDirection {
    Internal,
    ExternalIn,
    ExternalOut
}

/// `ihr_disabled == false` always wins; otherwise a populated creation lt
/// marks an outbound external message.
pub fn classify_message(ihr_disabled: bool, created_lt: Option<&str>) -> MessageDirection {
    if !ihr_disabled {
        return MessageDirection::Internal;
    }

    match created_lt {
        Some(lt) if !lt.is_empty() && lt != "0" => MessageDirection::ExternalOut,
        _ => MessageDirection::ExternalIn
    }
}

/// Stand-in for `ihr_disabled` when the provider does not send one: external
/// messages lack either end.
pub fn addressing_ihr_disabled(message: &wire::Message) -> bool {
    message.source.is_none() || message.destination.is_none()
}

/// The upstream flag when present, the addressing stand-in otherwise.
pub fn message_ihr_disabled(message: &wire::Message) -> bool {
    message.ihr_disabled.unwrap_or_else(|| addressing_ihr_disabled(message))
}

fn required_address(address: Option<&str>, field: &str) -> anyhow::Result<Address> {
    let address = address.ok_or_else(|| anyhow!("{}: missing", field))?;

    address.parse::<Address>().with_context(|| field.to_owned())
}

fn optional_address(address: Option<&str>, field: &str) -> anyhow::Result<Option<Address>> {
    Address::parse_optional(address).with_context(|| field.to_owned())
}

fn coins(value: Option<&str>, field: &str) -> anyhow::Result<BigUint> {
    match value {
        None => Ok(BigUint::default()),
        Some(value) => parse_coins(value).with_context(|| field.to_owned())
    }
}

fn logical_time(value: Option<&str>, field: &str) -> anyhow::Result<u64> {
    match value {
        None => Ok(0),
        Some(value) => parse_u64(value).with_context(|| field.to_owned())
    }
}

fn seconds(value: Option<&str>, field: &str) -> anyhow::Result<u32> {
    match value {
        None => Ok(0),
        Some(value) => value.parse::<u32>()
            .map_err(|_| CodecError::InvalidNumber(value.to_owned()))
            .with_context(|| field.to_owned())
    }
}

pub fn convert_message(message: wire::Message, ihr_disabled: bool) -> anyhow::Result<Message> {
    let direction = classify_message(ihr_disabled, message.created_lt.as_deref());
    let source = message.source.as_deref();
    let destination = message.destination.as_deref();

    let info = match direction {
        MessageDirection::Internal => CommonMessageInfo::Internal {
            ihr_disabled,
            bounce: message.bounce.unwrap_or(false),
            bounced: message.bounced.unwrap_or(false),
            src: required_address(source, "source")?,
            dest: required_address(destination, "destination")?,
            value: CurrencyCollection::new(coins(message.value.as_deref(), "value")?),
            ihr_fee: coins(message.ihr_fee.as_deref(), "ihr_fee")?,
            forward_fee: coins(message.fwd_fee.as_deref(), "fwd_fee")?,
            created_lt: logical_time(message.created_lt.as_deref(), "created_lt")?,
            created_at: seconds(message.created_at.as_deref(), "created_at")?
        },
        MessageDirection::ExternalIn => CommonMessageInfo::ExternalIn {
            src: optional_address(source, "source")?,
            dest: required_address(destination, "destination")?,
            import_fee: coins(message.import_fee.as_deref(), "import_fee")?
        },
        MessageDirection::ExternalOut => CommonMessageInfo::ExternalOut {
            src: required_address(source, "source")?,
            dest: optional_address(destination, "destination")?,
            created_lt: logical_time(message.created_lt.as_deref(), "created_lt")?,
            created_at: seconds(message.created_at.as_deref(), "created_at")?
        }
    };

    Ok(Message::new(
        info,
        message.init_state.and_then(InitState::into_boc),
        message.message_content.and_then(|content| content.body)
    ))
}

/// Transaction fields both families report under slightly different names.
pub struct TransactionFields {
    pub account: String,
    pub hash: String,
    pub lt: String,
    pub prev_hash: String,
    pub prev_lt: String,
    pub now: u32,
    pub old_status: AccountStatus,
    pub end_status: AccountStatus,
    pub total_fees: String,
    pub in_message: Option<wire::Message>,
    pub out_messages: Vec<wire::Message>,
    pub state_hash_before: String,
    pub state_hash_after: String,
    pub description: Value,
    pub block: wire::BlockRef
}

impl TransactionFields {
    /// `ihr_disabled` decides, per message, the flag the classifier sees.
    pub fn convert(self, ihr_disabled: impl Fn(&wire::Message) -> bool) -> anyhow::Result<AccountTransaction> {
        let block = block_reference(self.block).context("block_ref")?;

        let in_message = self.in_message
            .map(|message| {
                let flag = ihr_disabled(&message);
                convert_message(message, flag)
            })
            .transpose()
            .context("in_msg")?;

        let out_messages = self.out_messages.into_iter()
            .enumerate()
            .map(|(i, message)| {
                let flag = ihr_disabled(&message);
                convert_message(message, flag).with_context(|| format!("out_msgs[{}]", i))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let state_update = HashUpdate::new(
            base64_to_byte_array(&self.state_hash_before).context("state_hash_before")?,
            base64_to_byte_array(&self.state_hash_after).context("state_hash_after")?
        );

        let tx = Transaction::new(
            raw_address_to_decimal(&self.account).context("account")?,
            parse_u64(&self.lt).context("lt")?,
            self.hash,
            parse_u64(&self.prev_lt).context("prev_trans_lt")?,
            base64_to_decimal(&self.prev_hash).context("prev_trans_hash")?,
            self.now,
            out_messages.len(),
            self.old_status,
            self.end_status,
            in_message,
            out_messages,
            CurrencyCollection::new(parse_coins(&self.total_fees).context("total_fees")?),
            state_update,
            self.description
        );

        Ok(AccountTransaction::new(block, tx))
    }
}

/// Only an exact `"uninit"` is uninitialized and only `"active"` is active;
/// every other status string lands on frozen.
pub fn classify_account_state(status: &str, code: Option<String>, data: Option<String>, frozen_hash: String) -> AccountState {
    if status == "uninit" {
        return AccountState::Uninit;
    }

    if status == "active" {
        AccountState::Active { code, data }
    } else {
        AccountState::Frozen { state_hash: frozen_hash }
    }
}

/// Both families send block ids with the shard as 16 hex digits.
pub fn block_reference(block: wire::BlockRef) -> anyhow::Result<BlockReference> {
    let shard = hex_shard_to_signed_decimal(&block.shard).context("shard")?;

    Ok(BlockReference::new(block.workchain, block.seqno, shard, block.root_hash, block.file_hash))
}

/// An lt of zero means the account has no history yet.
pub fn last_transaction(lt: Option<String>, hash: Option<String>) -> Option<LastTransaction> {
    match lt {
        Some(lt) if !lt.is_empty() && lt != "0" => Some(LastTransaction::new(lt, hash.unwrap_or_default())),
        _ => None
    }
}

/// Active accounts keep `(code_hash, data_hash)` when the provider sent
/// them, otherwise the raw code and data stand in.
pub fn account_lite(account: Account, hashes: Option<(String, String)>) -> AccountLite {
    let info = account.account;
    let state = match info.state {
        AccountState::Uninit => LiteState::Uninit,
        AccountState::Active { code, data } => {
            let (code_hash, data_hash) = hashes.unwrap_or_else(|| (code.unwrap_or_default(), data.unwrap_or_default()));

            LiteState::Active { code_hash, data_hash }
        },
        AccountState::Frozen { state_hash } => LiteState::Frozen { state_hash }
    };

    AccountLite::new(AccountLiteInfo::new(state, info.balance, info.last, info.storage_stat), account.block)
}

pub fn account_changed(account: Account, lt: &str) -> Changed {
    let last_lt = account.account.last.as_ref().map(|last| last.lt.as_str()).unwrap_or("0");

    Changed::new(last_lt != lt, account.block)
}

fn account_address(workchain: i32, id: &BigUint) -> anyhow::Result<Address> {
    let bytes = id.to_bytes_be();
    if bytes.len() > 32 {
        bail!("address: account id is longer than 32 bytes");
    }

    let mut buf = [0u8; 32];
    buf[32 - bytes.len()..].copy_from_slice(&bytes);

    Ok(Address::new(workchain, buf))
}

fn parse_message(message: &Message) -> ParsedMessage {
    let info = match &message.info {
        CommonMessageInfo::Internal { ihr_disabled, bounce, bounced, src, dest, value, ihr_fee, forward_fee, created_lt, created_at } => ParsedMessageInfo::Internal {
            value: value.coins.to_string(),
            dest: dest.to_friendly_string(),
            src: src.to_friendly_string(),
            bounced: *bounced,
            bounce: *bounce,
            ihr_disabled: *ihr_disabled,
            created_at: *created_at,
            created_lt: created_lt.to_string(),
            fwd_fee: forward_fee.to_string(),
            ihr_fee: ihr_fee.to_string()
        },
        CommonMessageInfo::ExternalIn { src, dest, import_fee } => ParsedMessageInfo::ExternalIn {
            dest: dest.to_friendly_string(),
            src: src.as_ref().map(Address::to_friendly_string),
            import_fee: import_fee.to_string()
        },
        CommonMessageInfo::ExternalOut { dest, .. } => ParsedMessageInfo::ExternalOut {
            dest: dest.as_ref().map(Address::to_friendly_string)
        }
    };

    ParsedMessage::new(message.body.clone().unwrap_or_default(), info, message.init.clone())
}

fn destination(message: &Message) -> Option<&Address> {
    match &message.info {
        CommonMessageInfo::Internal { dest, .. } | CommonMessageInfo::ExternalIn { dest, .. } => Some(dest),
        CommonMessageInfo::ExternalOut { dest, .. } => dest.as_ref()
    }
}

fn internal_value(message: &Message) -> Option<&BigUint> {
    match &message.info {
        CommonMessageInfo::Internal { value, .. } => Some(&value.coins),
        _ => None
    }
}

fn parse_transaction(item: &AccountTransaction) -> anyhow::Result<ParsedTransaction> {
    let tx = &item.tx;
    let own = account_address(item.block.workchain, &tx.address)?;
    let resolved_address = own.to_friendly_string();

    let inbound = tx.in_message.as_ref().filter(|message| message.info.is_internal());
    let (kind, amount, counterparty, body) = match inbound {
        Some(message) => {
            let src = match &message.info {
                CommonMessageInfo::Internal { src, .. } => Some(src.to_friendly_string()),
                _ => None
            };
            let value = internal_value(message).cloned().unwrap_or_default();

            (TransactionKind::In, BigInt::from_biguint(Sign::Plus, value), src, message.body.clone())
        },
        None => {
            let sent: BigUint = tx.out_messages.iter().filter_map(internal_value).sum();
            let first = tx.out_messages.first();

            (
                TransactionKind::Out,
                -BigInt::from_biguint(Sign::Plus, sent),
                first.and_then(destination).map(Address::to_friendly_string),
                first.and_then(|message| message.body.clone())
            )
        }
    };

    let mentioned = tx.in_message.iter()
        .filter_map(|message| match &message.info {
            CommonMessageInfo::Internal { src, .. } => Some(src),
            CommonMessageInfo::ExternalIn { src, .. } => src.as_ref(),
            CommonMessageInfo::ExternalOut { .. } => None
        })
        .chain(tx.out_messages.iter().filter_map(destination))
        .map(Address::to_friendly_string)
        .filter(|address| address != &resolved_address)
        .unique()
        .collect_vec();

    let dest = match kind {
        TransactionKind::In => Some(resolved_address.clone()),
        TransactionKind::Out => counterparty.clone()
    };
    let status = if tx.is_aborted() { TransactionStatus::Failed } else { TransactionStatus::Success };
    let bounced = match inbound.map(|message| &message.info) {
        Some(CommonMessageInfo::Internal { bounced, .. }) => *bounced,
        _ => false
    };

    let operation = ParsedOperation::new(
        counterparty.unwrap_or_else(|| resolved_address.clone()),
        None,
        vec![OperationItem::Ton { amount: amount.magnitude().to_string() }]
    );

    let summary = ParsedSummary::new(
        None,
        body.map(|cell| TransactionBody::Payload { cell }),
        status,
        dest,
        kind,
        amount.to_string(),
        resolved_address.clone(),
        bounced,
        mentioned
    );

    let update = ParsedHashUpdate::new(
        base64::engine::general_purpose::STANDARD.encode(&tx.state_update.old_hash),
        base64::engine::general_purpose::STANDARD.encode(&tx.state_update.new_hash)
    );

    Ok(ParsedTransaction::new(
        resolved_address,
        tx.lt.to_string(),
        tx.hash.clone(),
        LastTransaction::new(tx.prev_transaction_lt.to_string(), tx.prev_transaction_hash_base64()),
        tx.now,
        tx.out_messages_count,
        tx.old_status,
        tx.end_status,
        tx.total_fees.coins.to_string(),
        update,
        tx.in_message.as_ref().map(parse_message),
        tx.out_messages.iter().map(parse_message).collect(),
        summary,
        operation
    ))
}

pub fn parse_transactions(page: &[AccountTransaction]) -> anyhow::Result<ParsedTransactions> {
    let blocks = page.iter()
        .map(|item| item.block.clone())
        .unique()
        .collect();

    let transactions = page.iter()
        .enumerate()
        .map(|(i, item)| parse_transaction(item).with_context(|| format!("transactions[{}]", i)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(ParsedTransactions::new(blocks, transactions))
}

fn parse_number(s: &str) -> anyhow::Result<BigInt> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, s)
    };

    let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => BigInt::parse_bytes(hex.as_bytes(), 16),
        None => BigInt::parse_bytes(digits.as_bytes(), 10)
    }.ok_or_else(|| CodecError::InvalidNumber(s.to_owned()))?;

    Ok(if negative { -magnitude } else { magnitude })
}

fn number_value(value: &Value) -> anyhow::Result<BigInt> {
    match value {
        Value::String(s) => parse_number(s),
        Value::Number(n) => parse_number(&n.to_string()),
        Value::Object(map) => number_value(map.get("number").ok_or_else(|| anyhow!("number: missing"))?),
        other => bail!("expected number, got {}", other)
    }
}

fn boc_value(value: Value) -> anyhow::Result<String> {
    match value {
        Value::String(boc) => Ok(boc),
        Value::Object(mut map) => match map.remove("bytes") {
            Some(Value::String(boc)) => Ok(boc),
            _ => bail!("bytes: missing")
        },
        other => bail!("expected serialized cell, got {}", other)
    }
}

fn elements_value(value: Value) -> anyhow::Result<Vec<TupleItem>> {
    let elements = match value {
        Value::Array(elements) => elements,
        Value::Object(mut map) => match map.remove("elements") {
            Some(Value::Array(elements)) => elements,
            _ => bail!("elements: missing")
        },
        other => bail!("expected tuple elements, got {}", other)
    };

    decode_stack(elements)
}

fn decode_typed(kind: &str, value: Value) -> anyhow::Result<TupleItem> {
    Ok(match kind {
        "num" | "int" | "number" => TupleItem::Int { value: number_value(&value)? },
        "null" => TupleItem::Null,
        "nan" => TupleItem::Nan,
        "cell" | "tvm.Cell" => TupleItem::Cell { cell: boc_value(value)? },
        "slice" | "tvm.Slice" => TupleItem::Slice { cell: boc_value(value)? },
        "builder" | "tvm.Builder" => TupleItem::Builder { cell: boc_value(value)? },
        "tuple" | "list" | "tvm.Tuple" | "tvm.List" => TupleItem::Tuple { items: elements_value(value)? },
        other => bail!("unsupported stack entry type {}", other)
    })
}

fn decode_tonlib(kind: &str, mut entry: Map<String, Value>) -> anyhow::Result<TupleItem> {
    let mut take = |field: &str| entry.remove(field).ok_or_else(|| anyhow!("{}: missing", field));

    Ok(match kind {
        "tvm.stackEntryNumber" => TupleItem::Int { value: number_value(&take("number")?)? },
        "tvm.stackEntryCell" => TupleItem::Cell { cell: boc_value(take("cell")?)? },
        "tvm.stackEntrySlice" => TupleItem::Slice { cell: boc_value(take("slice")?)? },
        "tvm.stackEntryTuple" => TupleItem::Tuple { items: elements_value(take("tuple")?)? },
        "tvm.stackEntryList" => TupleItem::Tuple { items: elements_value(take("list")?)? },
        other => bail!("unsupported stack entry {}", other)
    })
}

fn decode_stack_entry(entry: Value) -> anyhow::Result<TupleItem> {
    match entry {
        Value::Array(pair) => {
            let [kind, value] = <[Value; 2]>::try_from(pair)
                .map_err(|_| anyhow!("expected [type, value] pair"))?;
            let Value::String(kind) = kind else {
                bail!("stack entry type must be a string");
            };

            decode_typed(&kind, value)
        },
        Value::Object(mut map) => {
            if let Some(Value::String(kind)) = map.remove("@type") {
                return decode_tonlib(&kind, map);
            }

            let Some(Value::String(kind)) = map.remove("type") else {
                bail!("stack entry without type");
            };

            decode_typed(&kind, map.remove("value").unwrap_or(Value::Null))
        },
        Value::Null => Ok(TupleItem::Null),
        other => bail!("unsupported stack entry {}", other)
    }
}

/// Accepts `["num", "0x2a"]` pairs, tonlib `tvm.stackEntry*` objects and
/// `{type, value}` objects, mixed freely.
pub fn decode_stack(stack: Vec<Value>) -> anyhow::Result<Vec<TupleItem>> {
    stack.into_iter()
        .enumerate()
        .map(|(i, entry)| decode_stack_entry(entry).with_context(|| format!("stack[{}]", i)))
        .collect()
}

fn hex_number(value: &BigInt) -> String {
    match value.sign() {
        Sign::Minus => format!("-0x{:x}", value.magnitude()),
        _ => format!("0x{:x}", value.magnitude())
    }
}

pub fn encode_stack_pairs(items: &[TupleItem]) -> Vec<Value> {
    items.iter().map(|item| match item {
        TupleItem::Null => json!(["null", null]),
        TupleItem::Nan => json!(["nan", null]),
        TupleItem::Int { value } => json!(["num", hex_number(value)]),
        TupleItem::Cell { cell } => json!(["tvm.Cell", cell]),
        TupleItem::Slice { cell } => json!(["tvm.Slice", cell]),
        TupleItem::Builder { cell } => json!(["tvm.Builder", cell]),
        TupleItem::Tuple { items } => json!(["tvm.Tuple", encode_stack_pairs(items)])
    }).collect()
}

pub fn encode_stack_typed(items: &[TupleItem]) -> Vec<Value> {
    items.iter().map(|item| match item {
        TupleItem::Null => json!({"type": "null"}),
        TupleItem::Nan => json!({"type": "nan"}),
        TupleItem::Int { value } => json!({"type": "num", "value": hex_number(value)}),
        TupleItem::Cell { cell } => json!({"type": "cell", "value": cell}),
        TupleItem::Slice { cell } => json!({"type": "slice", "value": cell}),
        TupleItem::Builder { cell } => json!({"type": "builder", "value": cell}),
        TupleItem::Tuple { items } => json!({"type": "tuple", "value": encode_stack_typed(items)})
    }).collect()
}
