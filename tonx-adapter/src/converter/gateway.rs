//! Gateway responses (JSON-RPC plus the REST side endpoints) to canonical
//! records.

use anyhow::Context;
use crate::address::Address;
use crate::codec::MASTERCHAIN_SHARD_HEX;
use crate::converter::common::{block_reference, classify_account_state, decode_stack, last_transaction, message_ihr_disabled, TransactionFields};
use crate::schema::{Account, AccountInfo, AccountTransaction, Block, BlockHashes, BlockReference, Coins, Config, ConfigInfo, LastBlock, RunMethodResult, SendResult, ShardBlock, ShardTransaction};
use crate::wire::gateway::{AddressInformation, BlockTransactions, ConfigParam, MasterchainInfo, RunGetMethod, SendMessage, Shards, Transaction};
use crate::wire::BlockRef;

pub fn last_block(info: MasterchainInfo, now: i64) -> anyhow::Result<LastBlock> {
    Ok(LastBlock::new(
        BlockHashes::new(info.first.root_hash, info.first.file_hash),
        block_reference(info.last).context("last")?,
        info.state_root_hash,
        now
    ))
}

/// Masterchain block first, then every listed shard in upstream order. An
/// unknown seqno yields no inputs at all.
pub fn block_inputs(seqno: u32, shards: Option<Shards>) -> Vec<BlockRef> {
    let Some(shards) = shards else {
        return Vec::new();
    };

    let masterchain = BlockRef {
        workchain: -1,
        shard: MASTERCHAIN_SHARD_HEX.to_owned(),
        seqno,
        root_hash: String::new(),
        file_hash: String::new()
    };

    std::iter::once(masterchain)
        .chain(shards.shards)
        .collect()
}

fn shard_block(data: BlockTransactions) -> anyhow::Result<ShardBlock> {
    let id = block_reference(data.id).context("id")?;
    let transactions = data.transactions.into_iter()
        .enumerate()
        .map(|(i, tx)| {
            let account = tx.account.parse::<Address>()
                .with_context(|| format!("transactions[{}].account", i))?;

            Ok(ShardTransaction::new(account.to_friendly_string(), tx.hash, tx.lt))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(ShardBlock::new(id, transactions))
}

/// `None` is the empty-block marker.
pub fn block(responses: Vec<BlockTransactions>) -> anyhow::Result<Option<Block>> {
    if responses.is_empty() {
        return Ok(None);
    }

    let shards = responses.into_iter()
        .enumerate()
        .map(|(i, data)| shard_block(data).with_context(|| format!("shards[{}]", i)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Some(Block::new(shards)))
}

pub fn account(info: AddressInformation) -> anyhow::Result<Account> {
    let state = classify_account_state(&info.state, info.code, info.data, info.frozen_hash);
    let last = info.last_transaction_id.and_then(|id| last_transaction(Some(id.lt), Some(id.hash)));

    Ok(Account::new(
        AccountInfo::new(state, Coins::new(info.balance), last, None),
        block_reference(info.block_id).context("block_id")?
    ))
}

pub fn transactions(page: Vec<Transaction>) -> anyhow::Result<Vec<AccountTransaction>> {
    page.into_iter()
        .enumerate()
        .map(|(i, tx)| {
            let fields = TransactionFields {
                account: tx.account,
                hash: tx.hash,
                lt: tx.lt,
                prev_hash: tx.prev_trans_hash,
                prev_lt: tx.prev_trans_lt,
                now: tx.now,
                old_status: tx.orig_status,
                end_status: tx.end_status,
                total_fees: tx.total_fees,
                in_message: tx.in_msg,
                out_messages: tx.out_msgs.into_vec(),
                state_hash_before: tx.account_state_hash_before,
                state_hash_after: tx.account_state_hash_after,
                description: tx.description,
                block: BlockRef {
                    workchain: tx.block_ref.workchain,
                    shard: tx.block_ref.shard,
                    seqno: tx.block_ref.seqno,
                    root_hash: String::new(),
                    file_hash: String::new()
                }
            };

            fields.convert(message_ihr_disabled)
                .with_context(|| format!("result[{}]", i))
        })
        .collect()
}

pub fn config(param: ConfigParam) -> Config {
    Config::new(ConfigInfo::new(param.config.bytes, String::new(), Coins::new(String::new())))
}

pub fn run_method(response: RunGetMethod, block: BlockReference) -> anyhow::Result<RunMethodResult> {
    let shard_block = match response.block_id {
        Some(id) => block_reference(id).context("block_id")?,
        None => BlockReference::placeholder()
    };

    Ok(RunMethodResult::new(
        response.exit_code,
        decode_stack(response.stack)?,
        None,
        block,
        shard_block
    ))
}

pub fn send(response: SendMessage) -> SendResult {
    SendResult::new(response.status.unwrap_or(1))
}
