//! Explorer (indexer REST) responses to canonical records.

use anyhow::Context;
use crate::address::Address;
use crate::codec::MASTERCHAIN_SHARD_HEX;
use crate::converter::common::{account_lite, block_reference, classify_account_state, decode_stack, last_transaction, message_ihr_disabled, TransactionFields};
use crate::schema::{Account, AccountInfo, AccountLite, AccountTransaction, Block, BlockHashes, BlockReference, Coins, LastBlock, RunMethodResult, SendResult, ShardBlock, ShardTransaction};
use crate::wire::explorer::{Account as ExplorerAccount, Blocks, MasterchainInfo, RunGetMethod, Transactions};
use crate::wire::BlockRef;

pub fn last_block(info: MasterchainInfo, now: i64) -> anyhow::Result<LastBlock> {
    Ok(LastBlock::new(
        BlockHashes::new(info.first.root_hash, info.first.file_hash),
        block_reference(info.last).context("last")?,
        String::new(),
        now
    ))
}

/// The explorer lists the masterchain block among the shards; it is moved to
/// the front, the rest keep their order.
pub fn block_inputs(seqno: u32, listed: Blocks) -> Vec<BlockRef> {
    if listed.blocks.is_empty() {
        return Vec::new();
    }

    let (masterchain, shards): (Vec<_>, Vec<_>) = listed.blocks
        .into_iter()
        .partition(|block| block.workchain == -1);

    let masterchain = masterchain.into_iter()
        .find(|block| block.seqno == seqno)
        .unwrap_or_else(|| BlockRef {
            workchain: -1,
            shard: MASTERCHAIN_SHARD_HEX.to_owned(),
            seqno,
            root_hash: String::new(),
            file_hash: String::new()
        });

    std::iter::once(masterchain)
        .chain(shards)
        .collect()
}

fn shard_block(id: BlockRef, data: Transactions) -> anyhow::Result<ShardBlock> {
    let id = block_reference(id).context("id")?;
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
pub fn block(responses: Vec<(BlockRef, Transactions)>) -> anyhow::Result<Option<Block>> {
    if responses.is_empty() {
        return Ok(None);
    }

    let shards = responses.into_iter()
        .enumerate()
        .map(|(i, (id, data))| shard_block(id, data).with_context(|| format!("shards[{}]", i)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Some(Block::new(shards)))
}

/// The explorer reports `nonexist` for never-touched addresses.
fn status(account: &ExplorerAccount) -> &str {
    match account.status.as_str() {
        "nonexist" => "uninit",
        status => status
    }
}

pub fn account(account: Option<ExplorerAccount>, block: BlockRef) -> anyhow::Result<Account> {
    let block = block_reference(block).context("block")?;
    let Some(account) = account else {
        return Ok(Account::new(
            AccountInfo::new(classify_account_state("uninit", None, None, String::new()), Coins::new("0".to_owned()), None, None),
            block
        ));
    };

    let status = status(&account).to_owned();
    let state = classify_account_state(
        &status,
        account.code_boc,
        account.data_boc,
        account.frozen_hash.unwrap_or_default()
    );

    Ok(Account::new(
        AccountInfo::new(
            state,
            Coins::new(account.balance.unwrap_or_else(|| "0".to_owned())),
            last_transaction(account.last_transaction_lt, account.last_transaction_hash),
            None
        ),
        block
    ))
}

pub fn account_lite_from(explorer_account: Option<ExplorerAccount>, block: BlockRef) -> anyhow::Result<AccountLite> {
    let hashes = explorer_account.as_ref()
        .map(|a| (a.code_hash.clone().unwrap_or_default(), a.data_hash.clone().unwrap_or_default()));

    Ok(account_lite(account(explorer_account, block)?, hashes))
}

pub fn transactions(page: Transactions) -> anyhow::Result<Vec<AccountTransaction>> {
    page.transactions.into_iter()
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
                out_messages: tx.out_msgs,
                state_hash_before: tx.account_state_before.map(|state| state.hash).unwrap_or_default(),
                state_hash_after: tx.account_state_after.map(|state| state.hash).unwrap_or_default(),
                description: tx.description,
                block: tx.block_ref
            };

            fields.convert(message_ihr_disabled)
                .with_context(|| format!("transactions[{}]", i))
        })
        .collect()
}

pub fn run_method(response: RunGetMethod, block: BlockReference) -> anyhow::Result<RunMethodResult> {
    Ok(RunMethodResult::new(
        response.exit_code,
        decode_stack(response.stack)?,
        None,
        block,
        BlockReference::placeholder()
    ))
}

pub fn send() -> SendResult {
    SendResult::new(1)
}
