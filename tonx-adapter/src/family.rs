//! Provider families. Each family knows its own call shapes and converter
//! generation; the client picks one at construction and never mixes them.

use std::time::{Duration, SystemTime, UNIX_EPOCH};
use anyhow::Context;
use async_trait::async_trait;
use derive_new::new;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use crate::address::Address;
use crate::converter;
use crate::converter::common::{account_lite, encode_stack_pairs, encode_stack_typed};
use crate::error::AdapterError;
use crate::request::Request;
use crate::schema::{Account, AccountLite, AccountTransaction, Block, Config, LastBlock, RunMethodResult, SendResult, TupleItem};
use crate::transport::{call, send_sequential, Transport};
use crate::wire::{explorer, gateway, BlockRef, Envelope};

/// Transaction rows requested per shard block from the explorer.
const BLOCK_TRANSACTIONS_LIMIT: u32 = 256;

#[async_trait]
pub trait Family: Send + Sync {
    fn name(&self) -> &'static str;

    async fn last_block(&self, transport: &dyn Transport) -> anyhow::Result<LastBlock>;

    /// `None` when the provider has no shard list for `seqno`.
    async fn block(&self, transport: &dyn Transport, seqno: u32) -> anyhow::Result<Option<Block>>;

    /// Masterchain seqno of the first block at or after `utime`.
    async fn seqno_by_utime(&self, transport: &dyn Transport, utime: u32) -> anyhow::Result<Option<u32>>;

    async fn account(&self, transport: &dyn Transport, seqno: u32, address: &Address) -> anyhow::Result<Account>;

    async fn account_lite(&self, transport: &dyn Transport, seqno: u32, address: &Address) -> anyhow::Result<AccountLite>;

    async fn transactions(&self, transport: &dyn Transport, address: &Address, lt: u64, hash: &str, limit: Option<usize>) -> anyhow::Result<Vec<AccountTransaction>>;

    async fn config(&self, transport: &dyn Transport, seqno: u32, id: Option<i32>) -> anyhow::Result<Config>;

    async fn run_method(&self, transport: &dyn Transport, seqno: u32, address: &Address, name: &str, args: &[TupleItem]) -> anyhow::Result<RunMethodResult>;

    async fn send_message(&self, transport: &dyn Transport, boc: String) -> anyhow::Result<SendResult>;
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn decode_all<T: DeserializeOwned>(responses: Vec<Value>, label: &str) -> anyhow::Result<Vec<T>> {
    responses.into_iter()
        .enumerate()
        .map(|(i, response)| serde_json::from_value(response).with_context(|| format!("{}[{}]", label, i)))
        .collect()
}

/// JSON-RPC gateway with REST side endpoints, the api key travels in the url.
#[derive(new, Debug, Clone)]
pub struct Gateway {
    inter_call_delay: Duration,
    run_method_settle: Duration
}

#[async_trait]
impl Family for Gateway {
    fn name(&self) -> &'static str { "gateway" }

    async fn last_block(&self, transport: &dyn Transport) -> anyhow::Result<LastBlock> {
        let info: Envelope<gateway::MasterchainInfo> = call(transport, Request::rpc("getMasterchainInfo", None)).await?;

        converter::gateway::last_block(info.into_result()?, unix_now())
    }

    async fn block(&self, transport: &dyn Transport, seqno: u32) -> anyhow::Result<Option<Block>> {
        let shards: Envelope<gateway::Shards> = call(transport, Request::get("shards", [("seqno", seqno)])).await?;

        let requests = converter::gateway::block_inputs(seqno, shards.into_option())
            .into_iter()
            .map(|block| Request::rpc("getBlockTransactions", Some(json!({
                "workchain": block.workchain,
                "shard": block.shard,
                "seqno": block.seqno
            }))))
            .collect();

        let responses = send_sequential(transport, requests, self.inter_call_delay).await?;
        let data = decode_all::<Envelope<gateway::BlockTransactions>>(responses, "getBlockTransactions")?
            .into_iter()
            .map(Envelope::into_result)
            .collect::<anyhow::Result<Vec<_>>>()?;

        converter::gateway::block(data)
    }

    async fn seqno_by_utime(&self, transport: &dyn Transport, utime: u32) -> anyhow::Result<Option<u32>> {
        let block: Envelope<BlockRef> = call(transport, Request::rpc("lookupBlock", Some(json!({
            "workchain": -1,
            "shard": "-9223372036854775808",
            "unixtime": utime
        })))).await?;

        Ok(block.into_option().map(|block| block.seqno))
    }

    async fn account(&self, transport: &dyn Transport, _seqno: u32, address: &Address) -> anyhow::Result<Account> {
        let info: Envelope<gateway::AddressInformation> = call(transport, Request::rpc("getAddressInformation", Some(json!({
            "address": address.to_friendly_string()
        })))).await?;

        converter::gateway::account(info.into_result()?)
    }

    async fn account_lite(&self, transport: &dyn Transport, seqno: u32, address: &Address) -> anyhow::Result<AccountLite> {
        let account = self.account(transport, seqno, address).await?;

        Ok(account_lite(account, None))
    }

    async fn transactions(&self, transport: &dyn Transport, address: &Address, lt: u64, _hash: &str, limit: Option<usize>) -> anyhow::Result<Vec<AccountTransaction>> {
        let mut params = json!({
            "account": address.to_friendly_string(),
            "end_lt": lt,
            "sort": "DESC"
        });
        if let Some(limit) = limit {
            params["limit"] = json!(limit);
        }

        let page: Envelope<Vec<gateway::Transaction>> = call(transport, Request::rpc("getTransactions", Some(params))).await?;
        let page = page.into_result()?;
        tracing::debug!(count = page.len(), "got transactions");

        converter::gateway::transactions(page)
    }

    async fn config(&self, transport: &dyn Transport, seqno: u32, id: Option<i32>) -> anyhow::Result<Config> {
        let mut query = vec![("seqno", seqno.to_string())];
        if let Some(id) = id {
            query.push(("config_id", id.to_string()));
        }

        let param: Envelope<gateway::ConfigParam> = call(transport, Request::get("getConfigParam", query)).await?;

        Ok(converter::gateway::config(param.into_result()?))
    }

    async fn run_method(&self, transport: &dyn Transport, seqno: u32, address: &Address, name: &str, args: &[TupleItem]) -> anyhow::Result<RunMethodResult> {
        let response: Envelope<gateway::RunGetMethod> = call(transport, Request::rpc("runGetMethod", Some(json!({
            "address": address.to_friendly_string(),
            "method": name,
            "stack": encode_stack_pairs(args)
        })))).await?;
        let response = response.into_result()?;

        tokio::time::sleep(self.run_method_settle).await;
        let account = self.account(transport, seqno, address).await?;

        converter::gateway::run_method(response, account.block)
    }

    async fn send_message(&self, transport: &dyn Transport, boc: String) -> anyhow::Result<SendResult> {
        let response: Envelope<gateway::SendMessage> = call(transport, Request::rpc("sendMessage", Some(json!({"boc": boc})))).await?;

        Ok(converter::gateway::send(response.into_result()?))
    }
}

/// REST indexer, the api key travels in a header.
#[derive(new, Debug, Clone)]
pub struct Explorer {
    inter_call_delay: Duration,
    run_method_settle: Duration
}

impl Explorer {
    async fn masterchain_block(&self, transport: &dyn Transport, seqno: u32) -> anyhow::Result<BlockRef> {
        let listed: explorer::Blocks = call(transport, Request::get("blocks", [
            ("workchain", "-1".to_owned()),
            ("seqno", seqno.to_string()),
            ("limit", "1".to_owned())
        ])).await?;

        listed.blocks.into_iter()
            .next()
            .ok_or_else(|| AdapterError::BlockOutOfScope.into())
    }

    async fn account_state(&self, transport: &dyn Transport, address: &Address) -> anyhow::Result<Option<explorer::Account>> {
        let accounts: explorer::Accounts = call(transport, Request::get("accountStates", [
            ("address", address.to_friendly_string()),
            ("include_boc", "true".to_owned())
        ])).await?;

        Ok(accounts.accounts.into_iter().next())
    }
}

#[async_trait]
impl Family for Explorer {
    fn name(&self) -> &'static str { "explorer" }

    async fn last_block(&self, transport: &dyn Transport) -> anyhow::Result<LastBlock> {
        let info: explorer::MasterchainInfo = call(transport, Request::get("masterchainInfo", Vec::<(String, String)>::new())).await?;

        converter::explorer::last_block(info, unix_now())
    }

    async fn block(&self, transport: &dyn Transport, seqno: u32) -> anyhow::Result<Option<Block>> {
        let listed: explorer::Blocks = call(transport, Request::get("masterchainBlockShards", [("seqno", seqno)])).await?;

        let inputs = converter::explorer::block_inputs(seqno, listed);
        let requests = inputs.iter()
            .map(|block| Request::get("transactions", [
                ("workchain", block.workchain.to_string()),
                ("shard", block.shard.clone()),
                ("seqno", block.seqno.to_string()),
                ("limit", BLOCK_TRANSACTIONS_LIMIT.to_string()),
                ("sort", "asc".to_owned())
            ]))
            .collect();

        let responses = send_sequential(transport, requests, self.inter_call_delay).await?;
        let pages = decode_all::<explorer::Transactions>(responses, "transactions")?;

        converter::explorer::block(inputs.into_iter().zip(pages).collect())
    }

    async fn seqno_by_utime(&self, transport: &dyn Transport, utime: u32) -> anyhow::Result<Option<u32>> {
        let listed: explorer::Blocks = call(transport, Request::get("blocks", [
            ("workchain", "-1".to_owned()),
            ("start_utime", utime.to_string()),
            ("sort", "asc".to_owned()),
            ("limit", "1".to_owned())
        ])).await?;

        Ok(listed.blocks.first().map(|block| block.seqno))
    }

    async fn account(&self, transport: &dyn Transport, seqno: u32, address: &Address) -> anyhow::Result<Account> {
        let block = self.masterchain_block(transport, seqno).await?;
        let state = self.account_state(transport, address).await?;

        converter::explorer::account(state, block)
    }

    async fn account_lite(&self, transport: &dyn Transport, seqno: u32, address: &Address) -> anyhow::Result<AccountLite> {
        let block = self.masterchain_block(transport, seqno).await?;
        let state = self.account_state(transport, address).await?;

        converter::explorer::account_lite_from(state, block)
    }

    async fn transactions(&self, transport: &dyn Transport, address: &Address, lt: u64, _hash: &str, limit: Option<usize>) -> anyhow::Result<Vec<AccountTransaction>> {
        let mut query = vec![
            ("account", address.to_friendly_string()),
            ("end_lt", lt.to_string()),
            ("sort", "desc".to_owned())
        ];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        let page: explorer::Transactions = call(transport, Request::get("transactions", query)).await?;
        tracing::debug!(count = page.transactions.len(), "got transactions");

        converter::explorer::transactions(page)
    }

    async fn config(&self, _transport: &dyn Transport, _seqno: u32, _id: Option<i32>) -> anyhow::Result<Config> {
        Err(AdapterError::Unsupported("getConfig").into())
    }

    async fn run_method(&self, transport: &dyn Transport, seqno: u32, address: &Address, name: &str, args: &[TupleItem]) -> anyhow::Result<RunMethodResult> {
        let response: explorer::RunGetMethod = call(transport, Request::post("runGetMethod", json!({
            "address": address.to_friendly_string(),
            "method": name,
            "stack": encode_stack_typed(args),
            "seqno": seqno
        }))).await?;

        tokio::time::sleep(self.run_method_settle).await;
        let account = self.account(transport, seqno, address).await?;

        converter::explorer::run_method(response, account.block)
    }

    async fn send_message(&self, transport: &dyn Transport, boc: String) -> anyhow::Result<SendResult> {
        let _: Value = call(transport, Request::post("message", json!({"boc": boc}))).await?;

        Ok(converter::explorer::send())
    }
}
