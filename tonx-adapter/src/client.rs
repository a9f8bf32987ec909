use std::sync::Arc;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::instrument;
use crate::address::Address;
use crate::config::{ClientConfig, FamilyKind};
use crate::converter::common::{account_changed, parse_transactions};
use crate::error::AdapterError;
use crate::family::{Explorer, Family, Gateway};
use crate::schema::{Account, AccountLite, AccountTransaction, Block, Changed, Config, LastBlock, LiteState, ParsedTransactions, RunMethodResult, SendResult, TupleItem, Validate};
use crate::transport;
use crate::transport::Transport;

/// Canonical surface over one provider family. Every record returned has
/// passed its schema; anything else is an [`AdapterError`].
#[derive(Clone)]
pub struct TonClient {
    family: Arc<dyn Family>,
    transport: Arc<dyn Transport>
}

fn malformed(operation: &'static str, reason: String) -> AdapterError {
    tracing::warn!(operation, reason = %reason, "malformed response");
    metrics::counter!("tonx_malformed_responses_total", "operation" => operation).increment(1);

    AdapterError::MalformedResponse(reason)
}

/// Classifies a family failure, then runs the schema over a success.
fn gate<T: Validate>(operation: &'static str, result: anyhow::Result<T>) -> Result<T, AdapterError> {
    let value = match result.map_err(AdapterError::classify) {
        Ok(value) => value,
        Err(AdapterError::MalformedResponse(reason)) => return Err(malformed(operation, reason)),
        Err(e) => return Err(e)
    };

    match value.validate() {
        Ok(()) => Ok(value),
        Err(violation) => Err(malformed(operation, violation.to_string()))
    }
}

impl TonClient {
    pub fn new(family: Arc<dyn Family>, transport: Arc<dyn Transport>) -> Self {
        metrics::describe_counter!("tonx_malformed_responses_total", "Total count of upstream responses rejected by the schema");

        Self { family, transport }
    }

    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        let transport = transport::http(config.endpoint()?, config.timeout(), config.method_prefix.clone())?;
        let family: Arc<dyn Family> = match config.family {
            FamilyKind::Gateway => Arc::new(Gateway::new(config.inter_call_delay(), config.run_method_settle())),
            FamilyKind::Explorer => Arc::new(Explorer::new(config.inter_call_delay(), config.run_method_settle()))
        };

        tracing::info!(family = family.name(), network = config.network.as_str(), "ton client");

        Ok(Self::new(family, transport))
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_config(&ClientConfig::from_env()?)
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    #[instrument(skip(self), err, level = "debug")]
    pub async fn get_last_block(&self) -> Result<LastBlock, AdapterError> {
        gate("getLastBlock", self.family.last_block(&*self.transport).await)
    }

    /// Fails with [`AdapterError::BlockOutOfScope`] when the provider does not
    /// know `seqno`, an empty shard set is never returned.
    #[instrument(skip(self), err, level = "debug")]
    pub async fn get_block(&self, seqno: u32) -> Result<Block, AdapterError> {
        gate("getBlock", self.family.block(&*self.transport, seqno).await)?
            .ok_or(AdapterError::BlockOutOfScope)
    }

    #[instrument(skip(self), err, level = "debug")]
    pub async fn get_block_by_utime(&self, utime: u32) -> Result<Block, AdapterError> {
        let seqno = self.family.seqno_by_utime(&*self.transport, utime).await
            .map_err(AdapterError::classify)?
            .ok_or(AdapterError::BlockOutOfScope)?;

        self.get_block(seqno).await
    }

    #[instrument(skip(self), err, level = "debug")]
    pub async fn get_account(&self, seqno: u32, address: &Address) -> Result<Account, AdapterError> {
        gate("getAccount", self.family.account(&*self.transport, seqno, address).await)
    }

    #[instrument(skip(self), err, level = "debug")]
    pub async fn get_account_lite(&self, seqno: u32, address: &Address) -> Result<AccountLite, AdapterError> {
        gate("getAccountLite", self.family.account_lite(&*self.transport, seqno, address).await)
    }

    pub async fn is_contract_deployed(&self, seqno: u32, address: &Address) -> Result<bool, AdapterError> {
        let lite = self.get_account_lite(seqno, address).await?;

        Ok(matches!(lite.account.state, LiteState::Active { .. }))
    }

    /// Changed when the account's last transaction lt differs from `lt`.
    #[instrument(skip(self), err, level = "debug")]
    pub async fn is_account_changed(&self, seqno: u32, address: &Address, lt: u64) -> Result<Changed, AdapterError> {
        let account = self.get_account(seqno, address).await?;

        gate("isAccountChanged", Ok(account_changed(account, &lt.to_string())))
    }

    /// One page of history, newest first, starting at `(lt, hash)`.
    #[instrument(skip(self), err, level = "debug")]
    pub async fn get_account_transactions(&self, address: &Address, lt: u64, hash: &str, limit: Option<usize>) -> Result<Vec<AccountTransaction>, AdapterError> {
        gate("getAccountTransactions", self.family.transactions(&*self.transport, address, lt, hash, limit).await)
    }

    #[instrument(skip(self), err, level = "debug")]
    pub async fn get_account_transactions_parsed(&self, address: &Address, lt: u64, hash: &str, count: Option<usize>) -> Result<ParsedTransactions, AdapterError> {
        let page = self.get_account_transactions(address, lt, hash, count).await?;

        gate("getAccountTransactionsParsed", parse_transactions(&page))
    }

    /// Only the first of `ids` reaches the provider.
    #[instrument(skip(self), err, level = "debug")]
    pub async fn get_config(&self, seqno: u32, ids: &[i32]) -> Result<Config, AdapterError> {
        gate("getConfig", self.family.config(&*self.transport, seqno, ids.first().copied()).await)
    }

    /// Exit codes other than 0 and 1 come back as data.
    #[instrument(skip(self, args), err, level = "debug")]
    pub async fn run_method(&self, seqno: u32, address: &Address, name: &str, args: &[TupleItem]) -> Result<RunMethodResult, AdapterError> {
        gate("runMethod", self.family.run_method(&*self.transport, seqno, address, name, args).await)
    }

    #[instrument(skip_all, err, level = "debug")]
    pub async fn send_message(&self, boc: &[u8]) -> Result<SendResult, AdapterError> {
        gate("sendMessage", self.family.send_message(&*self.transport, STANDARD.encode(boc)).await)
    }
}
