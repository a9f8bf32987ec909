use base64::{engine::general_purpose::STANDARD, Engine};
use num_bigint::BigUint;
use tonx_adapter::codec::base64_to_byte_array;
use tonx_adapter::schema::{check_chain, AccountState, AccountTransaction, SendResult, Transaction, TupleItem};
use tonx_adapter::{AdapterError, Address, TonClient};

use crate::TonContractError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageState {
    Uninit,
    Active {
        code: Option<Vec<u8>>,
        data: Option<Vec<u8>>,
    },
    Frozen {
        state_hash: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastTransactionId {
    pub lt: u64,
    pub hash: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractState {
    pub balance: BigUint,
    pub last: Option<LastTransactionId>,
    pub state: StorageState,
}

/// Contract view over one address, pinned to a masterchain seqno or
/// following the last block.
#[derive(Clone)]
pub struct ContractProvider {
    client: TonClient,
    address: Address,
    block: Option<u32>,
}

fn decode(value: &str) -> Result<Vec<u8>, TonContractError> {
    STANDARD.decode(value).map_err(Into::into)
}

fn parse_number<T: core::str::FromStr>(value: &str) -> Result<T, TonContractError> {
    value
        .parse()
        .map_err(|_| TonContractError::ParseNumber(value.to_owned()))
}

impl ContractProvider {
    pub fn new(client: TonClient, address: Address) -> Self {
        Self {
            client,
            address,
            block: None,
        }
    }

    pub fn at(client: TonClient, block: u32, address: Address) -> Self {
        Self {
            client,
            address,
            block: Some(block),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn client(&self) -> TonClient {
        self.client.clone()
    }

    async fn seqno(&self) -> Result<u32, AdapterError> {
        match self.block {
            Some(seqno) => Ok(seqno),
            None => Ok(self.client.get_last_block().await?.last.seqno),
        }
    }

    pub async fn get_state(&self) -> Result<ContractState, TonContractError> {
        let seqno = self.seqno().await?;
        let account = self.client.get_account(seqno, &self.address).await?.account;

        let last = match account.last {
            Some(last) => Some(LastTransactionId {
                lt: parse_number(&last.lt)?,
                hash: decode(&last.hash)?,
            }),
            None => None,
        };

        let state = match account.state {
            AccountState::Uninit => StorageState::Uninit,
            AccountState::Active { code, data } => StorageState::Active {
                code: code.as_deref().map(decode).transpose()?,
                data: data.as_deref().map(decode).transpose()?,
            },
            AccountState::Frozen { state_hash } => StorageState::Frozen {
                state_hash: decode(&state_hash)?,
            },
        };

        Ok(ContractState {
            balance: parse_number(&account.balance.coins)?,
            last,
            state,
        })
    }

    /// Runs a get method; exit codes other than 0 and 1 are errors here.
    pub async fn get(
        &self,
        method: impl AsRef<str>,
        stack: Vec<TupleItem>,
    ) -> Result<Vec<TupleItem>, TonContractError> {
        let seqno = self.seqno().await?;
        let result = self
            .client
            .run_method(seqno, &self.address, method.as_ref(), &stack)
            .await?;

        Ok(match result.exit_code {
            0 | 1 => result.result,
            exit_code => return Err(TonContractError::Contract(exit_code)),
        })
    }

    /// Walks history backwards from `(lt, hash)`, newest first.
    ///
    /// Pages overlap on their anchor, so a repeated leading entry is dropped.
    /// A page ending on the anchor itself means there is nothing older.
    pub async fn get_transactions(
        &self,
        lt: u64,
        hash: &[u8],
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>, TonContractError> {
        if limit == Some(0) {
            return Ok(Vec::new());
        }

        let (mut lt, mut hash) = (lt, hash.to_vec());
        let mut transactions: Vec<AccountTransaction> = Vec::new();
        loop {
            let mut page = self
                .client
                .get_account_transactions(&self.address, lt, &STANDARD.encode(&hash), None)
                .await?;

            let is_anchor = |tx: &Transaction| tx.has_id(lt, &hash);

            if !transactions.is_empty() && page.first().is_some_and(|first| is_anchor(&first.tx)) {
                page.remove(0);
            }

            let Some(last) = page.last() else {
                break;
            };
            if is_anchor(&last.tx) {
                break;
            }

            let next_hash = base64_to_byte_array(&last.tx.hash)
                .map_err(|e| AdapterError::MalformedResponse(e.to_string()))?;
            let next = (last.tx.lt, next_hash);
            transactions.extend(page);
            (lt, hash) = next;

            tracing::debug!(count = transactions.len(), lt, "paginated transactions");

            if limit.is_some_and(|limit| transactions.len() >= limit) {
                break;
            }
        }

        check_chain(&transactions)
            .map_err(|violation| AdapterError::MalformedResponse(violation.to_string()))?;

        let mut transactions: Vec<Transaction> = transactions.into_iter().map(|item| item.tx).collect();
        if let Some(limit) = limit {
            transactions.truncate(limit);
        }

        Ok(transactions)
    }

    /// Sends an external message. `build` learns whether the account still
    /// needs its state init attached and returns the serialized message.
    pub async fn external(
        &self,
        build: impl FnOnce(bool) -> Vec<u8>,
    ) -> Result<SendResult, TonContractError> {
        let last = self.client.get_last_block().await?;
        let account = self
            .client
            .get_account(last.last.seqno, &self.address)
            .await?;

        let message = build(!account.account.state.is_active());

        Ok(self.client.send_message(&message).await?)
    }

    pub async fn is_deployed(&self) -> Result<bool, TonContractError> {
        let seqno = self.seqno().await?;

        Ok(self.client.is_contract_deployed(seqno, &self.address).await?)
    }
}
