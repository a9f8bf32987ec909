use async_trait::async_trait;
use num_bigint::BigUint;

use crate::{ContractProvider, TonContractError, TupleItemExt};

#[async_trait]
pub trait WalletContract {
    async fn seqno(&self) -> Result<u32, TonContractError>;

    async fn public_key(&self) -> Result<BigUint, TonContractError>;
}

#[async_trait]
impl WalletContract for ContractProvider {
    async fn seqno(&self) -> Result<u32, TonContractError> {
        let [seqno] = self.get("seqno", [].into()).await?.try_into()?;
        seqno.to_number()
    }

    async fn public_key(&self) -> Result<BigUint, TonContractError> {
        let [key] = self.get("get_public_key", [].into()).await?.try_into()?;
        key.to_number()
    }
}
