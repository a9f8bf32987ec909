use thiserror::Error as ThisError;
use tonx_adapter::schema::TupleItem;
use tonx_adapter::AdapterError;

#[derive(Debug, ThisError)]
pub enum TonContractError {
    #[error("contract failed with exit code: {0}")]
    Contract(i32),
    #[error("invalid output stack")]
    InvalidStack,
    #[error("base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("cannot parse number: {0}")]
    ParseNumber(String),
    #[error(transparent)]
    Client(#[from] AdapterError),
}

impl From<Vec<TupleItem>> for TonContractError {
    fn from(_: Vec<TupleItem>) -> Self {
        Self::InvalidStack
    }
}
