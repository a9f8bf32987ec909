use core::{fmt::Display, str::FromStr};

use base64::{engine::general_purpose::STANDARD, Engine};
use num_bigint::BigInt;
use tonx_adapter::schema::TupleItem;

use crate::TonContractError;

pub trait TupleItemExt: Sized {
    /// Raw BoC bytes of a cell, slice or builder entry.
    fn to_boc(&self) -> Result<Vec<u8>, TonContractError>;

    fn from_boc(boc: &[u8]) -> Self;

    fn to_number<T>(&self) -> Result<T, TonContractError>
    where
        T: FromStr,
        T::Err: Display;

    fn from_number<T>(number: T) -> Self
    where
        T: Into<BigInt>;

    fn to_tuple(&self) -> Result<&[Self], TonContractError>;

    fn is_null(&self) -> bool;
}

impl TupleItemExt for TupleItem {
    fn to_boc(&self) -> Result<Vec<u8>, TonContractError> {
        let cell = match self {
            Self::Cell { cell } | Self::Slice { cell } | Self::Builder { cell } => cell,
            _ => return Err(TonContractError::InvalidStack),
        };

        STANDARD.decode(cell).map_err(Into::into)
    }

    fn from_boc(boc: &[u8]) -> Self {
        Self::Slice {
            cell: STANDARD.encode(boc),
        }
    }

    fn to_number<T>(&self) -> Result<T, TonContractError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let Self::Int { value } = self else {
            return Err(TonContractError::InvalidStack);
        };

        T::from_str(&value.to_string()).map_err(|err| TonContractError::ParseNumber(err.to_string()))
    }

    fn from_number<T>(number: T) -> Self
    where
        T: Into<BigInt>,
    {
        Self::Int {
            value: number.into(),
        }
    }

    fn to_tuple(&self) -> Result<&[Self], TonContractError> {
        match self {
            Self::Tuple { items } => Ok(items),
            _ => Err(TonContractError::InvalidStack),
        }
    }

    #[inline]
    fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}
