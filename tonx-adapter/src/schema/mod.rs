//! Canonical records handed to callers. Each type here is both the shape a
//! caller receives and the rule set it is checked against: nothing leaves the
//! client facade without passing [`Validate::validate`].

use std::fmt::{Display, Formatter};
use derive_new::new;
use crate::address::Address;
use crate::codec::{base64_to_byte_array, is_decimal};

mod account;
mod block;
mod config;
mod parsed;
mod transaction;
mod tvm;

pub use self::{account::*, block::*, config::*, parsed::*, transaction::*, tvm::*};

#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub reason: String
}

impl Violation {
    pub fn within(self, parent: impl Display) -> Self {
        let path = if self.path.starts_with('[') {
            format!("{}{}", parent, self.path)
        } else {
            format!("{}.{}", parent, self.path)
        };

        Self { path, reason: self.reason }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

impl std::error::Error for Violation {}

pub trait Validate {
    fn validate(&self) -> Result<(), Violation>;
}

impl<T> Validate for Vec<T> where T: Validate {
    fn validate(&self) -> Result<(), Violation> {
        for (i, item) in self.iter().enumerate() {
            item.validate().map_err(|v| v.within(format!("[{}]", i)))?;
        }

        Ok(())
    }
}

impl<T> Validate for Option<T> where T: Validate {
    fn validate(&self) -> Result<(), Violation> {
        match self {
            Some(v) => v.validate(),
            None => Ok(())
        }
    }
}

pub(crate) fn check_unsigned(path: &str, value: &str) -> Result<(), Violation> {
    if is_decimal(value) && !value.starts_with('-') {
        Ok(())
    } else {
        Err(Violation::new(path.to_owned(), format!("expected unsigned decimal string, got {:?}", value)))
    }
}

pub(crate) fn check_signed(path: &str, value: &str) -> Result<(), Violation> {
    if is_decimal(value) {
        Ok(())
    } else {
        Err(Violation::new(path.to_owned(), format!("expected decimal string, got {:?}", value)))
    }
}

pub(crate) fn check_shard(path: &str, value: &str) -> Result<(), Violation> {
    value.parse::<i64>()
        .map(|_| ())
        .map_err(|_| Violation::new(path.to_owned(), format!("expected signed 64-bit decimal shard, got {:?}", value)))
}

pub(crate) fn check_base64(path: &str, value: &str) -> Result<(), Violation> {
    base64_to_byte_array(value)
        .map(|_| ())
        .map_err(|e| Violation::new(path.to_owned(), e.to_string()))
}

pub(crate) fn check_address(path: &str, value: &str) -> Result<(), Violation> {
    value.parse::<Address>()
        .map(|_| ())
        .map_err(|e| Violation::new(path.to_owned(), e.to_string()))
}
