mod adapters;
mod contract;
mod error;

pub use self::{adapters::*, contract::*, error::*};

pub mod wallet;
