//! One pure function per upstream shape. Converters never validate and never
//! recover: a failed coercion is returned as is and classified by the client.

pub mod common;
pub mod explorer;
pub mod gateway;
