pub mod address;
mod client;
pub mod codec;
mod config;
pub mod converter;
mod deserialize;
mod error;
pub mod family;
mod prefix;
mod request;
pub mod schema;
pub mod transport;
pub mod wire;

pub use crate::address::Address;
pub use crate::client::TonClient;
pub use crate::config::{ClientConfig, FamilyKind, Network};
pub use crate::error::{AdapterError, ErrorLayer, ErrorService};
pub use crate::prefix::{MethodPrefix, MethodPrefixLayer};
pub use crate::request::{Request, RpcBody};
pub use crate::transport::{Endpoint, HttpTransport, Transport};
