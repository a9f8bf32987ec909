use std::fmt::{Display, Formatter};
use derive_new::new;
use serde::Serialize;
use serde_json::Value;

/// JSON-RPC 2.0 call body. The id is fixed: every call is independent.
#[derive(new, Debug, Serialize, Clone, PartialEq)]
pub struct RpcBody {
    #[new(value = "0")]
    pub id: u64,
    #[new(value = "\"2.0\"")]
    pub jsonrpc: &'static str,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Rpc(RpcBody),
    Get {
        path: String,
        query: Vec<(String, String)>
    },
    Post {
        path: String,
        body: Value
    }
}

impl Request {
    pub fn rpc(method: impl Into<String>, params: Option<Value>) -> Self {
        Request::Rpc(RpcBody::new(method.into(), params))
    }

    pub fn get<K: Display, V: Display>(path: impl Into<String>, query: impl IntoIterator<Item = (K, V)>) -> Self {
        Request::Get {
            path: path.into(),
            query: query.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Request::Post { path: path.into(), body }
    }

    /// Label used for logs and metrics: rpc method or rest path.
    pub fn kind(&self) -> &str {
        match self {
            Request::Rpc(body) => &body.method,
            Request::Get { path, .. } | Request::Post { path, .. } => path
        }
    }
}

impl Display for Request {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::Rpc(body) => write!(f, "rpc {}", body.method),
            Request::Get { path, .. } => write!(f, "GET {}", path),
            Request::Post { path, .. } => write!(f, "POST {}", path)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::request::Request;

    #[test]
    fn rpc_body_shape() {
        let Request::Rpc(body) = Request::rpc("getMasterchainInfo", None) else {
            panic!("expected rpc");
        };

        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"id": 0, "jsonrpc": "2.0", "method": "getMasterchainInfo"}));

        let Request::Rpc(body) = Request::rpc("sendMessage", Some(json!({"boc": "te6c"}))) else {
            panic!("expected rpc");
        };

        assert_eq!(serde_json::to_value(&body).unwrap()["params"], json!({"boc": "te6c"}));
    }

    #[test]
    fn get_query_is_stringified() {
        let request = Request::get("shards", [("seqno", 42)]);

        assert_eq!(request, Request::Get { path: "shards".to_owned(), query: vec![("seqno".to_owned(), "42".to_owned())] });
        assert_eq!(request.kind(), "shards");
        assert_eq!(request.to_string(), "GET shards");
    }
}
