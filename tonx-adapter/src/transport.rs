use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use anyhow::{anyhow, bail, Context as _};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::{BoxError, Service, ServiceBuilder, ServiceExt};
use tower::timeout::TimeoutLayer;
use url::Url;
use crate::config::{FamilyKind, Network};
use crate::error::{AdapterError, ErrorLayer};
use crate::prefix::MethodPrefixLayer;
use crate::request::Request;

/// Anything that turns a [`Request`] into the upstream JSON body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Value, AdapterError>;
}

#[async_trait]
impl<S> Transport for S
    where S: Service<Request, Response = Value, Error = AdapterError> + Clone + Send + Sync + 'static,
          S::Future: Send
{
    async fn send(&self, request: Request) -> Result<Value, AdapterError> {
        self.clone().oneshot(request).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// JSON-RPC and REST side endpoints, key carried in the url path.
    Gateway { base: Url, api_key: String },
    /// REST indexer, key carried in the `X-API-Key` header.
    Explorer { base: Url, api_key: Option<String> }
}

impl Endpoint {
    pub fn new(family: FamilyKind, network: Network, base: Option<Url>, api_key: String) -> anyhow::Result<Self> {
        Ok(match family {
            FamilyKind::Gateway => Endpoint::Gateway {
                base: match base {
                    Some(base) => base,
                    None => Url::parse(&format!("https://{}-rpc.tonxapi.com/", network.as_str()))?
                },
                api_key
            },
            FamilyKind::Explorer => Endpoint::Explorer {
                base: match base {
                    Some(base) => base,
                    None => Url::parse(match network {
                        Network::Mainnet => "https://toncenter.com/api/v3/",
                        Network::Testnet => "https://testnet.toncenter.com/api/v3/"
                    })?
                },
                api_key: Some(api_key).filter(|key| !key.is_empty())
            }
        })
    }

    pub fn rpc_url(&self) -> anyhow::Result<Url> {
        match self {
            Endpoint::Gateway { base, api_key } => Ok(base.join(&format!("v2/json-rpc/{}", api_key))?),
            Endpoint::Explorer { .. } => Err(anyhow!("explorer endpoints do not serve json-rpc"))
        }
    }

    pub fn rest_url(&self, path: &str) -> anyhow::Result<Url> {
        match self {
            Endpoint::Gateway { base, api_key } => Ok(base.join(&format!("v2/api/{}/{}", path, api_key))?),
            Endpoint::Explorer { base, .. } => Ok(base.join(path)?)
        }
    }

    fn header_key(&self) -> Option<&str> {
        match self {
            Endpoint::Gateway { .. } => None,
            Endpoint::Explorer { api_key, .. } => api_key.as_deref()
        }
    }
}

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Arc<Endpoint>
}

impl HttpTransport {
    pub fn new(endpoint: Endpoint) -> anyhow::Result<Self> {
        metrics::describe_counter!("tonx_upstream_requests_total", "Total count of requests sent upstream");

        let mut headers = HeaderMap::new();
        headers.insert("x-source", HeaderValue::from_static("tonx-adapter"));
        headers.insert("x-adapter-version", HeaderValue::from_static(env!("CARGO_PKG_VERSION")));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client, endpoint: Arc::new(endpoint) })
    }

    async fn execute(&self, request: Request) -> anyhow::Result<Value> {
        tracing::debug!(request = %request, "upstream call");
        metrics::counter!("tonx_upstream_requests_total", "kind" => request.kind().to_owned()).increment(1);

        let is_rpc = matches!(request, Request::Rpc(_));
        let builder = match &request {
            Request::Rpc(body) => self.client.post(self.endpoint.rpc_url()?).json(body),
            Request::Get { path, query } => self.client.get(self.endpoint.rest_url(path)?).query(query),
            Request::Post { path, body } => self.client.post(self.endpoint.rest_url(path)?).json(body)
        };
        let builder = match self.endpoint.header_key() {
            Some(key) => builder.header("X-API-Key", key),
            None => builder
        };

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();

            bail!("{} responded with {}: {}", request, status, text);
        }

        let body: Value = response.json().await
            .with_context(|| format!("{} returned a non json body", request))?;

        if is_rpc {
            if let Some(error) = body.get("error").filter(|e| e.is_object()) {
                bail!("{} failed: {}", request, error);
            }
        }

        Ok(body)
    }
}

impl Service<Request> for HttpTransport {
    type Response = Value;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let this = self.clone();

        Box::pin(async move {
            this.execute(req).await.map_err(Into::into)
        })
    }
}

/// The http stack: error mapping, optional method renaming and a per-call timeout.
pub fn http(endpoint: Endpoint, timeout: Duration, method_prefix: Option<String>) -> anyhow::Result<Arc<dyn Transport>> {
    let service = ServiceBuilder::new()
        .layer(ErrorLayer)
        .option_layer(method_prefix.map(MethodPrefixLayer::new))
        .layer(TimeoutLayer::new(timeout))
        .service(HttpTransport::new(endpoint)?);

    Ok(Arc::new(service))
}

/// Issues the requests one after another, waiting `delay` between calls.
/// The first failure stops the batch.
pub async fn send_sequential(transport: &dyn Transport, requests: Vec<Request>, delay: Duration) -> Result<Vec<Value>, AdapterError> {
    let mut responses = Vec::with_capacity(requests.len());
    for (i, request) in requests.into_iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        responses.push(transport.send(request).await?);
    }

    Ok(responses)
}

pub async fn call<T: DeserializeOwned>(transport: &dyn Transport, request: Request) -> anyhow::Result<T> {
    let kind = request.kind().to_owned();
    let response = transport.send(request).await?;

    serde_json::from_value(response).context(kind)
}
