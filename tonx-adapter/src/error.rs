use std::task::{Context, Poll};
use anyhow::anyhow;
use derive_new::new;
use futures::future::MapErr;
use futures::TryFutureExt;
use thiserror::Error;
use tower::{BoxError, Layer, Service};
use crate::codec::CodecError;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("block is out of scope")]
    BlockOutOfScope,
    #[error("invalid address format: {0}")]
    InvalidAddressFormat(String),
    #[error("upstream transport failure: {0:#}")]
    UpstreamTransportFailure(anyhow::Error),
    #[error("{0} is not served by this provider family")]
    Unsupported(&'static str),
}

impl AdapterError {
    /// Turns whatever a family or converter raised into the public taxonomy.
    pub(crate) fn classify(error: anyhow::Error) -> Self {
        let error = match error.downcast::<AdapterError>() {
            Ok(error) => return error,
            Err(error) => error
        };

        if let Some(CodecError::InvalidAddressFormat(address)) = error.downcast_ref::<CodecError>() {
            return Self::InvalidAddressFormat(address.clone());
        }

        Self::MalformedResponse(format!("{:#}", error))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::UpstreamTransportFailure(_))
    }
}

fn into_adapter_error(error: BoxError) -> AdapterError {
    match error.downcast::<AdapterError>() {
        Ok(error) => *error,
        Err(error) => AdapterError::UpstreamTransportFailure(anyhow!(error))
    }
}

#[derive(Default)]
pub struct ErrorLayer;

impl<S> Layer<S> for ErrorLayer {
    type Service = ErrorService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ErrorService::new(inner)
    }
}

#[derive(new, Clone)]
pub struct ErrorService<S> { inner: S }

impl<S, Req> Service<Req> for ErrorService<S> where
    S : Service<Req, Error = BoxError>
{
    type Response = S::Response;
    type Error = AdapterError;
    type Future = MapErr<S::Future, fn(S::Error) -> Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(into_adapter_error)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        self.inner.call(req).map_err(into_adapter_error as fn(BoxError) -> AdapterError)
    }
}
