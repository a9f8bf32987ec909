use std::task::{Context, Poll};
use derive_new::new;
use tower::{Layer, Service};
use crate::request::Request;

/// Renames outbound JSON-RPC methods for endpoints that namespace them,
/// `getMasterchainInfo` becomes `ton_getMasterchainInfo`. REST calls pass
/// through untouched.
#[derive(new, Debug, Clone)]
pub struct MethodPrefixLayer {
    prefix: String
}

impl<S> Layer<S> for MethodPrefixLayer {
    type Service = MethodPrefix<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MethodPrefix { inner, prefix: self.prefix.clone() }
    }
}

#[derive(Debug, Clone)]
pub struct MethodPrefix<S> {
    inner: S,
    prefix: String
}

impl<S> Service<Request> for MethodPrefix<S> where S: Service<Request> {
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let req = match req {
            Request::Rpc(mut body) => {
                if !body.method.starts_with(&self.prefix) {
                    body.method = format!("{}{}", self.prefix, body.method);
                }

                Request::Rpc(body)
            },
            req => req
        };

        self.inner.call(req)
    }
}
