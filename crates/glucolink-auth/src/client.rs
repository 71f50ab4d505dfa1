//! HTTP client for the LibreLinkUp API.

use crate::observer::{FailureObserver, Swallowed, TracingObserver};
use crate::{AuthResult, EndpointResolver};
use glucolink_config_and_utils::Config;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// LibreLinkUp API client.
///
/// Holds no session state; every call takes the session it acts for.
#[derive(Clone)]
pub struct LinkUpClient {
    http_client: reqwest::Client,
    resolver: EndpointResolver,
    observer: Arc<dyn FailureObserver>,
}

impl LinkUpClient {
    /// Create a client that reports swallowed failures through `tracing`.
    pub fn new(resolver: EndpointResolver) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            resolver,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Create a client for the template configured in `config`.
    pub fn from_config(config: &Config) -> AuthResult<Self> {
        Ok(Self::new(EndpointResolver::new(config.api_url_template.clone())?))
    }

    /// Replace the sink for best-effort fetch failures.
    pub fn with_observer(mut self, observer: Arc<dyn FailureObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    pub(crate) fn report(&self, failure: Swallowed) {
        self.observer.on_swallowed(&failure);
    }

    /// GET `url` and parse the body as JSON regardless of HTTP status.
    pub(crate) async fn get_json(&self, url: &str, headers: HeaderMap) -> AuthResult<Value> {
        debug!(url = %url, "GET");
        let response = self.http_client.get(url).headers(headers).send().await?;
        Self::read_json(response).await
    }

    /// POST a JSON body to `url` and parse the reply as JSON regardless of HTTP status.
    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        headers: HeaderMap,
        body: &B,
    ) -> AuthResult<Value> {
        debug!(url = %url, "POST");
        let response = self
            .http_client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn read_json(response: reqwest::Response) -> AuthResult<Value> {
        let status = response.status();
        let body = response.text().await?;
        debug!(http_status = %status, body_len = body.len(), "Response received");
        Ok(serde_json::from_str(&body)?)
    }
}
