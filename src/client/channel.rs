//! Request channels.
//!
//! Every call runs the same chain, in order:
//! ```text
//! admission-check (authenticated only)
//!     → credential-attach (authenticated only)
//!     → loading-show
//!     → dispatch (bounded by the request deadline)
//!     → classify-outcome → HealthMonitor / credential purge + redirect
//!     → loading-hide
//!     → return / reject
//! ```

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::client::error::RequestError;
use crate::client::loading::LoadingHooks;
use crate::client::request::{endpoint_url, ApiRequest};
use crate::credentials::CredentialSlot;
use crate::health::{HealthMonitor, HealthSignal};
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;
use crate::routing::Navigator;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Gated by the circuit breaker, carries the bearer credential.
    Authenticated,
    /// No gate, no credential.
    Plain,
}

impl ChannelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::Authenticated => "authenticated",
            ChannelKind::Plain => "plain",
        }
    }
}

/// What the authenticated channel does with credentials.
#[derive(Debug, Clone)]
pub(crate) struct AuthPolicy {
    pub(crate) credentials: CredentialSlot,
    pub(crate) navigator: Arc<dyn Navigator>,
    pub(crate) sign_in_path: String,
}

/// One request channel against the backend.
#[derive(Debug, Clone)]
pub struct Channel {
    kind: ChannelKind,
    http: reqwest::Client,
    base_url: Url,
    monitor: HealthMonitor,
    hooks: LoadingHooks,
    default_timeout: Duration,
    auth: Option<AuthPolicy>,
}

impl Channel {
    pub(crate) fn authenticated(
        http: reqwest::Client,
        base_url: Url,
        monitor: HealthMonitor,
        hooks: LoadingHooks,
        default_timeout: Duration,
        auth: AuthPolicy,
    ) -> Self {
        Self {
            kind: ChannelKind::Authenticated,
            http,
            base_url,
            monitor,
            hooks,
            default_timeout,
            auth: Some(auth),
        }
    }

    pub(crate) fn plain(
        http: reqwest::Client,
        base_url: Url,
        monitor: HealthMonitor,
        hooks: LoadingHooks,
        default_timeout: Duration,
    ) -> Self {
        Self {
            kind: ChannelKind::Plain,
            http,
            base_url,
            monitor,
            hooks,
            default_timeout,
            auth: None,
        }
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub async fn get(&self, path: &str) -> Result<Response, RequestError> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Response, RequestError> {
        self.send(ApiRequest::delete(path)).await
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, RequestError> {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, RequestError> {
        self.send(ApiRequest::put(path).json(body)?).await
    }

    pub async fn patch<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, RequestError> {
        self.send(ApiRequest::patch(path).json(body)?).await
    }

    /// GET and decode a JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        let response = self.get(path).await?;
        Ok(response.json::<T>().await?)
    }

    /// Run a request through the full chain.
    pub async fn send(&self, request: ApiRequest) -> Result<Response, RequestError> {
        let channel = self.kind.as_str();

        if self.kind == ChannelKind::Authenticated && !self.monitor.can_make_request() {
            metrics::record_admission_denied(channel);
            tracing::warn!(
                channel,
                method = %request.method,
                path = %request.path,
                "Request rejected: circuit open"
            );
            return Err(RequestError::ServiceUnavailable);
        }

        let request_id = Uuid::new_v4();
        let deadline = request.timeout.unwrap_or(self.default_timeout);
        let outbound = self.build(&request, request_id)?;

        let _loading = self.hooks.begin();
        let result = self.dispatch(outbound, deadline).await;

        match &result {
            Ok(_) => {
                self.monitor.observe(HealthSignal::Reachable);
                metrics::record_request(channel, "success");
            }
            Err(e) => {
                let class = e.failure_class();
                tracing::warn!(
                    channel,
                    request_id = %request_id,
                    method = %request.method,
                    path = %request.path,
                    class = class.as_str(),
                    error = %e,
                    "Request failed"
                );
                metrics::record_request(channel, class.as_str());
                self.monitor.observe(e.health_signal());

                if e.is_unauthorized() {
                    if let Some(auth) = &self.auth {
                        auth.credentials.purge("unauthorized");
                        auth.navigator.replace(&auth.sign_in_path);
                    }
                }
            }
        }

        result
    }

    fn build(
        &self,
        request: &ApiRequest,
        request_id: Uuid,
    ) -> Result<reqwest::Request, RequestError> {
        let url = endpoint_url(&self.base_url, &request.path).map_err(|e| {
            RequestError::InvalidRequest(format!("bad path '{}': {}", request.path, e))
        })?;

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header(CONTENT_TYPE, "application/json")
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        if let Some(auth) = &self.auth {
            builder = builder.header(ACCEPT, "application/json");
            if let Some(token) = auth.credentials.get() {
                builder = builder.bearer_auth(token);
            }
        }

        builder.build().map_err(|e| RequestError::InvalidRequest(e.to_string()))
    }

    async fn dispatch(
        &self,
        request: reqwest::Request,
        deadline: Duration,
    ) -> Result<Response, RequestError> {
        // The deadline covers reading an error body too.
        let exchange = async {
            let response = self.http.execute(request).await?;
            let status: StatusCode = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            Err::<Response, RequestError>(RequestError::Status { status, body })
        };

        match with_deadline(deadline, exchange).await {
            Err(RequestError::Transport(e)) if e.is_timeout() => {
                Err(RequestError::Timeout(deadline))
            }
            result => result,
        }
    }
}
