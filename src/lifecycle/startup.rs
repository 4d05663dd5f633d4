//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Build every component in dependency order, wiring them explicitly
//! - Purge a stale credential before anything can use it
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - One `reqwest::Client` shared by the probe and both request channels
//! - Monitoring is not started here; the caller decides when

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::client::{ApiClient, ClientDeps, LoadingHooks, RequestError};
use crate::clock::{Clock, SystemClock};
use crate::config::loader::ConfigError;
use crate::config::validation::validate_config;
use crate::config::ClientConfig;
use crate::credentials::{
    CredentialGuard, CredentialSlot, FileStore, KeyValueStore, MemoryStore, StartupPurge,
    StorageError,
};
use crate::health::{HealthMonitor, MonitorSettings};
use crate::resilience::{self, RequestOptions};
use crate::routing::{History, NavigationError, NavigationGuard, Navigator, RouteTable};
use crate::store::SessionStore;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid backend url '{url}': {source}")]
    BackendUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("credential storage: {0}")]
    Storage(#[from] StorageError),

    #[error("routing: {0}")]
    Routing(#[from] NavigationError),

    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Every runtime component, built once and shared.
#[derive(Debug)]
pub struct ClientContext {
    config: ClientConfig,
    credentials: CredentialGuard,
    monitor: HealthMonitor,
    routes: Arc<RouteTable>,
    history: Arc<History>,
    client: ApiClient,
    session: SessionStore,
    hooks: LoadingHooks,
    retry: RequestOptions,
    startup_purge: StartupPurge,
}

impl ClientContext {
    pub fn init(config: ClientConfig) -> Result<Self, StartupError> {
        Self::init_with(config, LoadingHooks::none(), Arc::new(SystemClock))
    }

    pub fn init_with_hooks(
        config: ClientConfig,
        hooks: LoadingHooks,
    ) -> Result<Self, StartupError> {
        Self::init_with(config, hooks, Arc::new(SystemClock))
    }

    pub fn init_with(
        config: ClientConfig,
        hooks: LoadingHooks,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StartupError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let url_error = |source: url::ParseError| StartupError::BackendUrl {
            url: config.backend.base_url.clone(),
            source,
        };
        let base_url = Url::parse(&config.backend.base_url).map_err(url_error)?;

        // 1. Credential storage, purged before first use
        let store: Arc<dyn KeyValueStore> = match &config.credentials.storage_path {
            Some(path) => Arc::new(FileStore::open(PathBuf::from(path))?),
            None => Arc::new(MemoryStore::new()),
        };
        let slot = CredentialSlot::new(store);
        let credentials = CredentialGuard::new(
            slot.clone(),
            clock.clone(),
            Duration::from_secs(config.credentials.expiry_buffer_secs),
        );
        let startup_purge = credentials.purge_expired_on_startup();
        tracing::info!(outcome = ?startup_purge, "Stored credential checked");

        // 2. Health monitor
        let http = reqwest::Client::builder().build()?;
        let settings =
            MonitorSettings::from_config(&config.health_check, &base_url).map_err(url_error)?;
        let monitor = HealthMonitor::new(settings, http.clone(), clock);

        // 3. Routing
        let routes = Arc::new(RouteTable::from_config(&config.routing)?);
        let guard = NavigationGuard::new(routes.clone(), credentials.clone());
        let history = Arc::new(History::new(guard));

        // 4. Request pipeline
        let navigator: Arc<dyn Navigator> = history.clone();
        let client = ApiClient::new(
            base_url.clone(),
            &config.timeouts,
            ClientDeps {
                http,
                monitor: monitor.clone(),
                credentials: slot,
                navigator,
                sign_in_path: routes.sign_in().path.clone(),
                hooks: hooks.clone(),
            },
        );

        let retry = RequestOptions::from(&config.retries);

        tracing::info!(
            base_url = %base_url,
            probe_url = %monitor.settings().probe_url,
            failure_threshold = monitor.settings().threshold,
            routes = routes.routes().len(),
            "Client context initialized"
        );

        Ok(Self {
            config,
            credentials,
            monitor,
            routes,
            history,
            client,
            session: SessionStore::new(),
            hooks,
            retry,
            startup_purge,
        })
    }

    /// Start background polling if enabled in configuration.
    pub fn start(&self) {
        if self.config.health_check.enabled {
            self.monitor.start_monitoring();
        } else {
            tracing::info!("Health polling disabled");
        }
    }

    pub fn shutdown(&self) {
        self.monitor.stop_monitoring();
    }

    /// Run `call` through the retry wrapper with the configured options.
    pub async fn make_request<T, F, Fut>(&self, call: F) -> Result<T, RequestError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RequestError>>,
    {
        resilience::make_request(&self.monitor, &self.hooks, &self.retry, call).await
    }

    /// Clear the session and the stored token, then go to sign-in.
    pub fn logout(&self) {
        self.session.logout(self.credentials.slot());
        self.history.replace(&self.routes.sign_in().path);
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialGuard {
        &self.credentials
    }

    pub fn monitor(&self) -> &HealthMonitor {
        &self.monitor
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn retry_options(&self) -> &RequestOptions {
        &self.retry
    }

    pub fn startup_purge(&self) -> StartupPurge {
        self.startup_purge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::credentials::token::encode_unsigned;
    use crate::credentials::CREDENTIAL_SLOT;

    const NOW_MS: u64 = 1_700_000_000_000;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("backend-gate-startup-{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_init_with_defaults() {
        let ctx = ClientContext::init(ClientConfig::default()).unwrap();
        assert_eq!(ctx.startup_purge(), StartupPurge::Empty);
        assert_eq!(ctx.monitor().settings().probe_url.as_str(), "http://localhost:3000/up");
        assert!(ctx.monitor().is_healthy());
        assert!(!ctx.monitor().is_monitoring());
        assert_eq!(ctx.routes().sign_in().path, "/login");
        assert_eq!(ctx.retry_options().retries, 1);
    }

    #[tokio::test]
    async fn test_init_rejects_invalid_config() {
        let mut config = ClientConfig::default();
        config.backend.base_url = "ftp://example.com".into();
        config.health_check.failure_threshold = 0;

        match ClientContext::init(config) {
            Err(StartupError::Config(ConfigError::Validation(errors))) => {
                assert_eq!(errors.len(), 2)
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_expired_token_purged_at_startup() {
        let path = temp_path();
        let expired = encode_unsigned(&serde_json::json!({ "exp": NOW_MS / 1000 - 60 }));
        std::fs::write(&path, serde_json::json!({ CREDENTIAL_SLOT: expired }).to_string()).unwrap();

        let mut config = ClientConfig::default();
        config.credentials.storage_path = Some(path.to_string_lossy().into_owned());
        let clock = Arc::new(ManualClock::new(NOW_MS));
        let ctx = ClientContext::init_with(config, LoadingHooks::none(), clock).unwrap();

        assert_eq!(ctx.startup_purge(), StartupPurge::Expired);
        assert!(ctx.credentials().slot().get().is_none());
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_logout_lands_on_sign_in() {
        let clock = Arc::new(ManualClock::new(NOW_MS));
        let ctx =
            ClientContext::init_with(ClientConfig::default(), LoadingHooks::none(), clock).unwrap();
        let token = encode_unsigned(&serde_json::json!({ "exp": NOW_MS / 1000 + 3600 }));
        ctx.credentials().slot().set(&token).unwrap();
        assert_eq!(ctx.history().navigate("/checklist").unwrap().path, "/checklist");

        ctx.logout();
        assert!(ctx.credentials().slot().get().is_none());
        assert_eq!(ctx.history().current().as_deref(), Some("/login"));
    }

    #[tokio::test]
    async fn test_start_respects_enabled_flag() {
        let mut config = ClientConfig::default();
        config.health_check.enabled = false;
        let ctx = ClientContext::init(config).unwrap();
        ctx.start();
        assert!(!ctx.monitor().is_monitoring());

        let ctx = ClientContext::init(ClientConfig::default()).unwrap();
        ctx.start();
        assert!(ctx.monitor().is_monitoring());
        ctx.shutdown();
        assert!(!ctx.monitor().is_monitoring());
    }
}
