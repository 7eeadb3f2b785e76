//! PackTrace API client
//!
//! Client SDK for the produce supply-chain tracking API (farm ->
//! packhouse): authentication and session handling, batch lifecycle
//! transitions, and crate reconciliation on arrival. The remote service
//! is the sole source of truth; this crate holds no durable state
//! beyond the locally persisted session.

pub mod config;
pub mod error;
pub mod http;
pub mod services;
pub mod session;

pub use config::Config;
pub use error::{ApiError, ApiResult, FieldError};
pub use http::ApiClient;
pub use services::{AuthService, BatchService, ReconciliationService};
pub use session::{FileSessionStore, MemorySessionStore, SessionManager, SessionStore};

use std::sync::Arc;

/// Entry point bundling the services over one shared transport
#[derive(Clone)]
pub struct PackTrace {
    auth: AuthService,
    batches: BatchService,
    reconciliation: ReconciliationService,
    sessions: SessionManager,
}

impl PackTrace {
    /// Build a client from configuration
    ///
    /// Sessions persist to `session.storage_path` when set, otherwise
    /// they live in memory for the life of the process.
    pub fn new(config: &Config) -> ApiResult<Self> {
        let store: Arc<dyn SessionStore> = match &config.session.storage_path {
            Some(path) => Arc::new(FileSessionStore::new(path)),
            None => Arc::new(MemorySessionStore::default()),
        };
        Self::with_store(config, store)
    }

    /// Build a client with an explicit session store
    pub fn with_store(config: &Config, store: Arc<dyn SessionStore>) -> ApiResult<Self> {
        let sessions = SessionManager::new(store)?;
        let api = ApiClient::new(config, sessions.clone())?;
        Ok(Self {
            auth: AuthService::new(api.clone()),
            batches: BatchService::new(api.clone()),
            reconciliation: ReconciliationService::new(api),
            sessions,
        })
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn batches(&self) -> &BatchService {
        &self.batches
    }

    pub fn reconciliation(&self) -> &ReconciliationService {
        &self.reconciliation
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }
}
