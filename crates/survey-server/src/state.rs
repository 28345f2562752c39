//! Application state
//!
//! Built once at startup from [`ServerConfig`] and cloned into every
//! handler. Store handles are trait objects so tests can swap in mocks.

use crate::config::{ServerConfig, StoreBackend};
use crate::error::StartupError;
use std::sync::Arc;
use survey_auth::{IdentityVerifier, SignedTokenVerifier};
use survey_core::{MemoryStore, ResponseStore, SurveyStore};
use survey_mongo::MongoStore;

/// Shared handles passed to every request
#[derive(Clone)]
pub struct AppState {
    pub surveys: Arc<dyn SurveyStore>,
    pub responses: Arc<dyn ResponseStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    #[must_use]
    pub fn new(
        surveys: Arc<dyn SurveyStore>,
        responses: Arc<dyn ResponseStore>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            surveys,
            responses,
            verifier,
        }
    }

    /// State over one shared in-memory store
    #[must_use]
    pub fn in_memory(store: Arc<MemoryStore>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self::new(store.clone(), store, verifier)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// Backend handle kept by the binary so it can be closed after shutdown
#[derive(Debug)]
pub enum StoreHandle {
    Memory(Arc<MemoryStore>),
    Mongo(Arc<MongoStore>),
}

impl StoreHandle {
    /// Release backend resources
    pub async fn close(&self) {
        match self {
            Self::Memory(_) => {}
            Self::Mongo(store) => store.close().await,
        }
    }
}

/// Build state and store handle from configuration
///
/// # Errors
/// Missing or invalid identity key, or a store that cannot be reached.
pub async fn build_state(config: &ServerConfig) -> Result<(AppState, StoreHandle), StartupError> {
    let verifier = SignedTokenVerifier::from_hex(config.require_identity_public_key()?)?
        .with_issuer(config.identity_issuer.clone())
        .with_leeway(config.token_leeway_secs);
    let verifier: Arc<dyn IdentityVerifier> = Arc::new(verifier);

    tracing::info!(backend = %config.store, "initializing store");
    Ok(match config.store {
        StoreBackend::Memory => {
            let store = Arc::new(MemoryStore::new());
            (
                AppState::in_memory(store.clone(), verifier),
                StoreHandle::Memory(store),
            )
        }
        StoreBackend::Mongo => {
            let store =
                Arc::new(MongoStore::connect(&config.mongodb_uri, &config.mongodb_db_name).await?);
            (
                AppState::new(store.clone(), store.clone(), verifier),
                StoreHandle::Mongo(store),
            )
        }
    })
}
