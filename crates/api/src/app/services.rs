//! Service wiring: every external client is built once here and handed to the
//! router explicitly; handlers never reach for globals.

use std::sync::Arc;

use itemvault_auth::{
    AllowlistGate, AllowlistSource, EnvAllowlist, Hs256IdentityProvider, IdentityProvider,
    IdentityResolver,
};
use itemvault_store::{DocumentStore, InMemoryDocumentStore, ItemRepository, StoreApiKeyDirectory, StoreError};

use crate::config::ApiConfig;

/// How session cookies are minted and labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub ttl: chrono::Duration,
    pub secure: bool,
}

#[derive(Clone)]
pub struct AppServices {
    pub resolver: IdentityResolver,
    pub gate: AllowlistGate,
    pub provider: Arc<dyn IdentityProvider>,
    pub api_keys: StoreApiKeyDirectory,
    pub items: ItemRepository,
    pub session: SessionSettings,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn IdentityProvider>,
        allowlist: Arc<dyn AllowlistSource>,
        session: SessionSettings,
    ) -> Self {
        let api_keys = StoreApiKeyDirectory::new(store.clone());
        Self {
            resolver: IdentityResolver::new(Arc::new(api_keys.clone()), provider.clone()),
            gate: AllowlistGate::new(allowlist),
            provider,
            api_keys,
            items: ItemRepository::new(store),
            session,
        }
    }
}

/// Build services from configuration (in-memory store, HS256 provider).
pub async fn build_services(config: &ApiConfig) -> Result<AppServices, StoreError> {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
    let provider = Arc::new(Hs256IdentityProvider::new(
        config.session_secret.as_bytes(),
        config.project_id.clone(),
    ));
    let allowlist = Arc::new(EnvAllowlist::new(config.allowlist_var.clone()));

    let services = AppServices::new(
        store,
        provider,
        allowlist,
        SessionSettings {
            ttl: config.session_ttl(),
            secure: config.secure_cookies,
        },
    );

    for (key, uid) in &config.dev_api_keys {
        services.api_keys.register(key, uid, "Dev Key").await?;
    }
    if !config.dev_api_keys.is_empty() {
        tracing::warn!(count = config.dev_api_keys.len(), "seeded dev API keys from DEV_API_KEYS");
    }

    Ok(services)
}
