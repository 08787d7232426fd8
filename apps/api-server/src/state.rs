//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::AccountService;
use quill_core::ports::PasswordService;
use quill_infra::{Argon2PasswordService, DatabaseConfig, InMemoryRepository};

#[cfg(feature = "postgres")]
use quill_infra::database::{
    PostgresFavoriteRepository, PostgresPostRepository, PostgresUserRepository, connect,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    /// Name of the backing store, reported by the health check.
    pub storage: &'static str,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        #[cfg(feature = "postgres")]
        let state = match db_config {
            Some(config) => match connect(config).await {
                Ok(conn) => Self {
                    accounts: Arc::new(AccountService::new(
                        Arc::new(PostgresUserRepository::new(conn.clone())),
                        Arc::new(PostgresPostRepository::new(conn.clone())),
                        Arc::new(PostgresFavoriteRepository::new(conn)),
                        passwords,
                    )),
                    storage: "postgres",
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory(InMemoryRepository::new(), passwords)
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory(InMemoryRepository::new(), passwords)
            }
        };

        #[cfg(not(feature = "postgres"))]
        let state = {
            let _ = db_config;
            tracing::info!("Running without postgres feature - using in-memory repository");
            Self::in_memory(InMemoryRepository::new(), passwords)
        };

        tracing::info!(storage = state.storage, "Application state initialized");
        state
    }

    /// State backed by an in-memory store.
    pub fn in_memory(store: InMemoryRepository, passwords: Arc<dyn PasswordService>) -> Self {
        let store = Arc::new(store);

        Self {
            accounts: Arc::new(AccountService::new(
                store.clone(),
                store.clone(),
                store,
                passwords,
            )),
            storage: "memory",
        }
    }
}
