pub mod access;
pub mod config;
pub mod editor;
pub mod handlers;
pub mod languages;
pub mod middleware;
pub mod models;
pub mod presentation;
pub mod routes;
pub mod runner;
pub mod store;

use std::sync::Arc;

use config::IdentityConfig;
use store::Repository;

/// Shared by every worker of the HTTP server.
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub identity: IdentityConfig,
    /// Bearer secret of the billing provider; the upgrade endpoint is off without it.
    pub billing_secret: Option<String>,
}

impl AppState {
    pub fn repo(&self) -> &dyn Repository {
        self.repo.as_ref()
    }
}
