//! Application State - Stato globale dell'applicazione
//!
//! Holds the store shared by every controller. Repositories are not part of
//! the state: each request builds its own.

use crate::store::SqliteStore;

/// Stato globale dell'applicazione condiviso tra tutte le route
pub struct AppState {
    /// Store condiviso, clonato in ogni controller
    pub store: SqliteStore,
}

impl AppState {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }
}
