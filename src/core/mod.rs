//! Core Module - Componenti infrastrutturali dell'applicazione
//!
//! Questo modulo contiene tutti i componenti "core" dell'applicazione:
//! - Configurazione
//! - Gestione errori HTTP
//! - Stato applicazione
//! - Contesto per-richiesta

pub mod config;
pub mod context;
pub mod error;
pub mod state;

// Re-exports per facilitare l'import
pub use config::Config;
pub use context::RequestContext;
pub use error::AppError;
pub use state::AppState;
