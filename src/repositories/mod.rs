//! Repositories module - Coordinatore per i repository generici
//!
//! A repository is created per request. It queues mutations in a
//! [`UnitOfWork`](crate::store::UnitOfWork) and makes them durable only when
//! [`Transactional::save_changes`] is called.

pub mod audited;
pub mod repository;
pub mod traits;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{
    AuditedWritable, Deletable, ReadRepository, Transactional, UpsertOutcome, Writable,
};

pub use audited::AuditedRepository;
pub use repository::Repository;

use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{resource} with id {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error(transparent)]
    Store(StoreError),
}

impl RepositoryError {
    /// `true` for uniqueness violations raised while committing
    pub fn is_conflict(&self) -> bool {
        matches!(self, RepositoryError::Store(StoreError::Conflict { .. }))
    }
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            // a missing row at commit is the same signal as a missing row at lookup
            StoreError::NotFound { resource, id } => RepositoryError::NotFound { resource, id },
            other => RepositoryError::Store(other),
        }
    }
}
