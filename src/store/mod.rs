//! Store module - Confine verso il database
//!
//! A [`Store`] exposes untracked reads per entity type and a single atomic
//! `commit` that flushes a [`UnitOfWork`]. Repositories never write to the
//! store in any other way.

pub mod sqlite;
pub mod unit_of_work;

pub use sqlite::SqliteStore;
pub use unit_of_work::{Mutation, Pending, UnitOfWork};

use crate::entities::Entity;
use futures::stream::BoxStream;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict on {resource} with id {id}")]
    Conflict { resource: &'static str, id: String },

    #[error("{resource} with id {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("Identity space exhausted for {resource}")]
    IdentityExhausted { resource: &'static str },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// What a commit did, in queue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary<Id> {
    /// Identities of the inserted rows, including the ones assigned by the store
    pub created: Vec<Id>,
    pub updated: usize,
    pub removed: usize,
}

impl<Id> Default for CommitSummary<Id> {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            updated: 0,
            removed: 0,
        }
    }
}

/// Persistence boundary consumed by the repositories.
///
/// Implementations must apply a whole [`UnitOfWork`] atomically: either every
/// queued mutation becomes visible or none does.
pub trait Store: Clone + Send + Sync + 'static {
    /// Lazily streams every stored `E`, in insertion order
    fn stream_all<E: Entity>(&self) -> BoxStream<'_, Result<E, StoreError>>;

    /// Reads a single entity by identity
    fn fetch<E: Entity>(
        &self,
        id: &E::Id,
    ) -> impl Future<Output = Result<Option<E>, StoreError>> + Send;

    /// Reads every entity whose identity is in `ids` (missing ones are ignored)
    fn fetch_many<E: Entity>(
        &self,
        ids: &[E::Id],
    ) -> impl Future<Output = Result<Vec<E>, StoreError>> + Send;

    /// Applies the queued mutations inside one transaction
    fn commit<E: Entity>(
        &self,
        work: UnitOfWork<E>,
    ) -> impl Future<Output = Result<CommitSummary<E::Id>, StoreError>> + Send;
}
