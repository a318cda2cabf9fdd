//! Common repository traits
//!
//! This module defines generic interfaces for the repository capabilities.
//! Every capability is a separate trait, so a repository type only exposes
//! the operations it actually supports.

use super::RepositoryError;
use crate::entities::{AuditedEntity, Entity};
use crate::store::CommitSummary;
use futures::stream::BoxStream;

/// Result of a single upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A matching entity existed and was overwritten
    Updated,
    /// No match existed and the entity was queued for insertion
    Created,
    /// No match existed and creation was not requested
    Skipped,
}

/// Trait for reading entities, bypassing the pending unit of work
///
/// # Type Parameters
/// * `E` - Type of the entity to read
pub trait ReadRepository<E: Entity>: Send + Sync {
    /// Streams all entities currently stored
    ///
    /// # Returns
    /// A lazy stream; nothing is read until it is polled, and queued
    /// mutations of this repository are not visible in it.
    fn get_all(&self) -> BoxStream<'_, Result<E, RepositoryError>>;

    /// Reads an entity by its identity
    ///
    /// # Arguments
    /// * `id` - Identity of the entity to read
    ///
    /// # Returns
    /// * `Ok(Some(E))` - Entity found
    /// * `Ok(None)` - No entity with that identity
    /// * `Err(RepositoryError::InvalidArgument)` - `id` is the unassigned sentinel
    fn get(&self, id: &E::Id) -> impl Future<Output = Result<Option<E>, RepositoryError>> + Send;

    /// Reads multiple entities by list of identities
    ///
    /// # Arguments
    /// * `ids` - Slice of identities of the entities to read
    ///
    /// # Returns
    /// * `Ok(Vec<E>)` - Vec containing all found entities (can be empty)
    ///
    /// # Note
    /// Entities are returned in store order, which may not match the order of
    /// the provided identities.
    fn get_range(&self, ids: &[E::Id])
    -> impl Future<Output = Result<Vec<E>, RepositoryError>> + Send;
}

/// Trait for queuing unaudited writes
///
/// # Type Parameters
/// * `E` - Type of the written entity
pub trait Writable<E: Entity>: Send {
    /// Queues the insertion of `entity`
    ///
    /// The identity is not checked here: a duplicate identity surfaces as a
    /// conflict when the changes are saved.
    fn create(&mut self, entity: E);

    /// Queues the insertion of every entity in `entities`
    fn create_range(&mut self, entities: Vec<E>);

    /// Overwrites the entity identified by `id` with `entity` (identity included)
    ///
    /// # Returns
    /// * `Ok(())` - Update queued
    /// * `Err(RepositoryError::NotFound)` - No entity with that identity
    fn update(
        &mut self,
        id: E::Id,
        entity: E,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Upsert by `entity`'s own identity
    ///
    /// # Arguments
    /// * `entity` - New field values
    /// * `create_if_not_exists` - Queue an insertion when no match exists
    ///
    /// # Returns
    /// * `Ok(UpsertOutcome)` - How the identity was resolved; a miss without
    ///   `create_if_not_exists` is [`UpsertOutcome::Skipped`], not an error
    fn update_or_create(
        &mut self,
        entity: E,
        create_if_not_exists: bool,
    ) -> impl Future<Output = Result<UpsertOutcome, RepositoryError>> + Send;

    /// Applies [`Writable::update_or_create`] to each entity independently
    ///
    /// # Returns
    /// * `Ok(Vec<UpsertOutcome>)` - One outcome per entity, in input order
    fn update_range(
        &mut self,
        entities: Vec<E>,
        create_if_not_exists: bool,
    ) -> impl Future<Output = Result<Vec<UpsertOutcome>, RepositoryError>> + Send;
}

/// Trait for queuing audited writes
///
/// # Type Parameters
/// * `E` - Type of the written entity, carrying an audit stamp
pub trait AuditedWritable<E: AuditedEntity>: Send {
    /// Stamps `created_by`/`created_at` and queues the insertion
    fn create(&mut self, entity: E, actor: E::Actor);

    /// Stamps every entity as created by `actor` and queues the insertions
    fn create_range(&mut self, entities: Vec<E>, actor: E::Actor);

    /// Stamps `updated_by`/`updated_at` and overwrites the entity identified by `id`
    ///
    /// The creation stamp of the existing entity is preserved.
    ///
    /// # Returns
    /// * `Ok(())` - Update queued
    /// * `Err(RepositoryError::NotFound)` - No entity with that identity
    fn update(
        &mut self,
        id: E::Id,
        entity: E,
        actor: E::Actor,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Trait for queuing deletions
///
/// # Type Parameters
/// * `E` - Type of the deleted entity
pub trait Deletable<E: Entity>: Send {
    /// Queues the removal of the entity identified by `id`
    ///
    /// Existence is not checked here: a missing entity fails the commit with
    /// [`RepositoryError::NotFound`].
    fn delete(&mut self, id: E::Id) -> Result<(), RepositoryError>;

    /// Queues the removal of every identity in `ids`; missing ones are skipped at commit
    fn delete_range(&mut self, ids: Vec<E::Id>);
}

/// Trait for flushing the unit of work
pub trait Transactional<E: Entity>: Send {
    /// Number of queued, not yet saved mutations
    fn pending_changes(&self) -> usize;

    /// Commits every queued mutation as one atomic operation
    ///
    /// # Returns
    /// * `Ok(CommitSummary)` - Everything was persisted
    /// * `Err(RepositoryError)` - Nothing was persisted; the queue is discarded
    fn save_changes(
        &mut self,
    ) -> impl Future<Output = Result<CommitSummary<E::Id>, RepositoryError>> + Send;
}
