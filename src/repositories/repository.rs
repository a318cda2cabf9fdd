//! Repository - Repository generico con unit of work

use super::{Deletable, ReadRepository, RepositoryError, Transactional, UpsertOutcome, Writable};
use crate::core::RequestContext;
use crate::entities::{Entity, EntityId};
use crate::store::{CommitSummary, Pending, Store, UnitOfWork};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use tracing::{debug, info, instrument, warn};

/// Generic repository over a [`Store`].
///
/// Writes are queued in the repository's own unit of work; nothing reaches
/// the store until [`Transactional::save_changes`]. A repository dropped with
/// queued changes discards them.
pub struct Repository<E: Entity, S: Store> {
    store: S,
    work: UnitOfWork<E>,
    context: RequestContext,
}

impl<E: Entity, S: Store> Repository<E, S> {
    pub fn new(store: S, context: RequestContext) -> Self {
        Self {
            store,
            work: UnitOfWork::begin(),
            context,
        }
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Current version of `id`: the latest queued mutation wins over the store
    pub(crate) async fn find_current(&self, id: &E::Id) -> Result<Option<E>, RepositoryError> {
        if id.is_unassigned() {
            return Ok(None);
        }

        match self.work.pending(id) {
            Pending::Present(entity) => Ok(Some(entity.clone())),
            Pending::Removed => Ok(None),
            Pending::Untouched => Ok(self.store.fetch::<E>(id).await?),
        }
    }

    pub(crate) fn queue_insert(&mut self, entity: E) {
        self.work.add(entity);
    }

    pub(crate) fn queue_update(&mut self, id: E::Id, entity: E) {
        self.work.update(id, entity);
    }

    pub(crate) fn not_found(id: &E::Id) -> RepositoryError {
        RepositoryError::NotFound {
            resource: E::RESOURCE,
            id: id.to_key(),
        }
    }
}

impl<E: Entity, S: Store> Drop for Repository<E, S> {
    fn drop(&mut self) {
        if !self.work.is_empty() {
            debug!(
                correlation_id = %self.context.correlation_id(),
                "Discarding {} uncommitted changes on {}",
                self.work.len(),
                E::RESOURCE
            );
        }
    }
}

impl<E: Entity, S: Store> ReadRepository<E> for Repository<E, S> {
    fn get_all(&self) -> BoxStream<'_, Result<E, RepositoryError>> {
        debug!(correlation_id = %self.context.correlation_id(), "Getting all {}", E::RESOURCE);
        self.store
            .stream_all::<E>()
            .map_err(RepositoryError::from)
            .boxed()
    }

    #[instrument(skip(self), fields(resource = E::RESOURCE, correlation_id = %self.context.correlation_id(), id = %id))]
    async fn get(&self, id: &E::Id) -> Result<Option<E>, RepositoryError> {
        if id.is_unassigned() {
            warn!("Get called with an unassigned identity");
            return Err(RepositoryError::InvalidArgument(format!(
                "{} id must be assigned",
                E::RESOURCE
            )));
        }

        let entity = self.store.fetch::<E>(id).await?;
        if entity.is_some() {
            debug!("Entity found");
        } else {
            debug!("Entity not found");
        }
        Ok(entity)
    }

    #[instrument(skip(self, ids), fields(resource = E::RESOURCE, correlation_id = %self.context.correlation_id(), count = ids.len()))]
    async fn get_range(&self, ids: &[E::Id]) -> Result<Vec<E>, RepositoryError> {
        let entities = self.store.fetch_many::<E>(ids).await?;
        debug!("Found {} entities", entities.len());
        Ok(entities)
    }
}

impl<E: Entity, S: Store> Writable<E> for Repository<E, S> {
    #[instrument(skip_all, fields(resource = E::RESOURCE, correlation_id = %self.context.correlation_id()))]
    fn create(&mut self, entity: E) {
        debug!("Queuing insertion");
        self.queue_insert(entity);
    }

    #[instrument(skip_all, fields(resource = E::RESOURCE, correlation_id = %self.context.correlation_id(), count = entities.len()))]
    fn create_range(&mut self, entities: Vec<E>) {
        debug!("Queuing insertions");
        for entity in entities {
            self.queue_insert(entity);
        }
    }

    #[instrument(skip(self, entity), fields(resource = E::RESOURCE, correlation_id = %self.context.correlation_id(), id = %id))]
    async fn update(&mut self, id: E::Id, entity: E) -> Result<(), RepositoryError> {
        if self.find_current(&id).await?.is_none() {
            warn!("Update target not found");
            return Err(Self::not_found(&id));
        }

        debug!("Queuing update");
        self.queue_update(id, entity);
        Ok(())
    }

    #[instrument(skip(self, entity), fields(resource = E::RESOURCE, correlation_id = %self.context.correlation_id(), id = %entity.id()))]
    async fn update_or_create(
        &mut self,
        entity: E,
        create_if_not_exists: bool,
    ) -> Result<UpsertOutcome, RepositoryError> {
        let id = entity.id().clone();
        let exists = self.find_current(&id).await?.is_some();

        let outcome = match (exists, create_if_not_exists) {
            (true, _) => {
                self.queue_update(id, entity);
                UpsertOutcome::Updated
            }
            (false, true) => {
                self.queue_insert(entity);
                UpsertOutcome::Created
            }
            (false, false) => UpsertOutcome::Skipped,
        };

        debug!("Upsert resolved as {:?}", outcome);
        Ok(outcome)
    }

    #[instrument(skip(self, entities), fields(resource = E::RESOURCE, correlation_id = %self.context.correlation_id(), count = entities.len()))]
    async fn update_range(
        &mut self,
        entities: Vec<E>,
        create_if_not_exists: bool,
    ) -> Result<Vec<UpsertOutcome>, RepositoryError> {
        // each entity is resolved on its own, there is no all-or-nothing across the batch
        let mut outcomes = Vec::with_capacity(entities.len());
        for entity in entities {
            outcomes.push(self.update_or_create(entity, create_if_not_exists).await?);
        }

        info!(
            "Range upsert: {} updated, {} created, {} skipped",
            outcomes.iter().filter(|o| **o == UpsertOutcome::Updated).count(),
            outcomes.iter().filter(|o| **o == UpsertOutcome::Created).count(),
            outcomes.iter().filter(|o| **o == UpsertOutcome::Skipped).count()
        );
        Ok(outcomes)
    }
}

impl<E: Entity, S: Store> Deletable<E> for Repository<E, S> {
    #[instrument(skip(self), fields(resource = E::RESOURCE, correlation_id = %self.context.correlation_id(), id = %id))]
    fn delete(&mut self, id: E::Id) -> Result<(), RepositoryError> {
        if id.is_unassigned() {
            warn!("Delete called with an unassigned identity");
            return Err(RepositoryError::InvalidArgument(format!(
                "{} id must be assigned",
                E::RESOURCE
            )));
        }

        debug!("Queuing removal");
        self.work.remove(id);
        Ok(())
    }

    #[instrument(skip_all, fields(resource = E::RESOURCE, correlation_id = %self.context.correlation_id(), count = ids.len()))]
    fn delete_range(&mut self, ids: Vec<E::Id>) {
        debug!("Queuing removals");
        for id in ids {
            self.work.remove_if_present(id);
        }
    }
}

impl<E: Entity, S: Store> Transactional<E> for Repository<E, S> {
    fn pending_changes(&self) -> usize {
        self.work.len()
    }

    #[instrument(skip(self), fields(resource = E::RESOURCE, correlation_id = %self.context.correlation_id()))]
    async fn save_changes(&mut self) -> Result<CommitSummary<E::Id>, RepositoryError> {
        let work = std::mem::take(&mut self.work);
        debug!("Saving {} changes", work.len());
        Ok(self.store.commit(work).await?)
    }
}
