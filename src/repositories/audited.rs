//! AuditedRepository - Repository che registra autore e data di ogni scrittura

use super::{
    AuditedWritable, Deletable, ReadRepository, Repository, RepositoryError, Transactional,
};
use crate::core::RequestContext;
use crate::entities::AuditedEntity;
use crate::store::{CommitSummary, Store};
use chrono::Utc;
use futures::stream::BoxStream;
use tracing::{debug, instrument, warn};

/// Repository for [`AuditedEntity`] types.
///
/// Every create and update takes the acting identity and stamps it, together
/// with the current UTC time, on the entity. The unaudited [`Writable`](super::Writable)
/// capability is not implemented, so an audited entity cannot be written
/// without an actor:
///
/// ```compile_fail
/// use crudgate::entities::AuditedEntity;
/// use crudgate::repositories::{AuditedRepository, Writable};
/// use crudgate::store::SqliteStore;
///
/// fn assert_writable<E: AuditedEntity, R: Writable<E>>() {}
///
/// fn check<E: AuditedEntity>() {
///     assert_writable::<E, AuditedRepository<E, SqliteStore>>();
/// }
/// ```
pub struct AuditedRepository<E: AuditedEntity, S: Store> {
    inner: Repository<E, S>,
}

impl<E: AuditedEntity, S: Store> AuditedRepository<E, S> {
    pub fn new(store: S, context: RequestContext) -> Self {
        Self {
            inner: Repository::new(store, context),
        }
    }

    pub fn context(&self) -> &RequestContext {
        self.inner.context()
    }
}

impl<E: AuditedEntity, S: Store> ReadRepository<E> for AuditedRepository<E, S> {
    fn get_all(&self) -> BoxStream<'_, Result<E, RepositoryError>> {
        self.inner.get_all()
    }

    async fn get(&self, id: &E::Id) -> Result<Option<E>, RepositoryError> {
        self.inner.get(id).await
    }

    async fn get_range(&self, ids: &[E::Id]) -> Result<Vec<E>, RepositoryError> {
        self.inner.get_range(ids).await
    }
}

impl<E: AuditedEntity, S: Store> AuditedWritable<E> for AuditedRepository<E, S> {
    #[instrument(skip(self, entity), fields(resource = E::RESOURCE, correlation_id = %self.context().correlation_id()))]
    fn create(&mut self, mut entity: E, actor: E::Actor) {
        entity.audit_mut().stamp_created(actor, Utc::now());
        debug!("Queuing audited insertion");
        self.inner.queue_insert(entity);
    }

    #[instrument(skip(self, entities), fields(resource = E::RESOURCE, correlation_id = %self.context().correlation_id(), count = entities.len()))]
    fn create_range(&mut self, entities: Vec<E>, actor: E::Actor) {
        // one timestamp for the whole batch
        let now = Utc::now();
        for mut entity in entities {
            entity.audit_mut().stamp_created(actor.clone(), now);
            self.inner.queue_insert(entity);
        }
        debug!("Queued audited insertions");
    }

    #[instrument(skip(self, entity), fields(resource = E::RESOURCE, correlation_id = %self.context().correlation_id(), id = %id))]
    async fn update(
        &mut self,
        id: E::Id,
        mut entity: E,
        actor: E::Actor,
    ) -> Result<(), RepositoryError> {
        let Some(current) = self.inner.find_current(&id).await? else {
            warn!("Audited update target not found");
            return Err(Repository::<E, S>::not_found(&id));
        };

        entity
            .audit_mut()
            .stamp_updated(current.audit(), actor, Utc::now());
        debug!("Queuing audited update");
        self.inner.queue_update(id, entity);
        Ok(())
    }
}

impl<E: AuditedEntity, S: Store> Deletable<E> for AuditedRepository<E, S> {
    fn delete(&mut self, id: E::Id) -> Result<(), RepositoryError> {
        self.inner.delete(id)
    }

    fn delete_range(&mut self, ids: Vec<E::Id>) {
        self.inner.delete_range(ids)
    }
}

impl<E: AuditedEntity, S: Store> Transactional<E> for AuditedRepository<E, S> {
    fn pending_changes(&self) -> usize {
        self.inner.pending_changes()
    }

    async fn save_changes(&mut self) -> Result<CommitSummary<E::Id>, RepositoryError> {
        self.inner.save_changes().await
    }
}
