//! ReadOnlyController - Sola lettura, senza controllo dei permessi

use super::CrudError;
use crate::core::RequestContext;
use crate::entities::{Entity, EntityId};
use crate::repositories::{ReadRepository, Repository};
use crate::store::Store;
use futures::TryStreamExt;
use std::marker::PhantomData;
use tracing::{debug, instrument};

/// Query-only surface: every read is always allowed.
pub struct ReadOnlyController<E: Entity, S: Store> {
    store: S,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity, S: Store> ReadOnlyController<E, S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    fn repository(&self, ctx: RequestContext) -> Repository<E, S> {
        Repository::new(self.store.clone(), ctx)
    }

    #[instrument(skip(self, ctx), fields(resource = E::RESOURCE, correlation_id = %ctx.correlation_id(), id = %id))]
    pub async fn read(&self, ctx: RequestContext, id: E::Id) -> Result<E, CrudError> {
        debug!("Read requested");
        let not_found = || {
            debug!("NOT FOUND");
            CrudError::NotFound {
                resource: E::RESOURCE,
                id: id.to_key(),
            }
        };
        // the unassigned id never names a stored row
        if id.is_unassigned() {
            return Err(not_found());
        }

        let repository = self.repository(ctx);
        repository.get(&id).await?.ok_or_else(not_found)
    }

    #[instrument(skip(self, ctx), fields(resource = E::RESOURCE, correlation_id = %ctx.correlation_id()))]
    pub async fn read_all(&self, ctx: RequestContext) -> Result<Vec<E>, CrudError> {
        debug!("ReadAll requested");
        let repository = self.repository(ctx);
        let entities: Vec<E> = repository.get_all().try_collect().await?;

        debug!("ReadAll OK, {} entities", entities.len());
        Ok(entities)
    }

    /// Entities whose id is in `ids`; missing ids are left out
    #[instrument(skip(self, ctx, ids), fields(resource = E::RESOURCE, correlation_id = %ctx.correlation_id(), count = ids.len()))]
    pub async fn read_range(
        &self,
        ctx: RequestContext,
        ids: Vec<E::Id>,
    ) -> Result<Vec<E>, CrudError> {
        debug!("ReadRange requested");
        let repository = self.repository(ctx);
        let entities = repository.get_range(&ids).await?;

        debug!("ReadRange OK, {} of {} found", entities.len(), ids.len());
        Ok(entities)
    }
}

impl<E: Entity, S: Store> Clone for ReadOnlyController<E, S> {
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}
