//! CrudController - Operazioni CRUD con controllo dei permessi

use super::{CrudAction, CrudError, PermissionSet};
use crate::core::RequestContext;
use crate::entities::{Entity, EntityId};
use crate::repositories::{
    Deletable, ReadRepository, Repository, Transactional, UpsertOutcome, Writable,
};
use crate::store::Store;
use futures::TryStreamExt;
use std::marker::PhantomData;
use tracing::{debug, info, instrument};

/// Permission-gated CRUD surface for one entity type.
///
/// Every call builds its own [`Repository`], so nothing is shared between
/// requests except the store. Per call the order is always: permission
/// check, identity precondition, repository call, commit.
pub struct CrudController<E: Entity, S: Store> {
    store: S,
    permissions: PermissionSet,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity, S: Store> CrudController<E, S> {
    /// Controller allowing every action
    pub fn new(store: S) -> Self {
        Self::with_permissions(store, PermissionSet::all())
    }

    pub fn with_permissions(store: S, permissions: PermissionSet) -> Self {
        Self {
            store,
            permissions,
            _entity: PhantomData,
        }
    }

    pub fn permissions(&self) -> PermissionSet {
        self.permissions
    }

    fn repository(&self, ctx: RequestContext) -> Repository<E, S> {
        Repository::new(self.store.clone(), ctx)
    }

    fn authorize(&self, action: CrudAction) -> Result<(), CrudError> {
        if self.permissions.allows(action) {
            return Ok(());
        }

        debug!("{} FORBIDDEN on {}", action, E::RESOURCE);
        Err(CrudError::PermissionDenied {
            action,
            resource: E::RESOURCE,
        })
    }

    /// `NotFound` for `id`; an unassigned id never names a stored row
    fn not_found(id: &E::Id) -> CrudError {
        debug!("NOT FOUND");
        CrudError::NotFound {
            resource: E::RESOURCE,
            id: id.to_key(),
        }
    }

    fn must_not_be_predefined(entity: &E) -> Result<(), CrudError> {
        if entity.has_assigned_id() {
            debug!("BAD REQUEST: id {} is predefined", entity.id());
            return Err(CrudError::Validation(format!(
                "{}.id must NOT be predefined",
                E::RESOURCE
            )));
        }
        Ok(())
    }

    fn must_be_defined(entity: &E) -> Result<(), CrudError> {
        if !entity.has_assigned_id() {
            debug!("BAD REQUEST: id is not defined");
            return Err(CrudError::Validation(format!(
                "{}.id must be defined",
                E::RESOURCE
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, ctx, entity), fields(resource = E::RESOURCE, correlation_id = %ctx.correlation_id()))]
    pub async fn create(&self, ctx: RequestContext, entity: E) -> Result<(), CrudError> {
        debug!("Create requested");
        // 1. Permesso
        self.authorize(CrudAction::Create)?;
        // 2. L'id deve essere assegnato dallo store
        Self::must_not_be_predefined(&entity)?;

        // 3. Delega al repository e commit
        let mut repository = self.repository(ctx);
        repository.create(entity);
        let summary = repository.save_changes().await?;

        info!("Create OK, assigned ids: {:?}", summary.created);
        Ok(())
    }

    #[instrument(skip(self, ctx, entities), fields(resource = E::RESOURCE, correlation_id = %ctx.correlation_id(), count = entities.len()))]
    pub async fn create_range(
        &self,
        ctx: RequestContext,
        entities: Vec<E>,
    ) -> Result<(), CrudError> {
        debug!("CreateRange requested");
        self.authorize(CrudAction::Create)?;
        for entity in &entities {
            Self::must_not_be_predefined(entity)?;
        }

        let mut repository = self.repository(ctx);
        repository.create_range(entities);
        let summary = repository.save_changes().await?;

        info!("CreateRange OK, {} created", summary.created.len());
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(resource = E::RESOURCE, correlation_id = %ctx.correlation_id(), id = %id))]
    pub async fn read(&self, ctx: RequestContext, id: E::Id) -> Result<E, CrudError> {
        debug!("Read requested");
        self.authorize(CrudAction::Read)?;

        if id.is_unassigned() {
            return Err(Self::not_found(&id));
        }

        let repository = self.repository(ctx);
        match repository.get(&id).await? {
            Some(entity) => {
                debug!("Read OK");
                Ok(entity)
            }
            None => Err(Self::not_found(&id)),
        }
    }

    #[instrument(skip(self, ctx), fields(resource = E::RESOURCE, correlation_id = %ctx.correlation_id()))]
    pub async fn read_all(&self, ctx: RequestContext) -> Result<Vec<E>, CrudError> {
        debug!("ReadAll requested");
        self.authorize(CrudAction::Read)?;

        let repository = self.repository(ctx);
        let entities: Vec<E> = repository.get_all().try_collect().await?;

        debug!("ReadAll OK, {} entities", entities.len());
        Ok(entities)
    }

    /// Overwrites the entity at `id` with `entity`.
    ///
    /// The body's id must be assigned and equal to `id`. Without
    /// `create_if_not_exists` a missing target is [`CrudError::NotFound`];
    /// with it, the entity is inserted instead.
    #[instrument(skip(self, ctx, entity), fields(resource = E::RESOURCE, correlation_id = %ctx.correlation_id(), id = %id))]
    pub async fn update(
        &self,
        ctx: RequestContext,
        id: E::Id,
        entity: E,
        create_if_not_exists: bool,
    ) -> Result<(), CrudError> {
        debug!("Update requested");
        // 1. Permesso
        self.authorize(CrudAction::Update)?;
        // 2. L'id deve essere definito e coincidere con quello del path
        Self::must_be_defined(&entity)?;
        if *entity.id() != id {
            debug!("BAD REQUEST: body id {} differs from path id", entity.id());
            return Err(CrudError::Validation(format!(
                "{}.id {} does not match {}",
                E::RESOURCE,
                entity.id(),
                id
            )));
        }

        // 3. Delega al repository
        let mut repository = self.repository(ctx);
        if create_if_not_exists {
            let outcome = repository.update_or_create(entity, true).await?;
            debug!("Upsert resolved as {:?}", outcome);
        } else {
            repository.update(id, entity).await?;
        }

        // 4. Commit
        repository.save_changes().await?;
        info!("Update OK");
        Ok(())
    }

    /// Upserts every entity independently; see [`Writable::update_range`]
    #[instrument(skip(self, ctx, entities), fields(resource = E::RESOURCE, correlation_id = %ctx.correlation_id(), count = entities.len()))]
    pub async fn update_range(
        &self,
        ctx: RequestContext,
        entities: Vec<E>,
        create_if_not_exists: bool,
    ) -> Result<Vec<UpsertOutcome>, CrudError> {
        debug!("UpdateRange requested");
        self.authorize(CrudAction::Update)?;
        for entity in &entities {
            Self::must_be_defined(entity)?;
        }

        let mut repository = self.repository(ctx);
        let outcomes = repository
            .update_range(entities, create_if_not_exists)
            .await?;
        repository.save_changes().await?;

        info!("UpdateRange OK");
        Ok(outcomes)
    }

    #[instrument(skip(self, ctx), fields(resource = E::RESOURCE, correlation_id = %ctx.correlation_id(), id = %id))]
    pub async fn delete(&self, ctx: RequestContext, id: E::Id) -> Result<(), CrudError> {
        debug!("Delete requested");
        self.authorize(CrudAction::Delete)?;
        if id.is_unassigned() {
            return Err(Self::not_found(&id));
        }

        let mut repository = self.repository(ctx);
        repository.delete(id)?;
        // a missing row surfaces here as NotFound
        repository.save_changes().await?;

        info!("Delete OK");
        Ok(())
    }

    #[instrument(skip(self, ctx, ids), fields(resource = E::RESOURCE, correlation_id = %ctx.correlation_id(), count = ids.len()))]
    pub async fn delete_range(
        &self,
        ctx: RequestContext,
        ids: Vec<E::Id>,
    ) -> Result<(), CrudError> {
        debug!("DeleteRange requested");
        self.authorize(CrudAction::Delete)?;

        let mut repository = self.repository(ctx);
        repository.delete_range(ids);
        let summary = repository.save_changes().await?;

        info!("DeleteRange OK, {} removed", summary.removed);
        Ok(())
    }
}

impl<E: Entity, S: Store> Clone for CrudController<E, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            permissions: self.permissions,
            _entity: PhantomData,
        }
    }
}
