//! BlockingCrudController - Facciata sincrona mantenuta per compatibilità
#![allow(deprecated)]

use super::{CrudController, CrudError, PermissionSet};
use crate::core::RequestContext;
use crate::entities::Entity;
use crate::repositories::UpsertOutcome;
use crate::store::Store;
use tokio::runtime::Handle;

/// Synchronous CRUD controller.
///
/// Every call blocks the current thread on `runtime` until the matching
/// [`CrudController`] operation completes, so permission, validation and
/// commit ordering are the same. Calling it from inside an async task panics.
#[deprecated(note = "use CrudController; this facade blocks a thread per call")]
pub struct BlockingCrudController<E: Entity, S: Store> {
    inner: CrudController<E, S>,
    runtime: Handle,
}

impl<E: Entity, S: Store> BlockingCrudController<E, S> {
    pub fn new(store: S, runtime: Handle) -> Self {
        Self::with_permissions(store, PermissionSet::all(), runtime)
    }

    pub fn with_permissions(store: S, permissions: PermissionSet, runtime: Handle) -> Self {
        Self {
            inner: CrudController::with_permissions(store, permissions),
            runtime,
        }
    }

    fn context() -> RequestContext {
        RequestContext::new(E::RESOURCE)
    }

    fn run<T>(&self, call: impl Future<Output = Result<T, CrudError>>) -> Result<T, CrudError> {
        self.runtime.block_on(call)
    }

    pub fn create(&self, entity: E) -> Result<(), CrudError> {
        self.run(self.inner.create(Self::context(), entity))
    }

    pub fn create_range(&self, entities: Vec<E>) -> Result<(), CrudError> {
        self.run(self.inner.create_range(Self::context(), entities))
    }

    pub fn read(&self, id: E::Id) -> Result<E, CrudError> {
        self.run(self.inner.read(Self::context(), id))
    }

    pub fn read_all(&self) -> Result<Vec<E>, CrudError> {
        self.run(self.inner.read_all(Self::context()))
    }

    pub fn update(
        &self,
        id: E::Id,
        entity: E,
        create_if_not_exists: bool,
    ) -> Result<(), CrudError> {
        let ctx = Self::context();
        self.run(self.inner.update(ctx, id, entity, create_if_not_exists))
    }

    pub fn update_range(
        &self,
        entities: Vec<E>,
        create_if_not_exists: bool,
    ) -> Result<Vec<UpsertOutcome>, CrudError> {
        let ctx = Self::context();
        self.run(self.inner.update_range(ctx, entities, create_if_not_exists))
    }

    pub fn delete(&self, id: E::Id) -> Result<(), CrudError> {
        self.run(self.inner.delete(Self::context(), id))
    }

    pub fn delete_range(&self, ids: Vec<E::Id>) -> Result<(), CrudError> {
        self.run(self.inner.delete_range(Self::context(), ids))
    }
}
