#![allow(dead_code)]

use axum_test::TestServer;
use crudgate::core::{AppState, RequestContext};
use crudgate::entities::{Audit, AuditedEntity, Entity};
use crudgate::repositories::{Repository, Transactional, Writable};
use crudgate::store::{CommitSummary, SqliteStore, Store, StoreError, UnitOfWork};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================
// Entità di test
// ============================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Widget {
    #[serde(default)]
    pub id: i32,
    pub name: String,
}

impl Entity for Widget {
    type Id = i32;
    const RESOURCE: &'static str = "widgets";

    fn id(&self) -> &i32 {
        &self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }
}

pub fn widget(id: i32, name: &str) -> Widget {
    Widget {
        id,
        name: name.to_string(),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuditedWidget {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit<i32>,
}

impl Entity for AuditedWidget {
    type Id = i64;
    const RESOURCE: &'static str = "audited_widgets";

    fn id(&self) -> &i64 {
        &self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl AuditedEntity for AuditedWidget {
    type Actor = i32;

    fn audit(&self) -> &Audit<i32> {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit<i32> {
        &mut self.audit
    }
}

pub fn audited_widget(id: i64, name: &str) -> AuditedWidget {
    AuditedWidget {
        id,
        name: name.to_string(),
        audit: Audit::default(),
    }
}

/// Entity with a string identity
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Tag {
    #[serde(default)]
    pub id: String,
    pub label: String,
}

impl Entity for Tag {
    type Id = String;
    const RESOURCE: &'static str = "tags";

    fn id(&self) -> &String {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

// ============================================================
// Store di test
// ============================================================

/// Fresh in-memory store with the schema applied
pub async fn create_test_store() -> SqliteStore {
    SqliteStore::in_memory()
        .await
        .expect("Failed to create in-memory store")
}

/// Wraps a [`SqliteStore`] and counts every call that reaches it
#[derive(Clone)]
pub struct CountingStore {
    inner: SqliteStore,
    reads: Arc<AtomicUsize>,
    commits: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            reads: Arc::new(AtomicUsize::new(0)),
            commits: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// `true` when nothing ever reached the store
    pub fn untouched(&self) -> bool {
        self.reads() == 0 && self.commits() == 0
    }
}

impl Store for CountingStore {
    fn stream_all<E: Entity>(&self) -> BoxStream<'_, Result<E, StoreError>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.stream_all::<E>()
    }

    async fn fetch<E: Entity>(&self, id: &E::Id) -> Result<Option<E>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch::<E>(id).await
    }

    async fn fetch_many<E: Entity>(&self, ids: &[E::Id]) -> Result<Vec<E>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_many::<E>(ids).await
    }

    async fn commit<E: Entity>(
        &self,
        work: UnitOfWork<E>,
    ) -> Result<CommitSummary<E::Id>, StoreError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.inner.commit(work).await
    }
}

// ============================================================
// Seed e helper
// ============================================================

pub fn test_context<E: Entity>() -> RequestContext {
    RequestContext::new(E::RESOURCE)
}

/// Inserts one widget per name and returns the identities assigned by the store
pub async fn seed_widgets(store: &SqliteStore, names: &[&str]) -> Vec<i32> {
    let mut repo = Repository::<Widget, _>::new(store.clone(), test_context::<Widget>());
    repo.create_range(names.iter().map(|name| widget(0, name)).collect());
    repo.save_changes()
        .await
        .expect("Failed to seed widgets")
        .created
}

/// Crea un AppState per i test
pub fn create_test_state(store: SqliteStore) -> Arc<AppState> {
    Arc::new(AppState::new(store))
}

/// Crea un TestServer per i test
///
/// # Arguments
/// * `state` - AppState da utilizzare per il server
///
/// # Returns
/// TestServer configurato e pronto per eseguire richieste
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = crudgate::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}
