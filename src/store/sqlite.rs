//! SqliteStore - Implementazione dello store su SQLite tramite sqlx
//!
//! Entities are stored as JSON documents in a single `entities` table, keyed by
//! `(resource, entity_id)`. Identities for new rows come from a per-resource
//! counter in the `sequences` table.

use super::{CommitSummary, Mutation, Store, StoreError, UnitOfWork};
use crate::entities::{Entity, EntityId};
use futures::stream::{BoxStream, StreamExt};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

#[derive(Clone, Debug)]
pub struct SqliteStore {
    connection_pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Opens a pool on `database_url`, creating the database file if needed.
    ///
    /// In-memory databases live and die with their connection, so they are
    /// pinned to a single connection that is never recycled.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let connection_pool = pool_options.connect_with(options).await?;
        info!("Connected to {}", database_url);
        Ok(Self::new(connection_pool))
    }

    /// Fresh private in-memory store with the schema already applied
    pub async fn in_memory() -> Result<Self, StoreError> {
        let store = Self::connect("sqlite::memory:", 1).await?;
        store.migrate().await?;
        Ok(store)
    }

    /// Creates the tables if they do not exist yet
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS entities (
                resource TEXT NOT NULL,
                entity_id TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY (resource, entity_id)
            )
            "#,
        )
        .execute(&self.connection_pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sequences (
                resource TEXT PRIMARY KEY,
                last_value INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.connection_pool)
        .await?;

        debug!("Schema ready");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.connection_pool
    }
}

fn decode<E: Entity>(body: &str) -> Result<E, StoreError> {
    Ok(serde_json::from_str(body)?)
}

/// Turns a unique violation into [`StoreError::Conflict`]
fn conflict_or_database(err: sqlx::Error, resource: &'static str, id: &str) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Conflict {
            resource,
            id: id.to_string(),
        },
        other => StoreError::Database(other),
    }
}

/// Draws the next free identity for `E` from its sequence
async fn next_identity<E: Entity>(conn: &mut SqliteConnection) -> Result<E::Id, StoreError> {
    loop {
        let sequence: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sequences (resource, last_value) VALUES (?, 1)
            ON CONFLICT (resource) DO UPDATE SET last_value = last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(E::RESOURCE)
        .fetch_one(&mut *conn)
        .await?;

        let id = E::Id::from_sequence(sequence).ok_or(StoreError::IdentityExhausted {
            resource: E::RESOURCE,
        })?;

        // rows inserted with an explicit identity may already hold this value
        let taken: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM entities WHERE resource = ? AND entity_id = ?")
                .bind(E::RESOURCE)
                .bind(id.to_key())
                .fetch_optional(&mut *conn)
                .await?;

        if taken.is_none() {
            return Ok(id);
        }
    }
}

impl Store for SqliteStore {
    fn stream_all<E: Entity>(&self) -> BoxStream<'_, Result<E, StoreError>> {
        sqlx::query_scalar::<_, String>(
            "SELECT body FROM entities WHERE resource = ? ORDER BY rowid",
        )
        .bind(E::RESOURCE)
        .fetch(&self.connection_pool)
        .map(|row| row.map_err(StoreError::from).and_then(|body| decode::<E>(&body)))
        .boxed()
    }

    #[instrument(skip(self), fields(resource = E::RESOURCE, id = %id))]
    async fn fetch<E: Entity>(&self, id: &E::Id) -> Result<Option<E>, StoreError> {
        let body: Option<String> =
            sqlx::query_scalar("SELECT body FROM entities WHERE resource = ? AND entity_id = ?")
                .bind(E::RESOURCE)
                .bind(id.to_key())
                .fetch_optional(&self.connection_pool)
                .await?;

        body.as_deref().map(decode::<E>).transpose()
    }

    #[instrument(skip(self, ids), fields(resource = E::RESOURCE, count = ids.len()))]
    async fn fetch_many<E: Entity>(&self, ids: &[E::Id]) -> Result<Vec<E>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // Build dynamic IN (...) list using QueryBuilder
        let mut query_builder =
            QueryBuilder::<Sqlite>::new("SELECT body FROM entities WHERE resource = ");
        query_builder.push_bind(E::RESOURCE);
        query_builder.push(" AND entity_id IN (");
        let mut separated = query_builder.separated(", ");
        for id in ids {
            separated.push_bind(id.to_key());
        }
        separated.push_unseparated(") ORDER BY rowid");

        let bodies: Vec<String> = query_builder
            .build_query_scalar()
            .fetch_all(&self.connection_pool)
            .await?;

        debug!("Found {} of {} requested rows", bodies.len(), ids.len());
        bodies.iter().map(|body| decode::<E>(body)).collect()
    }

    #[instrument(skip(self, work), fields(resource = E::RESOURCE, mutations = work.len()))]
    async fn commit<E: Entity>(
        &self,
        work: UnitOfWork<E>,
    ) -> Result<CommitSummary<E::Id>, StoreError> {
        let mut summary = CommitSummary::default();
        if work.is_empty() {
            debug!("Nothing to commit");
            return Ok(summary);
        }

        // Start a transaction for atomicity, dropping it on error rolls back
        let mut tx = self.connection_pool.begin().await?;

        for mutation in work.into_mutations() {
            match mutation {
                Mutation::Insert(mut entity) => {
                    if entity.id().is_unassigned() {
                        let id = next_identity::<E>(&mut *tx).await?;
                        entity.set_id(id);
                    }
                    let key = entity.id().to_key();
                    let body = serde_json::to_string(&entity)?;

                    sqlx::query("INSERT INTO entities (resource, entity_id, body) VALUES (?, ?, ?)")
                        .bind(E::RESOURCE)
                        .bind(&key)
                        .bind(&body)
                        .execute(&mut *tx)
                        .await
                        .map_err(|err| conflict_or_database(err, E::RESOURCE, &key))?;

                    summary.created.push(entity.id().clone());
                }
                Mutation::Update { key, entity } => {
                    let old_key = key.to_key();
                    let new_key = entity.id().to_key();
                    let body = serde_json::to_string(&entity)?;

                    let result = sqlx::query(
                        "UPDATE entities SET entity_id = ?, body = ? WHERE resource = ? AND entity_id = ?",
                    )
                    .bind(&new_key)
                    .bind(&body)
                    .bind(E::RESOURCE)
                    .bind(&old_key)
                    .execute(&mut *tx)
                    .await
                    .map_err(|err| conflict_or_database(err, E::RESOURCE, &new_key))?;

                    if result.rows_affected() == 0 {
                        warn!("Update target {} vanished before commit", old_key);
                        return Err(StoreError::NotFound {
                            resource: E::RESOURCE,
                            id: old_key,
                        });
                    }
                    summary.updated += 1;
                }
                Mutation::Remove { key, strict } => {
                    let key = key.to_key();
                    let result =
                        sqlx::query("DELETE FROM entities WHERE resource = ? AND entity_id = ?")
                            .bind(E::RESOURCE)
                            .bind(&key)
                            .execute(&mut *tx)
                            .await?;

                    if result.rows_affected() == 0 {
                        if strict {
                            warn!("Delete target {} does not exist", key);
                            return Err(StoreError::NotFound {
                                resource: E::RESOURCE,
                                id: key,
                            });
                        }
                        debug!("Skipping delete of missing {}", key);
                    }
                    summary.removed += result.rows_affected() as usize;
                }
            }
        }

        tx.commit().await?;

        info!(
            "Committed {} created, {} updated, {} removed",
            summary.created.len(),
            summary.updated,
            summary.removed
        );
        Ok(summary)
    }
}
