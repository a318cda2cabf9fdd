//! Read-only services - Endpoint HTTP di sola lettura

use super::request_context;
use crate::controllers::ReadOnlyController;
use crate::core::AppError;
use crate::entities::Entity;
use crate::store::Store;
use axum::{
    Router,
    extract::{Json, Path, State},
    http::HeaderMap,
    routing::get,
};
use std::sync::Arc;
use tracing::instrument;

type Controller<E, S> = State<Arc<ReadOnlyController<E, S>>>;

/// Mounts `GET /`, `GET /{id}` and `GET /range` (ids in the JSON body)
pub fn read_only_routes<E: Entity, S: Store>(controller: ReadOnlyController<E, S>) -> Router {
    Router::new()
        .route("/", get(read_all::<E, S>))
        .route("/range", get(read_range::<E, S>))
        .route("/{id}", get(read::<E, S>))
        .with_state(Arc::new(controller))
}

#[instrument(skip_all, fields(resource = E::RESOURCE, id = %id))]
pub async fn read<E: Entity, S: Store>(
    State(controller): Controller<E, S>,
    headers: HeaderMap,
    Path(id): Path<E::Id>,
) -> Result<Json<E>, AppError> {
    let entity = controller.read(request_context::<E>(&headers), id).await?;
    Ok(Json(entity))
}

#[instrument(skip_all, fields(resource = E::RESOURCE))]
pub async fn read_all<E: Entity, S: Store>(
    State(controller): Controller<E, S>,
    headers: HeaderMap,
) -> Result<Json<Vec<E>>, AppError> {
    let entities = controller.read_all(request_context::<E>(&headers)).await?;
    Ok(Json(entities))
}

#[instrument(skip_all, fields(resource = E::RESOURCE, count = ids.len()))]
pub async fn read_range<E: Entity, S: Store>(
    State(controller): Controller<E, S>,
    headers: HeaderMap,
    Json(ids): Json<Vec<E::Id>>,
) -> Result<Json<Vec<E>>, AppError> {
    let entities = controller
        .read_range(request_context::<E>(&headers), ids)
        .await?;
    Ok(Json(entities))
}
