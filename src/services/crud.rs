//! CRUD services - Endpoint HTTP generici per una risorsa con controllo dei permessi

use super::request_context;
use crate::controllers::CrudController;
use crate::core::AppError;
use crate::dtos::UpdateQuery;
use crate::entities::Entity;
use crate::store::Store;
use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use std::sync::Arc;
use tracing::instrument;

type Controller<E, S> = State<Arc<CrudController<E, S>>>;

/// Mounts the full CRUD surface of `controller`.
///
/// | Verb | Path | Operation |
/// |------|------|-----------|
/// | POST | `/` | create |
/// | POST | `/batch` | create_range |
/// | GET | `/` | read_all |
/// | GET | `/{id}` | read |
/// | PUT | `/{id}?createIfNotExists=` | update |
/// | PUT | `/?createIfNotExists=` | update_range |
/// | DELETE | `/{id}` | delete |
/// | DELETE | `/` | delete_range, ids in the JSON body |
pub fn crud_routes<E: Entity, S: Store>(controller: CrudController<E, S>) -> Router {
    Router::new()
        .route(
            "/",
            post(create::<E, S>)
                .get(read_all::<E, S>)
                .put(update_range::<E, S>)
                .delete(delete_range::<E, S>),
        )
        .route("/batch", post(create_range::<E, S>))
        .route(
            "/{id}",
            get(read::<E, S>)
                .put(update::<E, S>)
                .delete(delete::<E, S>),
        )
        .with_state(Arc::new(controller))
}

#[instrument(skip_all, fields(resource = E::RESOURCE))]
pub async fn create<E: Entity, S: Store>(
    State(controller): Controller<E, S>,
    headers: HeaderMap,
    Json(entity): Json<E>,
) -> Result<StatusCode, AppError> {
    controller
        .create(request_context::<E>(&headers), entity)
        .await?;
    Ok(StatusCode::OK)
}

#[instrument(skip_all, fields(resource = E::RESOURCE, count = entities.len()))]
pub async fn create_range<E: Entity, S: Store>(
    State(controller): Controller<E, S>,
    headers: HeaderMap,
    Json(entities): Json<Vec<E>>,
) -> Result<StatusCode, AppError> {
    controller
        .create_range(request_context::<E>(&headers), entities)
        .await?;
    Ok(StatusCode::OK)
}

#[instrument(skip_all, fields(resource = E::RESOURCE, id = %id))]
pub async fn read<E: Entity, S: Store>(
    State(controller): Controller<E, S>,
    headers: HeaderMap,
    Path(id): Path<E::Id>, // parametro dalla URL /{resource}/{id}
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

#[instrument(skip_all, fields(resource = E::RESOURCE, id = %id, create_if_not_exists = query.create_if_not_exists))]
pub async fn update<E: Entity, S: Store>(
    State(controller): Controller<E, S>,
    headers: HeaderMap,
    Path(id): Path<E::Id>,
    Query(query): Query<UpdateQuery>, // ?createIfNotExists=true
    Json(entity): Json<E>,
) -> Result<StatusCode, AppError> {
    controller
        .update(
            request_context::<E>(&headers),
            id,
            entity,
            query.create_if_not_exists,
        )
        .await?;
    Ok(StatusCode::OK)
}

#[instrument(skip_all, fields(resource = E::RESOURCE, count = entities.len(), create_if_not_exists = query.create_if_not_exists))]
pub async fn update_range<E: Entity, S: Store>(
    State(controller): Controller<E, S>,
    headers: HeaderMap,
    Query(query): Query<UpdateQuery>,
    Json(entities): Json<Vec<E>>,
) -> Result<StatusCode, AppError> {
    controller
        .update_range(
            request_context::<E>(&headers),
            entities,
            query.create_if_not_exists,
        )
        .await?;
    Ok(StatusCode::OK)
}

#[instrument(skip_all, fields(resource = E::RESOURCE, id = %id))]
pub async fn delete<E: Entity, S: Store>(
    State(controller): Controller<E, S>,
    headers: HeaderMap,
    Path(id): Path<E::Id>,
) -> Result<StatusCode, AppError> {
    controller.delete(request_context::<E>(&headers), id).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip_all, fields(resource = E::RESOURCE, count = ids.len()))]
pub async fn delete_range<E: Entity, S: Store>(
    State(controller): Controller<E, S>,
    headers: HeaderMap,
    Json(ids): Json<Vec<E::Id>>,
) -> Result<StatusCode, AppError> {
    controller
        .delete_range(request_context::<E>(&headers), ids)
        .await?;
    Ok(StatusCode::OK)
}
