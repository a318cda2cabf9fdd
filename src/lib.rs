//! crudgate library - espone i moduli principali per il binario e per i test
//!
//! Generic CRUD persistence over HTTP. An [`Entity`](entities::Entity) type
//! gets a request-scoped [`Repository`](repositories::Repository) with
//! unit-of-work semantics, a permission-gated
//! [`CrudController`](controllers::CrudController) and an axum router built
//! by [`services::crud_routes`].

pub mod controllers;
pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;
pub mod store;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, Config, RequestContext};
pub use services::root;

use axum::{Router, routing::get};
use controllers::{CrudController, ReadOnlyController};
use entities::WeatherForecast;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest(
            "/weatherforecast",
            services::crud_routes(CrudController::<WeatherForecast, _>::new(
                state.store.clone(),
            )),
        )
        .nest(
            "/forecasts",
            services::read_only_routes(ReadOnlyController::<WeatherForecast, _>::new(
                state.store.clone(),
            )),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
