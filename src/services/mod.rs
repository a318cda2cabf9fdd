//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Ogni risorsa viene montata tramite un router costruito a partire dal suo
//! controller. Handlers only extract the request, build the
//! [`RequestContext`] and translate controller errors into [`AppError`](crate::core::AppError).

pub mod crud;
pub mod read_only;

// Re-exports per facilitare l'import
pub use crud::crud_routes;
pub use read_only::read_only_routes;

use crate::core::RequestContext;
use crate::entities::Entity;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use uuid::Uuid;

/// Header carrying a caller-supplied correlation id
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Root endpoint - health check
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}

/// Builds the per-request context, reusing the caller's correlation id when it is a valid uuid
pub fn request_context<E: Entity>(headers: &HeaderMap) -> RequestContext {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .map(|id| RequestContext::with_correlation_id(E::RESOURCE, id))
        .unwrap_or_else(|| RequestContext::new(E::RESOURCE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::WeatherForecast;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_context_reuses_valid_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            CORRELATION_ID_HEADER,
            HeaderValue::from_str(&id.to_string()).expect("uuid is a valid header value"),
        );

        let ctx = request_context::<WeatherForecast>(&headers);

        assert_eq!(ctx.correlation_id(), id);
        assert_eq!(ctx.resource(), "weatherforecast");
    }

    #[test]
    fn test_request_context_ignores_malformed_header() {
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_ID_HEADER, HeaderValue::from_static("not-a-uuid"));

        let ctx = request_context::<WeatherForecast>(&headers);

        assert!(!ctx.correlation_id().is_nil());
    }
}
