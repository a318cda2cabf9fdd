use crate::controllers::CrudError;
use crate::repositories::RepositoryError;
use crate::store::StoreError;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::error;

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: &'static str,
    details: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            message,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    // Common error constructors
    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: &'static str) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: &'static str) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: &'static str) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<CrudError> for AppError {
    fn from(err: CrudError) -> Self {
        let details = err.to_string();
        match err {
            CrudError::PermissionDenied { .. } => {
                Self::forbidden("Action not permitted").with_details(details)
            }
            CrudError::Validation(_) => Self::bad_request("Invalid identity").with_details(details),
            CrudError::NotFound { .. } => {
                Self::not_found("Resource not found").with_details(details)
            }
            CrudError::Repository(err) => Self::from(err),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::InvalidArgument(details) => {
                Self::bad_request("Invalid argument").with_details(details)
            }
            RepositoryError::NotFound { .. } => {
                Self::not_found("Resource not found").with_details(err.to_string())
            }
            RepositoryError::Store(err) => Self::from(err),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { .. } => Self::conflict("Conflict").with_details(err.to_string()),

            StoreError::NotFound { .. } => {
                Self::not_found("Resource not found").with_details(err.to_string())
            }

            StoreError::Database(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
                Self::service_unavailable("Database unavailable")
            }

            other => {
                error!("Unhandled store failure: {}", other);
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error: self.message,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::CrudAction;

    #[test]
    fn test_controller_errors_map_to_their_status() {
        let forbidden = AppError::from(CrudError::PermissionDenied {
            action: CrudAction::Create,
            resource: "widgets",
        });
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let invalid = AppError::from(CrudError::Validation("widgets.id must be defined".into()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let missing = AppError::from(CrudError::NotFound {
            resource: "widgets",
            id: "4".into(),
        });
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unhandled_repository_errors() {
        let conflict = AppError::from(CrudError::Repository(RepositoryError::Store(
            StoreError::Conflict {
                resource: "widgets",
                id: "1".into(),
            },
        )));
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let invalid = AppError::from(CrudError::Repository(RepositoryError::InvalidArgument(
            "widgets id must be assigned".into(),
        )));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let exhausted = AppError::from(StoreError::IdentityExhausted {
            resource: "widgets",
        });
        assert_eq!(exhausted.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let unavailable = AppError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
