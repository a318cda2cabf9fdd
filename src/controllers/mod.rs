//! Controllers module - Logica applicativa delle operazioni CRUD
//!
//! A controller checks the permission gate, validates the identity
//! precondition, delegates to a request-scoped repository and commits, in
//! that order. Transport concerns live in [`crate::services`].

pub mod blocking;
pub mod crud;
pub mod permissions;
pub mod read_only;

#[allow(deprecated)]
pub use blocking::BlockingCrudController;
pub use crud::CrudController;
pub use permissions::{CrudAction, PermissionSet};
pub use read_only::ReadOnlyController;

use crate::repositories::RepositoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrudError {
    #[error("{action} forbidden on {resource}")]
    PermissionDenied {
        action: CrudAction,
        resource: &'static str,
    },

    #[error("{0}")]
    Validation(String),

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    /// Failures the controller does not handle, such as commit conflicts
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CrudError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { resource, id } => CrudError::NotFound { resource, id },
            other => CrudError::Repository(other),
        }
    }
}
