pub mod ops;
pub mod pets;

use std::fmt;

use axum::http::StatusCode;

use crate::routes::HandlerError;

#[derive(Debug)]
pub enum PetError {
    NotFound(i64),
    Storage,
}

impl fmt::Display for PetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PetError::NotFound(id) => write!(f, "pet {} not found", id),
            PetError::Storage => write!(f, "storage unavailable"),
        }
    }
}

impl HandlerError for PetError {
    fn status(&self) -> StatusCode {
        match self {
            PetError::NotFound(_) => StatusCode::NOT_FOUND,
            PetError::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &str {
        match self {
            PetError::NotFound(_) => "not_found",
            PetError::Storage => "internal_error",
        }
    }
}
