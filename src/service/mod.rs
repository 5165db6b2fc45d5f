pub mod command;
pub mod intake;
pub mod listing;

use thiserror::Error;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Store(#[from] StoreError),
}
