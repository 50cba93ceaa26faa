//! Engine error types

use crate::orders::store::StoreError;
use shared::order::OrderError;
use thiserror::Error;

/// Errors from fulfillment engine operations
///
/// Order-domain rejections are returned to the caller verbatim; storage
/// failures wrap the underlying store error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Unknown menu item: {0}")]
    UnknownMenuItem(String),

    #[error("Invalid order input: {0}")]
    InvalidInput(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// The order-domain rejection, if that is what this error is
    pub fn as_order_error(&self) -> Option<&OrderError> {
        match self {
            EngineError::Order(e) => Some(e),
            _ => None,
        }
    }
}
