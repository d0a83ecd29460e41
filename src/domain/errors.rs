use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("order not found")]
    NotFound,
    #[error("order already exists")]
    AlreadyExists,
    #[error("invalid order data: {0}")]
    InvalidOrderData(String),
    #[error("invalid order id: {0}")]
    InvalidId(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("operation timed out")]
    Timeout,
    #[error("Internal error: {0}")]
    Internal(String),
}
