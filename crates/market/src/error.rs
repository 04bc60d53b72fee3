use thiserror::Error;
use xlmfish_data::DataError;
use xlmfish_domain::error::DomainError;

/// Errors that abort an aggregation run.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("configuration error: {0}")]
    Config(String),
}
