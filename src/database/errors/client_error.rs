use thiserror::Error;

/// Errors which might occur when the pooled client is created or a connection is requested
///
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(tokio_postgres::error::Error),
    #[error("Pool creation error: {0}")]
    PoolCreationError(#[from] deadpool_postgres::BuildError),
    #[error("Get connection error: {0}")]
    GetConnectionError(#[from] deadpool_postgres::PoolError),
    #[error("No database specified")]
    NoDatabaseSpecified,
}
