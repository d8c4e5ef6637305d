use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("gateway error: {0}")]
    Gateway(#[from] store::GatewayError),
    #[error("{0}")]
    Store(#[from] store::StoreError),
    /// Failure an update or delete left in the store's error slot.
    #[error("{0}")]
    Action(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
