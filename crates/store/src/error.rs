//! The module contains the errors the store and its gateway can throw.
//!
//! The store errors are:
//!
//! - [`RemoteUnavailable`] thrown when a gateway call is rejected or times out.
//! - [`NotFound`] thrown when an update or delete targets a missing id.
//! - [`RateLimited`] thrown when a limiter denies a creation.
//! - [`ReconciliationFallback`] reported when preferences come from the local cache.
//!
//!  [`RemoteUnavailable`]: StoreError::RemoteUnavailable
//!  [`NotFound`]: StoreError::NotFound
//!  [`RateLimited`]: StoreError::RateLimited
//!  [`ReconciliationFallback`]: StoreError::ReconciliationFallback
use std::time::Duration;

use thiserror::Error;

/// Errors raised by a [`Gateway`](crate::Gateway) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
    #[error("\"{0}\" not found")]
    NotFound(String),
    #[error("malformed record: {0}")]
    Decode(String),
}

/// Store custom errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Too many attempts for \"{key}\", retry in {}s", retry_after.as_secs())]
    RateLimited { key: String, retry_after: Duration },
    #[error("Preferences restored from local cache: {0}")]
    ReconciliationFallback(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Request cancelled")]
    Cancelled,
    #[error("Local cache error: {0}")]
    Cache(String),
}

impl PartialEq for StoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::RemoteUnavailable(a), Self::RemoteUnavailable(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (
                Self::RateLimited {
                    key: a,
                    retry_after: x,
                },
                Self::RateLimited {
                    key: b,
                    retry_after: y,
                },
            ) => a == b && x == y,
            (Self::ReconciliationFallback(a), Self::ReconciliationFallback(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::Cancelled, Self::Cancelled) => true,
            (Self::Cache(a), Self::Cache(b)) => a == b,
            _ => false,
        }
    }
}

impl From<GatewayError> for StoreError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(what) => StoreError::NotFound(what),
            other => StoreError::RemoteUnavailable(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Cache(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Cache(err.to_string())
    }
}
