//! Mapping of database and serialisation failures onto [`GatewayError`].
use sea_orm::DbErr;
use store::GatewayError;

pub(crate) fn db_error(err: DbErr) -> GatewayError {
    match err {
        DbErr::RecordNotFound(what) => GatewayError::NotFound(what),
        DbErr::RecordNotUpdated => GatewayError::NotFound("record not updated".to_string()),
        DbErr::Json(message) => GatewayError::Decode(message),
        other => GatewayError::Unavailable(other.to_string()),
    }
}

pub(crate) fn json_error(err: serde_json::Error) -> GatewayError {
    GatewayError::Decode(err.to_string())
}
