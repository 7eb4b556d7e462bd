use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use common::{observability, types::Health};
use service::UserGrade;
use tracing::{debug, info};

use crate::errors::ApiError;
use crate::routes::AppState;

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// `POST /` on the write listener: decode, upsert, echo the id back.
///
/// The body is decoded from raw bytes so the decoder's own message reaches the
/// client; no content-type is required.
pub async fn write_grade(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let record = UserGrade::from_json(&body).map_err(|e| {
        observability::DECODE_ERRORS_TOTAL.inc();
        debug!(error = %e, "write body rejected");
        ApiError::from(e)
    })?;
    if !record.is_complete() {
        debug!(user_id = %record.user_id, "record stored with unset fields");
    }
    let user_id = record.user_id.clone();
    state.store.set(record).await;
    observability::WRITES_TOTAL.inc();
    info!(%user_id, "record upserted");
    Ok(Json(serde_json::json!({"Id": user_id})))
}

/// First `user_id` in the query string, or "" when absent. Repeated keys are
/// tolerated rather than rejected.
pub fn first_user_id(pairs: &[(String, String)]) -> &str {
    pairs
        .iter()
        .find(|(k, _)| k == "user_id")
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
}

/// `GET /?user_id=..` on the read listener.
pub async fn read_grade(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<UserGrade>, ApiError> {
    observability::READS_TOTAL.inc();
    let user_id = first_user_id(&pairs);
    match state.store.require(user_id).await {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            observability::READ_MISSES_TOTAL.inc();
            debug!(%user_id, "lookup miss");
            Err(e.into())
        }
    }
}
