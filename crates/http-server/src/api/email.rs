use crate::core::{ApiError, AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use engine::models::email::{EmailDetail, OtpStatus};
use engine::services::lifecycle;
use serde_json::{json, Value};

/// Cross-inbox lookup by email id; the response carries the owning
/// inbox's current address as `to`.
pub async fn get_email_detail_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EmailDetail>, ApiError> {
    let detail = lifecycle::email_detail(&state.store, id)?;
    Ok(Json(detail))
}

/// Soft delete. Deleting an already-deleted email still succeeds.
pub async fn delete_email_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    lifecycle::delete_email(&state.store, id)?;
    Ok(Json(json!({ "success": true })))
}

/// OTP status, recomputed against the wall clock on every call.
pub async fn otp_status_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OtpStatus>, ApiError> {
    let status = lifecycle::otp_status(&state.store, id)?;
    Ok(Json(status))
}
