//! # My Data Handlers
//!
//! Read and overwrite the caller's health record. Both routes sit behind
//! `require_auth`, and the record is keyed by the token's subject.

use crate::db::models::HealthRecord;
use crate::db::records::{get_record, put_record};
use crate::error::AppResult;
use crate::identity::Claims;
use crate::state::AppState;
use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Body of `PUT /mydata`. Values may be any JSON type; they are stringified
/// before saving.
#[derive(Debug, Default, Deserialize)]
pub struct MyDataBody {
    #[serde(default)]
    pub patient: Map<String, Value>,
    #[serde(default)]
    pub clinical: Map<String, Value>,
    #[serde(default)]
    pub trend: Map<String, Value>,
}

/// GET /mydata
///
/// Empty sections when nothing has been saved yet.
pub async fn get_my_data(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<HealthRecord>> {
    let record = get_record(state.records.as_ref(), &claims.sub).await?;
    Ok(Json(record))
}

/// PUT /mydata
///
/// Replaces the whole record and echoes back what was stored.
pub async fn save_my_data(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<MyDataBody>,
) -> AppResult<Json<HealthRecord>> {
    let record = HealthRecord::from_loose(&body.patient, &body.clinical, &body.trend);
    put_record(state.records.as_ref(), &claims.sub, &record).await?;

    tracing::info!("Saved health record for {}", claims.sub);
    Ok(Json(record))
}
