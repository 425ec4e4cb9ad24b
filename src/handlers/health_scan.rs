use crate::error::{AppError, AppResult};
use crate::scan::ExtractionResult;
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};

/// POST /health-scan/analyze
///
/// Multipart upload with the document photo in the `image` field. Returns the
/// extracted fields; anything the model did not find is `""`.
pub async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ExtractionResult>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e.body_text())))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e.body_text())))?;

        let result = state
            .extractor
            .extract(&data, content_type.as_deref())
            .await?;
        return Ok(Json(result));
    }

    Err(AppError::BadRequest("Missing 'image' file field".to_string()))
}
