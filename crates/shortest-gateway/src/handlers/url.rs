use crate::error::Result;
use crate::model::UrlPayload;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

/// `POST /encode`: long URL in, fully qualified short URL out.
pub async fn encode_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UrlPayload>, JsonRejection>,
) -> Result<Json<UrlPayload>> {
    let Json(UrlPayload { url }) = payload?;
    let shortener = state.shortener();

    let short_url = state
        .within_deadline(|cancel| async move { shortener.encode_url(&url, &cancel).await })
        .await?;

    Ok(Json(UrlPayload { url: short_url }))
}

/// `POST /decode`: fully qualified short URL in, long URL out.
pub async fn decode_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UrlPayload>, JsonRejection>,
) -> Result<Json<UrlPayload>> {
    let Json(UrlPayload { url }) = payload?;
    let shortener = state.shortener();

    let long_url = state
        .within_deadline(|cancel| async move { shortener.decode_url(&url, &cancel).await })
        .await?;

    Ok(Json(UrlPayload { url: long_url }))
}
