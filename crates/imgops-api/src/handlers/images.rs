//! Transform endpoints
//!
//! Each handler reads the multipart form, builds a [`TransformRequest`] and
//! hands it to the workflow. Parsing is lenient: bad numbers become absent
//! values and validation decides what to report.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use imgops_core::constants::{HEIGHT_FIELD, QUALITY_FIELD, WIDTH_FIELD};
use imgops_core::{CompressParams, ImageResponse, OperationKind, ResizeParams, TransformRequest};
use std::sync::Arc;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::extract_transform_form;

#[tracing::instrument(skip(state, multipart))]
pub async fn convert_png_to_jpeg(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageResponse>, HttpAppError> {
    let mut form = extract_transform_form(multipart?).await?;
    let image = form.require_image(OperationKind::Convert)?;

    let response = state
        .workflow
        .execute(TransformRequest::Convert { image })
        .await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(state, multipart))]
pub async fn resize_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageResponse>, HttpAppError> {
    let mut form = extract_transform_form(multipart?).await?;
    let image = form.require_image(OperationKind::Resize)?;
    let params = ResizeParams::from_form(form.text(WIDTH_FIELD), form.text(HEIGHT_FIELD));

    let response = state
        .workflow
        .execute(TransformRequest::Resize { image, params })
        .await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(state, multipart))]
pub async fn compress_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageResponse>, HttpAppError> {
    let mut form = extract_transform_form(multipart?).await?;
    let image = form.require_image(OperationKind::Compress)?;
    let params = CompressParams::from_form(form.text(QUALITY_FIELD));

    let response = state
        .workflow
        .execute(TransformRequest::Compress { image, params })
        .await?;
    Ok(Json(response))
}
