//! Image analysis endpoint
//!
//! POST /analyze runs save → classify → log → render, in that order, within
//! the request. Only the save step can fail the request once the form is
//! read; classification always yields a label and the log write is
//! best-effort.

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use moodlog_common::db::MAX_NAME_LEN;
use tracing::{error, info, warn};

use super::pages;
use crate::{ApiError, AppState};

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image_file";

/// Multipart field carrying the optional display name
pub const NAME_FIELD: &str = "user_name";

/// Name stored when the form has none
pub const DEFAULT_USER_NAME: &str = "Anonymous";

/// File part of the form
#[derive(Debug)]
pub struct UploadedImage {
    pub filename: String,
    pub contents: Bytes,
}

/// Parsed analyze form
#[derive(Debug, Default)]
pub struct AnalyzeForm {
    pub user_name: Option<String>,
    pub image: Option<UploadedImage>,
}

/// Read the form fields; unknown fields are skipped
pub async fn read_form(mut multipart: Multipart) -> Result<AnalyzeForm, MultipartError> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            NAME_FIELD => {
                form.user_name = Some(field.text().await?);
            }
            IMAGE_FIELD => {
                let filename = field.file_name().unwrap_or("").to_string();
                let contents = field.bytes().await?;
                form.image = Some(UploadedImage { filename, contents });
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Trim the submitted name, default it, and fit it to the column limit
pub fn normalize_user_name(raw: Option<&str>) -> String {
    let trimmed = raw.map(str::trim).unwrap_or("");
    if trimmed.is_empty() {
        return DEFAULT_USER_NAME.to_string();
    }
    trimmed.chars().take(MAX_NAME_LEN).collect()
}

/// Where a rejected form is sent: the referring page, else the home page
fn redirect_back(headers: &HeaderMap) -> Response {
    let target = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or("/");
    Redirect::to(target).into_response()
}

/// POST /analyze
///
/// Validation failures (not multipart, no image part, empty filename,
/// unreadable form) redirect without detail and write nothing. A body over
/// the upload limit is answered with 413 instead.
pub async fn analyze_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(e) => {
            warn!("Analyze request is not a multipart form: {}", e);
            return Ok(redirect_back(&headers));
        }
    };

    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!(limit = state.max_upload_bytes, "Upload rejected: {}", e);
            return Ok((e.status(), e.body_text()).into_response());
        }
        Err(e) => {
            warn!("Unreadable upload form: {}", e);
            return Ok(redirect_back(&headers));
        }
    };

    let Some(image) = form.image else {
        error!("No file part in request");
        return Ok(redirect_back(&headers));
    };

    if image.filename.is_empty() {
        warn!("No selected file");
        return Ok(redirect_back(&headers));
    }

    let user_name = normalize_user_name(form.user_name.as_deref());

    let filename = state
        .images
        .save(&image.filename, &image.contents)
        .await
        .map_err(|e| {
            error!("Error saving file: {}", e);
            ApiError::SaveFailed(e)
        })?;

    let image_path = state.images.path_for(&filename);
    let emotion_result = state.classifier.classify(&image_path).await;

    match moodlog_common::db::append_log(&state.db, &user_name, &filename, &emotion_result).await {
        Ok(id) => info!(id, user = %user_name, "Saved analysis to database"),
        Err(e) => error!("Error saving to database: {}", e),
    }

    Ok(Html(pages::result_page(&emotion_result, &filename)).into_response())
}
