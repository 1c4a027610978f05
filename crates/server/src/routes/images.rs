//! Image upload and removal route handlers (the asset manager).
//!
//! Upload and removal are multi-step sequences against the object store and
//! the record store with no cross-call transaction. A failing step aborts
//! the operation; anything that already succeeded stays in place
//! (at-least-partial-success, never rollback).

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use cartinha_core::LetterId;

use crate::db::ImageRepository;
use crate::error::{AppError, Result};
use crate::plans;
use crate::services::storage::{file_extension, object_path};
use crate::state::AppState;

/// Query parameters for the upload endpoint.
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    /// Plan the letter was composed under; bounds the image count.
    pub plan: String,
}

/// One tracked image, as the client sees it.
#[derive(Debug, Serialize)]
pub struct ImageView {
    pub id: cartinha_core::ImageId,
    pub url: String,
}

/// Response for upload: the letter's full image list after the batch.
#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub images: Vec<ImageView>,
}

/// An uploaded file pulled out of the multipart body.
struct PendingFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Upload a batch of images for a letter.
///
/// POST /api/letters/{id}/images?plan={plan_id}
///
/// The whole batch is validated against the plan's image cap before any
/// storage call. Per file: upload the object, insert the tracking row,
/// compute the public URL. The first failing step fails the request;
/// earlier files in the batch remain uploaded and tracked.
#[instrument(skip(state, multipart), fields(letter_id = %id, plan = %query.plan))]
pub async fn upload(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<Json<ImagesResponse>> {
    let letter_id = LetterId::new(id);

    if state.letters().get(&letter_id).await.is_none() {
        return Err(AppError::NotFound(format!("letter {letter_id}")));
    }

    let plan = plans::find(&query.plan)
        .ok_or_else(|| AppError::Validation(format!("unknown plan: {}", query.plan)))?;

    let files = collect_files(multipart).await?;
    if files.is_empty() {
        return Err(AppError::Validation("no files in upload".to_string()));
    }

    let repo = ImageRepository::new(state.pool());
    let existing = usize::try_from(repo.count_for_letter(&letter_id).await?).unwrap_or(usize::MAX);

    // Cap check happens before any storage call; a rejected batch has zero
    // side effects.
    if plan.exceeds_image_cap(existing, files.len()) {
        return Err(AppError::Validation(format!(
            "Você pode fazer upload de no máximo {} imagens",
            plan.max_images
        )));
    }

    for (index, file) in files.into_iter().enumerate() {
        let path = object_path(
            letter_id.as_str(),
            Utc::now().timestamp_millis(),
            index,
            &file_extension(&file.file_name),
        );

        state
            .storage()
            .upload(&path, file.bytes, &file.content_type)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, %path, "Image upload failed at storage step");
            })?;

        repo.insert(&letter_id, &path).await.inspect_err(|e| {
            tracing::error!(error = %e, %path, "Image upload failed at tracking step; object remains in storage");
        })?;
    }

    let images = list_images(&state, &letter_id).await?;
    tracing::info!(letter_id = %letter_id, count = images.len(), "Images uploaded");

    Ok(Json(ImagesResponse { images }))
}

/// Remove one image from a letter by its position in upload order.
///
/// DELETE /api/letters/{id}/images/{index}
///
/// Storage deletion runs first, then the tracking row. A row-delete failure
/// after the object is gone is surfaced to the caller and leaves the known
/// inconsistency window.
#[instrument(skip(state), fields(letter_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<ImagesResponse>> {
    let letter_id = LetterId::new(id);
    let repo = ImageRepository::new(state.pool());

    let rows = repo.list_for_letter(&letter_id).await?;
    let Some(row) = rows.get(index) else {
        return Err(AppError::NotFound(format!(
            "image {index} of letter {letter_id}"
        )));
    };

    state
        .storage()
        .remove(std::slice::from_ref(&row.storage_path))
        .await?;

    repo.delete(row.id).await.inspect_err(|e| {
        tracing::error!(
            error = %e,
            path = %row.storage_path,
            "Tracking row delete failed after storage delete; row now points at a removed object"
        );
    })?;

    let images = list_images(&state, &letter_id).await?;
    Ok(Json(ImagesResponse { images }))
}

/// Pull every file field out of the multipart body.
async fn collect_files(mut multipart: Multipart) -> Result<Vec<PendingFile>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let Some(file_name) = field.file_name().map(ToString::to_string) else {
            // not a file field
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;

        files.push(PendingFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Ok(files)
}

/// The letter's current image list with public URLs, in upload order.
async fn list_images(state: &AppState, letter_id: &LetterId) -> Result<Vec<ImageView>> {
    let rows = ImageRepository::new(state.pool())
        .list_for_letter(letter_id)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| ImageView {
            id: row.id,
            url: state.storage().public_url(&row.storage_path),
        })
        .collect())
}
