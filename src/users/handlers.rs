use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::instrument;

use super::dto::{MessageResponse, UpdateUserRequest};
use super::repo_types::UserResponse;
use super::services;
use crate::auth::extractors::AuthUser;
use crate::error::ServiceError;
use crate::state::AppState;

#[instrument(skip(state, auth), fields(subject = %auth.0.sub))]
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ServiceError> {
    let user = services::get_user(state.store.as_ref(), &id).await?;
    Ok(Json(UserResponse::from(&user)))
}

#[instrument(skip(state, auth, payload), fields(subject = %auth.0.sub))]
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<StatusCode, ServiceError> {
    services::update_user(state.store.as_ref(), &id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, auth), fields(subject = %auth.0.sub))]
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    services::delete_user(state.store.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, auth, multipart), fields(subject = %auth.0.sub))]
pub async fn upload_profile_image(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<MessageResponse>, ServiceError> {
    let bad = |e: axum::extract::multipart::MultipartError| ServiceError::Validation(e.to_string());

    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(bad)?;
            file = Some((filename, bytes));
        }
    }
    let (filename, bytes) = file.ok_or_else(|| ServiceError::Validation("No file uploaded.".into()))?;

    services::upload_profile_image(state.store.as_ref(), &id, &filename, bytes).await?;
    Ok(Json(MessageResponse {
        message: "Profile image uploaded successfully.".into(),
    }))
}

#[instrument(skip(state, auth), fields(subject = %auth.0.sub))]
pub async fn get_profile_image(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let bytes = services::get_profile_image(state.store.as_ref(), &id).await?;
    // Stored images are always served as jpeg regardless of the uploaded
    // extension; observable behavior of the original deployment.
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}
