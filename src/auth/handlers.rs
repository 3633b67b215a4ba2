use axum::{
    extract::{FromRef, Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

use super::dto::{LoginRequest, LoginResponse, RegisterInput};
use super::jwt::JwtKeys;
use super::services;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::users::repo_types::UserResponse;

async fn parse_signup_form(mut multipart: Multipart) -> Result<RegisterInput, ServiceError> {
    let bad = |e: axum::extract::multipart::MultipartError| ServiceError::Validation(e.to_string());

    let mut username = None;
    let mut email = None;
    let mut password = None;
    let mut profile_image = None;

    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "username" => username = Some(field.text().await.map_err(bad)?),
            "email" => email = Some(field.text().await.map_err(bad)?),
            "password" => password = Some(field.text().await.map_err(bad)?),
            "profileImage" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad)?;
                if !filename.is_empty() || !bytes.is_empty() {
                    profile_image = Some((filename, bytes));
                }
            }
            _ => {}
        }
    }

    let missing = |f: &str| ServiceError::Validation(format!("Missing field: {f}."));
    Ok(RegisterInput {
        username: username.ok_or_else(|| missing("username"))?,
        email: email.ok_or_else(|| missing("email"))?,
        password: password.ok_or_else(|| missing("password"))?,
        profile_image,
    })
}

#[instrument(skip(state, multipart))]
pub async fn signup(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UserResponse>), ServiceError> {
    let input = parse_signup_form(multipart).await?;
    let user = services::register(state.store.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    let keys = JwtKeys::from_ref(&state);
    let token = services::authenticate(
        state.store.as_ref(),
        &keys,
        &payload.username,
        &payload.password,
    )
    .await?;
    Ok(Json(LoginResponse {
        message: "Sign in successful!".into(),
        token,
    }))
}
