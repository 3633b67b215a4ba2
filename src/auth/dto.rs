use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Parsed fields of the multipart signup form.
#[derive(Debug)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Filename and raw bytes of the optional profile image.
    pub profile_image: Option<(String, Bytes)>,
}

/// Request body for signin.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response returned after a successful signin.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}
