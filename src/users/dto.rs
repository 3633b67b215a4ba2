use serde::{Deserialize, Serialize};

/// Replacement payload for PUT. Any `id` the caller supplies is ignored;
/// the stored id always wins.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub username: String,
    pub email: String,
    /// When present, re-hashed before storage. Plaintext is never persisted.
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
