use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// User record as persisted in the users collection.
///
/// The whole struct round-trips through BSON, so `password_hash` is
/// serialized into the stored document; it must never appear in an HTTP
/// response — handlers return [`UserResponse`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_bytes")]
    pub profile_image: Option<Vec<u8>>,
}

/// Public view of a user returned to clients.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}
