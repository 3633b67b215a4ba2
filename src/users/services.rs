use bytes::Bytes;
use mongodb::bson::oid::ObjectId;
use tracing::{debug, info};

use super::dto::UpdateUserRequest;
use super::image::validate_image;
use super::repo_types::User;
use crate::auth::password::hash_password;
use crate::error::ServiceError;
use crate::store::UserStore;

/// A syntactically invalid id cannot name any record, so it maps to the
/// same outcome as an unknown one.
fn parse_id(id: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(id).map_err(|_| ServiceError::NotFound)
}

pub async fn get_user(store: &dyn UserStore, id: &str) -> Result<User, ServiceError> {
    let id = parse_id(id)?;
    store.find_by_id(&id).await?.ok_or(ServiceError::NotFound)
}

/// Full replacement of the mutable fields. The stored id and profile image
/// are carried over regardless of the submitted payload; a supplied
/// password is re-hashed.
pub async fn update_user(
    store: &dyn UserStore,
    id: &str,
    req: UpdateUserRequest,
) -> Result<(), ServiceError> {
    let id = parse_id(id)?;
    let existing = store.find_by_id(&id).await?.ok_or(ServiceError::NotFound)?;

    if let Some(supplied) = &req.id {
        if *supplied != id.to_hex() {
            debug!(supplied = %supplied, "ignoring client-supplied id in update payload");
        }
    }

    let password_hash = match req.password {
        Some(plain) => hash_password(&plain).map_err(ServiceError::storage)?,
        None => existing.password_hash,
    };

    let replacement = User {
        id: existing.id,
        username: req.username,
        email: req.email,
        password_hash,
        profile_image: existing.profile_image,
    };
    store.replace(&id, replacement).await?;

    info!(user_id = %id, "user updated");
    Ok(())
}

pub async fn delete_user(store: &dyn UserStore, id: &str) -> Result<(), ServiceError> {
    let id = parse_id(id)?;
    store.find_by_id(&id).await?.ok_or(ServiceError::NotFound)?;
    store.delete(&id).await?;

    info!(user_id = %id, "user deleted");
    Ok(())
}

pub async fn upload_profile_image(
    store: &dyn UserStore,
    id: &str,
    filename: &str,
    bytes: Bytes,
) -> Result<(), ServiceError> {
    let id = parse_id(id)?;
    store.find_by_id(&id).await?.ok_or(ServiceError::NotFound)?;
    validate_image(filename, bytes.len())?;
    store.set_profile_image(&id, bytes.to_vec()).await?;

    info!(user_id = %id, size = bytes.len(), "profile image stored");
    Ok(())
}

/// Absent user and absent image both collapse to `NotFound`.
pub async fn get_profile_image(store: &dyn UserStore, id: &str) -> Result<Vec<u8>, ServiceError> {
    let id = parse_id(id)?;
    let user = store.find_by_id(&id).await?.ok_or(ServiceError::NotFound)?;
    user.profile_image.ok_or(ServiceError::NotFound)
}
