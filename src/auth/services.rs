use tracing::{info, warn};

use super::dto::RegisterInput;
use super::jwt::JwtKeys;
use super::password::{hash_password, verify_password};
use crate::error::ServiceError;
use crate::store::UserStore;
use crate::users::image::validate_image;
use crate::users::repo_types::User;

const INVALID_CREDENTIALS: &str = "Invalid credentials.";

/// Registers a new account. The username pre-check is an early reject
/// only; the store's unique index settles concurrent registrations.
pub async fn register(store: &dyn UserStore, input: RegisterInput) -> Result<User, ServiceError> {
    if input.username.trim().is_empty() {
        return Err(ServiceError::Validation("Username must not be empty.".into()));
    }

    if store.find_by_username(&input.username).await?.is_some() {
        warn!(username = %input.username, "username already registered");
        return Err(ServiceError::Conflict("Username already exists.".into()));
    }

    let password_hash = hash_password(&input.password).map_err(ServiceError::storage)?;

    let profile_image = match input.profile_image {
        Some((filename, bytes)) => {
            validate_image(&filename, bytes.len())?;
            Some(bytes.to_vec())
        }
        None => None,
    };

    let user = store
        .create(User {
            id: None,
            username: input.username,
            email: input.email,
            password_hash,
            profile_image,
        })
        .await?;

    info!(user_id = %user.id.unwrap_or_default(), username = %user.username, "user registered");
    Ok(user)
}

/// Verifies credentials and issues a bearer token. Unknown username and
/// wrong password yield the same outcome and message.
pub async fn authenticate(
    store: &dyn UserStore,
    keys: &JwtKeys,
    username: &str,
    password: &str,
) -> Result<String, ServiceError> {
    let user = match store.find_by_username(username).await? {
        Some(u) => u,
        None => {
            warn!(username = %username, "signin unknown username");
            return Err(ServiceError::Auth(INVALID_CREDENTIALS.into()));
        }
    };

    if !verify_password(password, &user.password_hash) {
        warn!(username = %username, "signin invalid password");
        return Err(ServiceError::Auth(INVALID_CREDENTIALS.into()));
    }

    let user_id = user
        .id
        .ok_or_else(|| ServiceError::storage(anyhow::anyhow!("stored user missing id")))?;
    let token = keys
        .sign(&user_id, &user.username)
        .map_err(ServiceError::storage)?;

    info!(user_id = %user_id, username = %user.username, "user signed in");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::config::JwtConfig;
    use crate::store::memory::MemoryUserStore;

    fn keys() -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "test-secret".into(),
            issuer: None,
            audience: None,
            ttl_minutes: 5,
        })
    }

    fn input(username: &str, password: &str) -> RegisterInput {
        RegisterInput {
            username: username.into(),
            email: format!("{username}@example.com"),
            password: password.into(),
            profile_image: None,
        }
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let store = MemoryUserStore::default();
        let user = register(&store, input("alice", "hunter2!")).await.unwrap();
        assert!(user.id.is_some());

        let token = authenticate(&store, &keys(), "alice", "hunter2!")
            .await
            .unwrap();
        let claims = keys().verify(&token).unwrap();
        assert_eq!(claims.sub, user.id.unwrap().to_hex());
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn register_stores_hash_not_plaintext() {
        let store = MemoryUserStore::default();
        let user = register(&store, input("alice", "hunter2!")).await.unwrap();
        assert_ne!(user.password_hash, "hunter2!");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts_and_keeps_original() {
        let store = MemoryUserStore::default();
        let original = register(&store, input("alice", "first-pw")).await.unwrap();

        let err = register(&store, input("alice", "second-pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let kept = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(kept.id, original.id);
        assert_eq!(kept.password_hash, original.password_hash);
    }

    #[tokio::test]
    async fn register_rejects_empty_username() {
        let store = MemoryUserStore::default();
        let err = register(&store, input("  ", "pw")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn register_rejects_bad_image_and_accepts_mixed_case() {
        let store = MemoryUserStore::default();

        let mut bad = input("alice", "pw");
        bad.profile_image = Some(("avatar.exe".into(), Bytes::from_static(b"MZ")));
        let err = register(&store, bad).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let mut ok = input("alice", "pw");
        ok.profile_image = Some(("avatar.PNG".into(), Bytes::from_static(b"\x89PNG")));
        let user = register(&store, ok).await.unwrap();
        assert_eq!(user.profile_image.as_deref(), Some(b"\x89PNG".as_slice()));
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_are_indistinguishable() {
        let store = MemoryUserStore::default();
        register(&store, input("alice", "right-pw")).await.unwrap();

        let unknown = authenticate(&store, &keys(), "nobody", "whatever")
            .await
            .unwrap_err();
        let wrong = authenticate(&store, &keys(), "alice", "wrong-pw")
            .await
            .unwrap_err();

        match (&unknown, &wrong) {
            (ServiceError::Auth(a), ServiceError::Auth(b)) => assert_eq!(a, b),
            other => panic!("expected matching auth errors, got {other:?}"),
        }
    }
}
