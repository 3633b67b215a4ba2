use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::jwt::{Claims, JwtKeys};
use crate::error::ServiceError;

/// Extracts and validates the bearer token on protected routes.
#[derive(Debug)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServiceError::Auth("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| ServiceError::Auth("Invalid Authorization header".into()))?;

        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ServiceError::Auth("Invalid or expired token".into())
        })?;

        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header, Request};
    use mongodb::bson::oid::ObjectId;

    use super::*;
    use crate::auth::jwt::JwtKeys;
    use crate::state::AppState;

    async fn extract(auth_header: Option<String>) -> Result<AuthUser, ServiceError> {
        let state = AppState::fake();
        let mut builder = Request::builder().uri("/api/users/anything");
        if let Some(value) = auth_header {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, &state).await
    }

    #[tokio::test]
    async fn valid_bearer_token_yields_claims() {
        let keys = JwtKeys::from_ref(&AppState::fake());
        let user_id = ObjectId::new();
        let token = keys.sign(&user_id, "alice").expect("sign");

        let AuthUser(claims) = extract(Some(format!("Bearer {token}"))).await.unwrap();
        assert_eq!(claims.sub, user_id.to_hex());
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let err = extract(None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Auth(_)));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_unauthorized() {
        let err = extract(Some("Basic YWxpY2U6cHc=".into())).await.unwrap_err();
        assert!(matches!(err, ServiceError::Auth(_)));
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let err = extract(Some("Bearer not.a.token".into())).await.unwrap_err();
        assert!(matches!(err, ServiceError::Auth(_)));
    }
}
