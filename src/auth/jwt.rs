use std::time::Duration;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::config::JwtConfig;
use crate::state::AppState;
use axum::extract::FromRef;

/// JWT payload carried by issued bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // user id (24-hex ObjectId)
    pub username: String, // login name at issuance time
    pub iat: usize,       // issued at (unix timestamp)
    pub exp: usize,       // expires at (unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Signing and verification material, built once from immutable startup
/// config. Tokens are stateless; a leaked token stays valid until `exp`.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: Duration::from_secs((config.ttl_minutes.max(0) as u64) * 60),
        }
    }

    pub fn sign(&self, user_id: &ObjectId, username: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id.to_hex(),
            username: username.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Verifies signature and expiry always, issuer/audience only when
    /// configured. All failures collapse to one error for callers; the
    /// distinction exists only in logs.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        match &self.audience {
            Some(aud) => validation.set_audience(std::slice::from_ref(aud)),
            None => validation.validate_aud = false,
        }
        if let Some(iss) = &self.issuer {
            validation.set_issuer(std::slice::from_ref(iss));
        }
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(issuer: Option<&str>, audience: Option<&str>) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "dev-secret".into(),
            issuer: issuer.map(Into::into),
            audience: audience.map(Into::into),
            ttl_minutes: 5,
        })
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let keys = make_keys(Some("test-issuer"), Some("test-aud"));
        let user_id = ObjectId::new();
        let token = keys.sign(&user_id, "alice").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id.to_hex());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iss.as_deref(), Some("test-issuer"));
        assert_eq!(claims.aud.as_deref(), Some("test-aud"));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_without_issuer_or_audience_configured() {
        let keys = make_keys(None, None);
        let token = keys.sign(&ObjectId::new(), "bob").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert!(claims.iss.is_none());
        assert!(claims.aud.is_none());
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good = make_keys(Some("good-iss"), Some("good-aud"));
        let bad = make_keys(Some("bad-iss"), Some("bad-aud"));
        let token = good.sign(&ObjectId::new(), "carol").expect("sign");
        assert!(bad.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let keys = make_keys(None, None);
        let other = JwtKeys::new(&JwtConfig {
            secret: "other-secret".into(),
            issuer: None,
            audience: None,
            ttl_minutes: 5,
        });
        let token = keys.sign(&ObjectId::new(), "dave").expect("sign");
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys(None, None);
        // Pre-dated beyond the validator's default 60s leeway.
        let past = OffsetDateTime::now_utc() - TimeDuration::minutes(10);
        let claims = Claims {
            sub: ObjectId::new().to_hex(),
            username: "eve".into(),
            iat: (past - TimeDuration::minutes(5)).unix_timestamp() as usize,
            exp: past.unix_timestamp() as usize,
            iss: None,
            aud: None,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn keys_from_app_state() {
        let state = crate::state::AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign(&ObjectId::new(), "frank").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.iss.as_deref(), Some("test-issuer"));
        assert_eq!(claims.aud.as_deref(), Some("test-aud"));
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys(None, None);
        assert!(keys.verify("not.a.token").is_err());
    }
}
