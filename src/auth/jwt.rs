use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::Claims;
use crate::{config::JwtConfig, state::AppState};

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig { secret, ttl_days } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::from_secs(ttl_days as u64 * 24 * 60 * 60),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Any malformed, tampered, or expired token is an error; no partial
    /// claims ever come back.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn verify_rejects_expired_token() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: (now - 1000) as usize,
            exp: (now - 120) as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_tampered_payload() {
        let keys = make_keys();
        let token_a = keys.sign(Uuid::new_v4()).expect("sign a");
        let token_b = keys.sign(Uuid::new_v4()).expect("sign b");

        // Payload of one token spliced with the signature of another.
        let parts_a: Vec<&str> = token_a.split('.').collect();
        let parts_b: Vec<&str> = token_b.split('.').collect();
        let forged = format!("{}.{}.{}", parts_a[0], parts_b[1], parts_a[2]);
        assert!(keys.verify(&forged).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_wrong_secret() {
        let keys = make_keys();
        let other = JwtKeys {
            encoding: EncodingKey::from_secret(b"other-secret"),
            decoding: DecodingKey::from_secret(b"other-secret"),
            ttl: keys.ttl,
        };
        let token = other.sign(Uuid::new_v4()).expect("sign");
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_garbage() {
        let keys = make_keys();
        assert!(keys.verify("not-a-jwt").is_err());
        assert!(keys.verify("").is_err());
    }
}
