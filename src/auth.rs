//! Access-token verification against the user pool's published signing
//! keys (JWKS). Keys are cached process-wide; the cache is refreshed at
//! most once per verification, when a token references an unknown key id
//! (standard rotation handling).

use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::CognitoConfig;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("failed to fetch signing keys: {0}")]
    Jwks(#[from] reqwest::Error),

    #[error("token is missing a key id")]
    MissingKeyId,

    #[error("token signed with unknown key")]
    UnknownKey,

    #[error("token is not an access token")]
    WrongTokenUse,

    #[error("token was issued for a different client")]
    WrongClient,
}

/// Claims this API reads from a verified access token. Cognito access
/// tokens carry `client_id` instead of an `aud` claim.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub token_use: String,
    pub client_id: String,
}

/// Profile claims read from the id token after login. The token arrives
/// directly from the provider over TLS, so only the payload is decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct IdClaims {
    pub sub: Uuid,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
}

pub struct TokenVerifier {
    http: reqwest::Client,
    jwks_url: String,
    issuer: String,
    client_id: String,
    keys: RwLock<HashMap<String, Jwk>>,
}

impl TokenVerifier {
    pub fn new(config: &CognitoConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            jwks_url: config.jwks_url(),
            issuer: config.issuer(),
            client_id: config.client_id.clone(),
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Verify signature, expiry, issuer, token-use and client binding.
    pub async fn verify(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let header = decode_header(token)?;
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;

        let jwk = match self.cached_key(&kid).await {
            Some(jwk) => jwk,
            None => self.refresh_keys(&kid).await?,
        };

        let decoding_key = DecodingKey::from_jwk(&jwk)?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_aud = false;

        let data = decode::<AccessClaims>(token, &decoding_key, &validation)?;

        if data.claims.token_use != "access" {
            return Err(AuthError::WrongTokenUse);
        }
        if data.claims.client_id != self.client_id {
            return Err(AuthError::WrongClient);
        }

        Ok(data.claims)
    }

    async fn cached_key(&self, kid: &str) -> Option<Jwk> {
        self.keys.read().await.get(kid).cloned()
    }

    async fn refresh_keys(&self, kid: &str) -> Result<Jwk, AuthError> {
        let set: JwkSet = self
            .http
            .get(&self.jwks_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut keys = self.keys.write().await;
        keys.clear();
        for jwk in set.keys {
            if let Some(id) = jwk.common.key_id.clone() {
                keys.insert(id, jwk);
            }
        }

        keys.get(kid).cloned().ok_or(AuthError::UnknownKey)
    }
}

/// Decode the id token payload without signature verification.
pub fn decode_id_claims(id_token: &str) -> Result<IdClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<IdClaims>(id_token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn unsigned_token(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        let signature = URL_SAFE_NO_PAD.encode("signature");
        format!("{header}.{body}.{signature}")
    }

    #[test]
    fn id_claims_decode_from_payload() {
        let token = unsigned_token(&serde_json::json!({
            "sub": "6f9619ff-8b86-4d01-b42d-00cf4fc964ff",
            "email": "ada@example.com",
            "given_name": "Ada",
            "family_name": "Lovelace",
            "token_use": "id",
        }));

        let claims = decode_id_claims(&token).unwrap();
        assert_eq!(
            claims.sub,
            "6f9619ff-8b86-4d01-b42d-00cf4fc964ff".parse::<Uuid>().unwrap()
        );
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.given_name, "Ada");
        assert_eq!(claims.family_name, "Lovelace");
    }

    #[test]
    fn id_claims_require_profile_fields() {
        let token = unsigned_token(&serde_json::json!({
            "sub": "6f9619ff-8b86-4d01-b42d-00cf4fc964ff",
        }));
        assert!(decode_id_claims(&token).is_err());
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert!(decode_id_claims("not-a-jwt").is_err());
    }
}
