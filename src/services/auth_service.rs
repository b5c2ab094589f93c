use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::utils::AppError;

/// Authenticated caller, inserted into request extensions by `AuthMiddleware`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: String,
}

/// Turns a bearer token into an identity. Handlers only ever see `Identity`,
/// so the verifier can be swapped without touching them.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AppError>;
}

/// Accepts any non-empty token and uses it as the uid.
/// Not an authentication boundary; meant for local development and demos.
pub struct DemoTokenVerifier;

#[async_trait]
impl TokenVerifier for DemoTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::Unauthorized("Token is not valid".into()));
        }

        Ok(Identity {
            uid: token.to_string(),
            email: "user@example.com".to_string(),
            display_name: "Demo User".to_string(),
            photo_url: String::new(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// HS256 JWT verification with optional issuer/audience checks
pub struct JwtTokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    pub fn new(secret: &str, issuer: Option<&str>, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        if let Some(iss) = issuer {
            validation.set_issuer(&[iss]);
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl TokenVerifier for JwtTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AppError> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::warn!("⚠️ Token rejected: {}", e);
                AppError::Unauthorized("Token is not valid".into())
            })?;

        let email = claims.email.unwrap_or_default();
        let display_name = claims
            .name
            .or_else(|| email.split('@').next().filter(|s| !s.is_empty()).map(str::to_string))
            .unwrap_or_else(|| "User".to_string());

        Ok(Identity {
            uid: claims.sub,
            email,
            display_name,
            photo_url: claims.picture.unwrap_or_default(),
        })
    }
}
