use std::env;
use std::sync::Arc;

use crate::services::auth_service::{DemoTokenVerifier, JwtTokenVerifier, TokenVerifier};

const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:5173",
    "http://localhost:3000",
    "http://localhost:3001",
];

#[derive(Debug, Clone, PartialEq)]
pub enum AuthMode {
    /// Any bearer token is accepted as the uid
    Demo,
    Jwt {
        secret: String,
        issuer: Option<String>,
        audience: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
    pub cors_origins: Vec<String>,
    pub auth: AuthMode,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match get("PORT") {
            Some(p) => p.parse::<u16>().map_err(|_| format!("PORT must be a port number, got '{}'", p))?,
            None => 5000,
        };
        let database_url = get("DATABASE_URL").ok_or("DATABASE_URL must be set")?;
        let database_name = get("DATABASE_NAME").unwrap_or_else(|| "courseshare".to_string());

        let cors_origins = match get("CORS_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let auth = match get("AUTH_MODE").as_deref().unwrap_or("demo") {
            "demo" => AuthMode::Demo,
            "jwt" => AuthMode::Jwt {
                secret: get("JWT_SECRET").ok_or("JWT_SECRET must be set when AUTH_MODE=jwt")?,
                issuer: get("JWT_ISSUER"),
                audience: get("JWT_AUDIENCE"),
            },
            other => return Err(format!("Unknown AUTH_MODE '{}', expected 'demo' or 'jwt'", other)),
        };

        Ok(Self {
            host,
            port,
            database_url,
            database_name,
            cors_origins,
            auth,
        })
    }

    pub fn token_verifier(&self) -> Arc<dyn TokenVerifier> {
        match &self.auth {
            AuthMode::Demo => Arc::new(DemoTokenVerifier),
            AuthMode::Jwt { secret, issuer, audience } => {
                Arc::new(JwtTokenVerifier::new(secret, issuer.as_deref(), audience.as_deref()))
            }
        }
    }
}
