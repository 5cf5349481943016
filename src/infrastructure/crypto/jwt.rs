//! JWT Token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT configuration
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "dev-secret-key-change-in-production".to_string(),
            expiration_hours: 2,
            issuer: "vetcare".to_string(),
        }
    }
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: i32,
    pub username: String,
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
}

impl TokenClaims {
    pub fn new(user_id: i32, username: &str, role: &str, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: user_id,
            username: username.to_string(),
            role: role.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Create a signed token for a user
pub fn create_token(
    user_id: i32,
    username: &str,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = TokenClaims::new(user_id, username, role, config);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify and decode a token. Expiry and issuer are checked.
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip_keeps_identity() {
        let config = JwtConfig::default();
        let token = create_token(7, "lmartinez", "veterinarian", &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "lmartinez");
        assert_eq!(claims.role, "veterinarian");
        assert!(!claims.is_admin());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = JwtConfig::default();
        let token = create_token(1, "admin", "admin", &config).unwrap();

        let other = JwtConfig {
            secret: "another-secret".into(),
            ..JwtConfig::default()
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let config = JwtConfig::default();
        let token = create_token(1, "admin", "admin", &config).unwrap();

        let other = JwtConfig {
            issuer: "someone-else".into(),
            ..JwtConfig::default()
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = JwtConfig {
            expiration_hours: -1,
            ..JwtConfig::default()
        };
        let token = create_token(1, "admin", "admin", &config).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }
}
