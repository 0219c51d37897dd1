use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use once_cell::sync::OnceCell;

use crate::{error::AppError, services::jwt_service::Claims};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub authorities: Vec<String>,
}

impl AuthUser {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.sub,
            authorities: claims
                .authorities
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }
}

pub fn ensure_authority(user: &AuthUser, authority: &str) -> Result<(), AppError> {
    if !user.has_authority(authority) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_seller(user: &AuthUser) -> Result<(), AppError> {
    ensure_authority(user, "SELLER")
}

static DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

fn decoding_key() -> Result<&'static DecodingKey, AppError> {
    DECODING_KEY.get_or_try_init(|| {
        let path = std::env::var("JWT_PUBLIC_KEY_PATH")
            .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_PUBLIC_KEY_PATH is not set")))?;
        let pem = std::fs::read(&path).map_err(|err| {
            AppError::Internal(anyhow::anyhow!("failed to read {}: {}", path, err))
        })?;
        DecodingKey::from_rsa_pem(&pem)
            .map_err(|err| AppError::Internal(anyhow::anyhow!("invalid JWT public key: {}", err)))
    })
}

pub fn decode_token(token: &str, key: &DecodingKey) -> Result<Claims, AppError> {
    decode::<Claims>(token, key, &Validation::new(Algorithm::RS256))
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))
}

pub fn bearer_token(value: &str) -> Result<&str, AppError> {
    if !value.starts_with("Bearer ") {
        return Err(AppError::Unauthorized(
            "Invalid Authorization scheme".to_string(),
        ));
    }
    Ok(value.trim_start_matches("Bearer ").trim())
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".to_string()))?;

        let token = bearer_token(auth_str)?;
        let claims = decode_token(token, decoding_key()?)?;

        Ok(AuthUser::from(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_strips_scheme() {
        assert_eq!(bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        assert!(bearer_token("Basic dXNlcjpwdw==").is_err());
        assert!(bearer_token("abc.def.ghi").is_err());
    }

    #[test]
    fn authorities_split_from_claim() {
        let claims = Claims {
            sub: "seller@example.com".to_string(),
            iss: "user-service".to_string(),
            iat: 0,
            exp: 0,
            user_id: "64f000000000000000000001".to_string(),
            authorities: "SELLER CLIENT".to_string(),
        };
        let user = AuthUser::from(claims);
        assert!(user.has_authority("SELLER"));
        assert!(user.has_authority("CLIENT"));
        assert!(!user.has_authority("ADMIN"));
        assert!(ensure_seller(&user).is_ok());
    }

    #[test]
    fn missing_authority_is_forbidden() {
        let user = AuthUser {
            user_id: "64f000000000000000000001".to_string(),
            email: "client@example.com".to_string(),
            authorities: vec!["CLIENT".to_string()],
        };
        assert!(matches!(ensure_seller(&user), Err(AppError::Forbidden)));
    }
}
