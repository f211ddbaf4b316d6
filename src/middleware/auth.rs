use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::error::ApiError;
use crate::models::auth::{AuthenticatedUser, Claims};
use crate::models::user::Role;

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".into()))?;

        let secret = parts
            .extensions
            .get::<JwtSecret>()
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("JWT secret not configured")))?;

        decode_access_token(token, &secret.0)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".into()))
    }
}

/// Extension type to carry the JWT secret through request extensions.
#[derive(Clone)]
pub struct JwtSecret(pub String);

/// Gate for provider-only operations.
pub fn require_provider(user: &AuthenticatedUser) -> Result<(), ApiError> {
    match user.role {
        Role::Provider => Ok(()),
        Role::User => Err(ApiError::Forbidden("Provider access required".into())),
    }
}

pub fn decode_access_token(token: &str, secret: &str) -> Result<AuthenticatedUser, anyhow::Error> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &key, &validation)?;
    let claims = data.claims;

    Ok(AuthenticatedUser {
        user_id: claims.sub.parse()?,
        email: claims.email,
        role: claims.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    fn make_token(secret: &str, exp_offset: i64) -> (Uuid, String) {
        let now = Utc::now().timestamp();
        let user_id = Uuid::new_v4();
        let claims = Claims {
            sub: user_id.to_string(),
            email: "pat@example.com".into(),
            role: Role::Provider,
            iat: now as usize,
            exp: (now + exp_offset) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        (user_id, token)
    }

    #[test]
    fn test_decode_round_trip() {
        let (user_id, token) = make_token("secret", 3600);
        let user = decode_access_token(&token, "secret").unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.email, "pat@example.com");
        assert_eq!(user.role, Role::Provider);
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default decoding leeway
        let (_, token) = make_token("secret", -3600);
        assert!(decode_access_token(&token, "secret").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (_, token) = make_token("secret", 3600);
        assert!(decode_access_token(&token, "other").is_err());
    }

    #[test]
    fn test_require_provider() {
        let provider = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: "p@example.com".into(),
            role: Role::Provider,
        };
        let user = AuthenticatedUser {
            role: Role::User,
            ..provider.clone()
        };
        assert!(require_provider(&provider).is_ok());
        assert!(require_provider(&user).is_err());
    }
}
