use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::error;

use crate::dto::claims_dto::Claims;

/// Verification key for bearer tokens, installed as a request extension.
#[derive(Clone)]
pub struct JwtKeys {
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self { decoding: Arc::new(DecodingKey::from_secret(secret)) }
    }
}

/// Caller authenticated by a valid `Authorization: Bearer` token.
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let keys = parts
            .extensions
            .get::<JwtKeys>()
            .cloned()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "Token verification is not configured"))?;

        let token = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .ok_or((StatusCode::UNAUTHORIZED, "Missing or invalid Authorization header"))?;

        let claims = decode::<Claims>(token, &keys.decoding, &Validation::default()).map_err(|e| {
            error!("Token decoding failed: {:?}", e);
            (StatusCode::UNAUTHORIZED, "Invalid token")
        })?;

        Ok(AuthUser(claims.claims))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    fn token(secret: &[u8], exp: usize) -> String {
        let claims = Claims { sub: "auctioneer".to_string(), exp };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn far_future() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    async fn extract(authorization: Option<String>) -> Result<AuthUser, (StatusCode, &'static str)> {
        let mut builder = Request::builder().uri("/api/v1/bidding/player");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        parts.extensions.insert(JwtKeys::new(b"test-secret"));
        AuthUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn valid_token_yields_claims() {
        let AuthUser(claims) = extract(Some(format!("Bearer {}", token(b"test-secret", far_future()))))
            .await
            .unwrap_or_else(|_| panic!("token should be accepted"));
        assert_eq!(claims.sub, "auctioneer");
    }

    #[tokio::test]
    async fn missing_or_foreign_tokens_are_unauthorized() {
        let missing = extract(None).await.err().unwrap();
        assert_eq!(missing.0, StatusCode::UNAUTHORIZED);

        let foreign = extract(Some(format!("Bearer {}", token(b"other-secret", far_future()))))
            .await
            .err()
            .unwrap();
        assert_eq!(foreign.0, StatusCode::UNAUTHORIZED);

        let expired = extract(Some(format!("Bearer {}", token(b"test-secret", 1)))).await.err().unwrap();
        assert_eq!(expired.0, StatusCode::UNAUTHORIZED);
    }
}
