use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::error::ResponseError;

// 由外部认证服务签发，这里只负责校验。只信任sub，
// 其余声明（如role: "authenticated"）忽略，角色以用户资料为准
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: Uuid,
    #[serde(default)]
    iat: u64,
    exp: u64,
}

impl AccessTokenClaims {
    pub fn new(user_id: Uuid, expire: u64) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            sub: user_id,
            iat: now,
            exp: now + expire,
        }
    }
}

pub fn parse_access_token(jwt: &str, secret: &str) -> Result<AccessTokenClaims, ResponseError> {
    let token = decode::<AccessTokenClaims>(
        jwt,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        &ErrorKind::ExpiredSignature => {
            ResponseError::access_token_err("session expired", "access_token已过期")
        }
        _ => ResponseError::access_token_err(
            "invalid session",
            &format!("解码access_token错误，详细信息：{}", e),
        ),
    })?;
    Ok(token.claims)
}

pub fn generate_access_token(
    user_id: Uuid,
    secret: &str,
    expire: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let token = encode(
        &Header::default(),
        &AccessTokenClaims::new(user_id, expire),
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn token_round_trips_user_id() {
        let user_id = Uuid::new_v4();
        let token = generate_access_token(user_id, "secret", 60).unwrap();
        let claims = parse_access_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn hosted_auth_claims_are_accepted() {
        let user_id = Uuid::new_v4();
        let claims = json!({
            "sub": user_id,
            "aud": "authenticated",
            "role": "authenticated",
            "email": "jane.smith@university.edu",
            "exp": AccessTokenClaims::new(user_id, 60).exp,
        });
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap();
        assert_eq!(parse_access_token(&token, "secret").unwrap().sub, user_id);
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = generate_access_token(Uuid::new_v4(), "secret", 60).unwrap();
        let err = parse_access_token(&token, "other").unwrap_err();
        assert_eq!(err.status_code, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let claims = AccessTokenClaims {
            sub: Uuid::new_v4(),
            iat: 1,
            exp: 2,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap();
        let err = parse_access_token(&token, "secret").unwrap_err();
        assert_eq!(err.internal_message, "access_token已过期");
    }
}
