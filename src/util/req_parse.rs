use actix_web::{http::header, web, HttpMessage, HttpRequest};
use tracing_actix_web::RootSpan;

use crate::config::JWTConfig;
use crate::error::ResponseError;
use crate::model::user::Session;
use crate::store::NoticeStoreClient;
use crate::util::jwt::parse_access_token;

pub fn get_access_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// 令牌只用来确认用户身份，角色从用户资料中读取
pub async fn get_session(req: &HttpRequest) -> Result<Session, ResponseError> {
    let access_token = get_access_token(req).ok_or_else(|| {
        ResponseError::access_token_err("please sign in first", "无法从头部获取access_token")
    })?;
    let jwt_config = req.app_data::<web::Data<JWTConfig>>().ok_or_else(|| {
        ResponseError::unexpected_err("session check failed", "没有注册JWTConfig")
    })?;
    let claims = parse_access_token(access_token, &jwt_config.token_secret)?;
    if let Some(span) = req.extensions().get::<RootSpan>() {
        span.record("user_id", &tracing::field::display(claims.sub));
    }
    let store = req.app_data::<web::Data<NoticeStoreClient>>().ok_or_else(|| {
        ResponseError::unexpected_err("session check failed", "没有注册NoticeStoreClient")
    })?;
    let role = store
        .get_role(claims.sub)
        .await
        .map_err(|e| ResponseError::store_err("Failed to load your profile", &e.to_string()))?
        .ok_or_else(|| {
            ResponseError::access_token_err(
                "profile not found",
                &format!("[用户ID: {}]没有用户资料", claims.sub),
            )
        })?;
    Ok(Session {
        user_id: claims.sub,
        role,
    })
}

/// 只有管理员和教职工可以发布和管理公告
pub async fn get_author_session(req: &HttpRequest) -> Result<Session, ResponseError> {
    let session = get_session(req).await?;
    if !session.can_author() {
        return Err(ResponseError::permission_err(
            "only staff can manage notices",
            &format!("[用户ID: {}]角色为{}, 没有管理公告的权限", session.user_id, session.role),
        ));
    }
    Ok(session)
}
