use actix_web::{http::StatusCode, HttpResponse, HttpResponseBuilder};
use deadpool_postgres::{tokio_postgres, PoolError};
use derive_more::{Display, Error};
use serde_json::json;

use crate::store::StoreError;

#[derive(Debug, Display, Error)]
#[display(
    fmt = "{{err_code: {}, err_message: {}, internal_message: {}}}",
    err_code,
    err_message,
    internal_message
)]
pub struct ResponseError {
    pub err_code: u16,
    pub err_message: String,
    pub internal_message: String,
    pub status_code: StatusCode,
}

impl ResponseError {
    // 通用错误
    pub fn input_err(err_message: &str, internal_message: &str) -> Self {
        Self {
            err_code: 1,
            err_message: format!("Invalid input: {}", err_message),
            internal_message: internal_message.to_string(),
            status_code: StatusCode::BAD_REQUEST,
        }
    }

    pub fn permission_err(err_message: &str, internal_message: &str) -> Self {
        Self {
            err_code: 2,
            err_message: format!("Permission denied: {}", err_message),
            internal_message: internal_message.to_string(),
            status_code: StatusCode::FORBIDDEN,
        }
    }

    pub fn access_token_err(err_message: &str, internal_message: &str) -> Self {
        Self {
            err_code: 3,
            err_message: format!("Not signed in: {}", err_message),
            internal_message: internal_message.to_string(),
            status_code: StatusCode::UNAUTHORIZED,
        }
    }

    pub fn resource_not_found_err(err_message: &str, internal_message: &str) -> Self {
        Self {
            err_code: 4,
            err_message: err_message.to_string(),
            internal_message: internal_message.to_string(),
            status_code: StatusCode::NOT_FOUND,
        }
    }

    pub fn unsupported_err(err_message: &str, internal_message: &str) -> Self {
        Self {
            err_code: 5,
            err_message: format!("Not supported: {}", err_message),
            internal_message: internal_message.to_string(),
            status_code: StatusCode::NOT_IMPLEMENTED,
        }
    }

    pub fn store_err(err_message: &str, internal_message: &str) -> Self {
        Self {
            err_code: 6,
            err_message: format!("{}, please try again later", err_message),
            internal_message: internal_message.to_string(),
            status_code: StatusCode::BAD_GATEWAY,
        }
    }

    pub fn unexpected_err(err_message: &str, internal_message: &str) -> Self {
        Self {
            err_code: 0,
            err_message: format!("Unexpected error: {}", err_message),
            internal_message: internal_message.to_string(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl actix_web::error::ResponseError for ResponseError {
    fn status_code(&self) -> StatusCode {
        self.status_code
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponseBuilder::new(self.status_code())
            .json(json!({"err_code": self.err_code, "err_message": self.err_message}))
    }
}

impl From<PoolError> for ResponseError {
    fn from(error: PoolError) -> Self {
        Self {
            err_code: 501,
            err_message: "Database unavailable, please try again later".to_string(),
            internal_message: error.to_string(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<tokio_postgres::Error> for ResponseError {
    fn from(error: tokio_postgres::Error) -> Self {
        Self {
            err_code: 502,
            err_message: "Database query failed, please try again later".to_string(),
            internal_message: error.to_string(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for ResponseError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        Self {
            err_code: 503,
            err_message: "Invalid access token".to_string(),
            internal_message: error.to_string(),
            status_code: StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<StoreError> for ResponseError {
    fn from(error: StoreError) -> Self {
        Self {
            err_code: 504,
            err_message: "Data service unavailable, please try again later".to_string(),
            internal_message: error.to_string(),
            status_code: StatusCode::BAD_GATEWAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use actix_web::error::ResponseError as _;
    use actix_web::http::StatusCode;

    use super::ResponseError;

    #[actix_web::test]
    async fn error_body_hides_internal_message() {
        let err = ResponseError::resource_not_found_err("Notice not found", "公告不存在, ID: 42");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["err_code"], 4);
        assert_eq!(value["err_message"], "Notice not found");
        assert!(value.get("internal_message").is_none());
    }

    #[test]
    fn constructors_pick_their_status() {
        assert_eq!(ResponseError::input_err("x", "").status_code, StatusCode::BAD_REQUEST);
        assert_eq!(ResponseError::permission_err("x", "").status_code, StatusCode::FORBIDDEN);
        assert_eq!(ResponseError::access_token_err("x", "").status_code, StatusCode::UNAUTHORIZED);
        assert_eq!(ResponseError::unsupported_err("x", "").status_code, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(ResponseError::store_err("x", "").status_code, StatusCode::BAD_GATEWAY);
    }
}
