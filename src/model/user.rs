use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Display, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    #[serde(rename = "admin")]
    #[display(fmt = "admin")]
    Admin,
    #[serde(rename = "staff")]
    #[display(fmt = "staff")]
    Staff,
    #[serde(rename = "student")]
    #[display(fmt = "student")]
    Student,
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "student" => Ok(Self::Student),
            _ => Err(s.to_string()),
        }
    }
}

/// 当前请求的登录会话，由处理函数显式传递
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Session {
    pub fn can_author(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Staff)
    }
}
