//! 外部数据行到领域类型的转换
//!
//! 数据服务返回的行字段可能缺失或不合法，这里逐行校验，不合法的行记录日志后丢弃，
//! 不会进入筛选逻辑。

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::Deserialize;
use uuid::Uuid;

use crate::filter::{ALL_DEPARTMENTS, ALL_OFFICES};
use crate::model::comment::Comment;
use crate::model::notice::Notice;
use crate::model::user::UserRole;

pub const UNKNOWN_AUTHOR: &str = "Unknown";

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum RowError {
    #[display(fmt = "缺少字段{}", _0)]
    Missing(&'static str),
    #[display(fmt = "字段{}不合法: {}", field, reason)]
    Invalid { field: &'static str, reason: String },
    #[display(fmt = "字段{}使用了保留值: {}", field, value)]
    Reserved { field: &'static str, value: String },
}

impl std::error::Error for RowError {}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProfileRow {
    pub full_name: Option<String>,
    pub role: Option<String>,
}

// 不认识的字段说明行的结构与预期不符，整行拒绝，避免部门或办公室被悄悄丢掉
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoticeRow {
    pub id: Option<Uuid>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub profiles: Option<ProfileRow>,
    #[serde(alias = "department_id")]
    pub department: Option<String>,
    #[serde(alias = "office_id")]
    pub office: Option<String>,
    pub attachments: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub expire_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CommentRow {
    pub id: Option<Uuid>,
    pub notice_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub profiles: Option<ProfileRow>,
    pub content: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct NameRow {
    pub name: Option<String>,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, RowError> {
    value.ok_or(RowError::Missing(field))
}

fn display_name(direct: Option<String>, profile: Option<ProfileRow>) -> String {
    direct
        .or_else(|| profile.and_then(|p| p.full_name))
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

// 空字符串和保留值都表示面向全体
fn scope(value: Option<String>, sentinel: &str) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != sentinel)
}

impl TryFrom<NoticeRow> for Notice {
    type Error = RowError;

    fn try_from(row: NoticeRow) -> Result<Self, Self::Error> {
        let title = required(row.title, "title")?;
        if title.trim().is_empty() {
            return Err(RowError::Invalid {
                field: "title",
                reason: "标题为空".to_string(),
            });
        }
        Ok(Self {
            id: required(row.id, "id")?,
            title,
            content: required(row.content, "content")?,
            author_id: required(row.author_id, "author_id")?,
            author_name: display_name(row.author_name, row.profiles),
            department: scope(row.department, ALL_DEPARTMENTS),
            office: scope(row.office, ALL_OFFICES),
            attachments: row.attachments.unwrap_or_default(),
            // 缺少标记时按未激活处理
            is_active: row.is_active.unwrap_or(false),
            created_at: required(row.created_at, "created_at")?,
            expire_at: row.expire_at,
        })
    }
}

impl TryFrom<CommentRow> for Comment {
    type Error = RowError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: required(row.id, "id")?,
            notice_id: required(row.notice_id, "notice_id")?,
            user_id: required(row.user_id, "user_id")?,
            user_name: display_name(row.user_name, row.profiles),
            content: required(row.content, "content")?,
            created_at: required(row.created_at, "created_at")?,
        })
    }
}

pub fn parse_role(row: ProfileRow) -> Result<UserRole, RowError> {
    let role = required(row.role, "role")?;
    role.parse().map_err(|_| RowError::Invalid {
        field: "role",
        reason: format!("未知的角色{}", role),
    })
}

/// 部门或办公室名称，不能为空，也不能与保留值相同
pub fn parse_name(row: NameRow, field: &'static str, sentinel: &str) -> Result<String, RowError> {
    let name = required(row.name, field)?;
    if name.trim().is_empty() {
        return Err(RowError::Invalid {
            field,
            reason: "名称为空".to_string(),
        });
    }
    if name == sentinel {
        return Err(RowError::Reserved { field, value: name });
    }
    Ok(name)
}

/// 保留合法的行，丢弃并记录不合法的行
pub fn collect_valid<T, I>(rows: I, kind: &str) -> Vec<T>
where
    I: IntoIterator<Item = Result<T, RowError>>,
{
    rows.into_iter()
        .filter_map(|row| match row {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("丢弃不合法的{}数据: {}", kind, e);
                None
            }
        })
        .collect()
}
