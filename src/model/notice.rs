use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::comment::Comment;
use crate::scroll::board::BoardCard;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub department: Option<String>,
    pub office: Option<String>,
    pub attachments: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub expire_at: Option<DateTime<Utc>>,
}

impl Notice {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expire_at, Some(expire_at) if expire_at <= now)
    }
}

// 写入存储的新公告，部门和办公室为None表示面向全体
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotice {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub department: Option<String>,
    pub office: Option<String>,
    pub attachments: Vec<String>,
    pub expire_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GetNoticesQuery {
    pub search: Option<String>,
    pub department: Option<String>,
    pub office: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GetNoticesOutput<'a> {
    pub notices: Vec<&'a Notice>,
    pub total: usize,
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct GetNoticePath {
    pub notice_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct GetAttachmentPath {
    pub notice_id: Uuid,
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub struct GetNoticeOutput {
    pub notice: Notice,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
pub struct PostNoticeInput {
    pub title: String,
    pub content: String,
    pub department: String,
    pub office: String,
    pub expire_at: Option<DateTime<Utc>>,
    pub attachments: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct GetBoardOutput {
    pub cards: Vec<BoardCard>,
    pub scroll_step: f64,
    pub refresh_rate: u32,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::Notice;

    fn notice(expire_at: Option<chrono::DateTime<Utc>>) -> Notice {
        Notice {
            id: Uuid::new_v4(),
            title: "Library hours".to_string(),
            content: "Open late during exams".to_string(),
            author_id: Uuid::new_v4(),
            author_name: "Unknown".to_string(),
            department: None,
            office: Some("Library".to_string()),
            attachments: Vec::new(),
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            expire_at,
        }
    }

    #[test]
    fn notice_without_expiry_never_expires() {
        assert!(!notice(None).is_expired(Utc::now()));
    }

    #[test]
    fn notice_expires_at_its_deadline() {
        let now = Utc::now();
        assert!(notice(Some(now)).is_expired(now));
        assert!(notice(Some(now - Duration::days(1))).is_expired(now));
        assert!(!notice(Some(now + Duration::days(1))).is_expired(now));
    }
}
