use futures::future::{BoxFuture, FutureExt};
use reqwest::{header, ClientBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

use super::adapter::{collect_valid, parse_name, parse_role, CommentRow, NameRow, NoticeRow, ProfileRow, RowError};
use super::{NoticeStore, StoreError};
use crate::config::RestConfig;
use crate::filter::{ALL_DEPARTMENTS, ALL_OFFICES};
use crate::model::comment::{Comment, NewComment};
use crate::model::notice::{NewNotice, Notice};
use crate::model::user::UserRole;

const NOTICE_SELECT: &str = "id,title,content,author_id,department:department_id,office:office_id,attachments,is_active,created_at,expire_at,profiles:author_id(full_name)";
const COMMENT_SELECT: &str = "id,notice_id,user_id,content,created_at,profiles:user_id(full_name)";

/// PostgREST风格的HTTP数据服务
pub struct RestNoticeStore {
    api: String,
    request_client: reqwest::Client,
}

impl RestNoticeStore {
    pub fn new(config: &RestConfig) -> Result<Self, StoreError> {
        let invalid_key = |e: header::InvalidHeaderValue| StoreError::Config(format!("api_key不合法: {}", e));
        let mut headers = header::HeaderMap::new();
        headers.insert("apikey", header::HeaderValue::from_str(&config.api_key).map_err(invalid_key)?);
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(invalid_key)?,
        );
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        let request_client = ClientBuilder::new()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .timeout(Duration::from_secs(config.whole_timeout))
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout))
            .build()?;

        Ok(Self {
            api: format!("{}/rest/v1/", config.url.trim_end_matches('/')),
            request_client,
        })
    }

    async fn select(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<Value>, StoreError> {
        let response = self
            .request_client
            .get(format!("{}{}", self.api, table))
            .query(query)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn insert(&self, table: &str, row: Value, select: &str) -> Result<Value, StoreError> {
        let response = self
            .request_client
            .post(format!("{}{}", self.api, table))
            .query(&[("select", select)])
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?;
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::Malformed(RowError::Missing("inserted row")))
    }

    async fn rows(response: reqwest::Response) -> Result<Vec<Value>, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                code: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<Vec<Value>>().await?)
    }

    async fn names(&self, table: &str, field: &'static str, sentinel: &str) -> Result<Vec<String>, StoreError> {
        let values = self
            .select(
                table,
                &[("select", "name".to_string()), ("order", "name.asc".to_string())],
            )
            .await?;
        Ok(collect_valid(
            values
                .into_iter()
                .map(|v| parse_name(decode::<NameRow>(v)?, field, sentinel)),
            field,
        ))
    }
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R, RowError> {
    serde_json::from_value(value).map_err(|e| RowError::Invalid {
        field: "row",
        reason: e.to_string(),
    })
}

fn notice_from_value(value: Value) -> Result<Notice, RowError> {
    Notice::try_from(decode::<NoticeRow>(value)?)
}

fn comment_from_value(value: Value) -> Result<Comment, RowError> {
    Comment::try_from(decode::<CommentRow>(value)?)
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

impl NoticeStore for RestNoticeStore {
    fn fetch_active_notices(&self) -> BoxFuture<'_, Result<Vec<Notice>, StoreError>> {
        async move {
            let values = self
                .select(
                    "notices",
                    &[
                        ("select", NOTICE_SELECT.to_string()),
                        ("is_active", eq(true)),
                        ("order", "created_at.desc".to_string()),
                    ],
                )
                .await?;
            Ok(collect_valid(values.into_iter().map(notice_from_value), "公告"))
        }
        .boxed()
    }

    fn fetch_notice(&self, notice_id: Uuid) -> BoxFuture<'_, Result<Option<Notice>, StoreError>> {
        async move {
            let values = self
                .select(
                    "notices",
                    &[
                        ("select", NOTICE_SELECT.to_string()),
                        ("id", eq(notice_id)),
                        ("limit", "1".to_string()),
                    ],
                )
                .await?;
            match values.into_iter().next() {
                Some(v) => Ok(Some(notice_from_value(v)?)),
                None => Ok(None),
            }
        }
        .boxed()
    }

    fn fetch_notices_by_author(&self, author_id: Uuid) -> BoxFuture<'_, Result<Vec<Notice>, StoreError>> {
        async move {
            let values = self
                .select(
                    "notices",
                    &[
                        ("select", NOTICE_SELECT.to_string()),
                        ("author_id", eq(author_id)),
                        ("order", "created_at.desc".to_string()),
                    ],
                )
                .await?;
            Ok(collect_valid(values.into_iter().map(notice_from_value), "公告"))
        }
        .boxed()
    }

    fn fetch_departments(&self) -> BoxFuture<'_, Result<Vec<String>, StoreError>> {
        async move { self.names("departments", "department", ALL_DEPARTMENTS).await }.boxed()
    }

    fn fetch_offices(&self) -> BoxFuture<'_, Result<Vec<String>, StoreError>> {
        async move { self.names("offices", "office", ALL_OFFICES).await }.boxed()
    }

    fn insert_notice(&self, notice: NewNotice) -> BoxFuture<'_, Result<Notice, StoreError>> {
        async move {
            let row = json!({
                "title": notice.title,
                "content": notice.content,
                "author_id": notice.author_id,
                "department_id": notice.department,
                "office_id": notice.office,
                "attachments": notice.attachments,
                "expire_at": notice.expire_at,
                "is_active": true,
            });
            let value = self.insert("notices", row, NOTICE_SELECT).await?;
            Ok(notice_from_value(value)?)
        }
        .boxed()
    }

    fn fetch_comments(&self, notice_id: Uuid) -> BoxFuture<'_, Result<Vec<Comment>, StoreError>> {
        async move {
            let values = self
                .select(
                    "comments",
                    &[
                        ("select", COMMENT_SELECT.to_string()),
                        ("notice_id", eq(notice_id)),
                        ("order", "created_at.asc".to_string()),
                    ],
                )
                .await?;
            Ok(collect_valid(values.into_iter().map(comment_from_value), "评论"))
        }
        .boxed()
    }

    fn insert_comment(&self, comment: NewComment) -> BoxFuture<'_, Result<Comment, StoreError>> {
        async move {
            let row = json!({
                "notice_id": comment.notice_id,
                "user_id": comment.user_id,
                "content": comment.content,
            });
            let value = self.insert("comments", row, COMMENT_SELECT).await?;
            Ok(comment_from_value(value)?)
        }
        .boxed()
    }

    fn fetch_role(&self, user_id: Uuid) -> BoxFuture<'_, Result<Option<UserRole>, StoreError>> {
        async move {
            let values = self
                .select(
                    "profiles",
                    &[
                        ("select", "role".to_string()),
                        ("id", eq(user_id)),
                        ("limit", "1".to_string()),
                    ],
                )
                .await?;
            match values.into_iter().next() {
                Some(v) => Ok(Some(parse_role(decode::<ProfileRow>(v)?)?)),
                None => Ok(None),
            }
        }
        .boxed()
    }
}
