use chrono::{DateTime, Utc};
use deadpool_postgres::{Client, Pool};
use futures::future::{BoxFuture, FutureExt};
use tokio_postgres::types::FromSql;
use tokio_postgres::Row;
use uuid::Uuid;

use super::adapter::{collect_valid, parse_name, parse_role, CommentRow, NameRow, NoticeRow, ProfileRow, RowError};
use super::{NoticeStore, StoreError};
use crate::config::SQLConfig;
use crate::db::{self, Type as DBType};
use crate::filter::{ALL_DEPARTMENTS, ALL_OFFICES};
use crate::model::comment::{Comment, NewComment};
use crate::model::notice::{NewNotice, Notice};
use crate::model::user::UserRole;

const NOTICE_COLUMNS: &str = "n.id, n.title, n.content, n.author_id, p.full_name AS author_name,
    n.department_id AS department, n.office_id AS office, n.attachments, n.is_active, n.created_at, n.expire_at";

const COMMENT_COLUMNS: &str =
    "c.id, c.notice_id, c.user_id, p.full_name AS user_name, c.content, c.created_at";

pub struct PgNoticeStore {
    pool: Pool,
}

impl PgNoticeStore {
    pub fn new(config: &SQLConfig) -> Result<Self, StoreError> {
        Ok(Self {
            pool: db::new_db_pool(config)?,
        })
    }

    pub async fn warm_up(&self) -> Result<(), StoreError> {
        self.pool.get().await?;
        Ok(())
    }

    async fn query_notices(
        &self,
        condition: &str,
        types: &[DBType],
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<Notice>, StoreError> {
        let client: Client = self.pool.get().await?;
        let s1 = client
            .prepare_typed_cached(
                &format!(
                    "SELECT {}
                    FROM notice_board.notices AS n
                    LEFT JOIN notice_board.profiles AS p
                    ON p.id = n.author_id
                    WHERE {}
                    ORDER BY n.created_at DESC",
                    NOTICE_COLUMNS, condition
                ),
                types,
            )
            .await?;
        let r1s = client.query(&s1, params).await?;
        Ok(collect_valid(r1s.iter().map(notice_from_row), "公告"))
    }

    async fn query_names(&self, table: &str, field: &'static str, sentinel: &str) -> Result<Vec<String>, StoreError> {
        let client: Client = self.pool.get().await?;
        let s1 = client
            .prepare_typed_cached(
                &format!("SELECT name FROM notice_board.{} ORDER BY name ASC", table),
                &[],
            )
            .await?;
        let r1s = client.query(&s1, &[]).await?;
        Ok(collect_valid(
            r1s.iter().map(|r1| {
                let row = NameRow {
                    name: column(r1, "name")?,
                };
                parse_name(row, field, sentinel)
            }),
            field,
        ))
    }
}

fn column<'a, T: FromSql<'a>>(row: &'a Row, name: &'static str) -> Result<T, RowError> {
    row.try_get(name).map_err(|e| RowError::Invalid {
        field: name,
        reason: e.to_string(),
    })
}

fn notice_from_row(row: &Row) -> Result<Notice, RowError> {
    Notice::try_from(NoticeRow {
        id: column(row, "id")?,
        title: column(row, "title")?,
        content: column(row, "content")?,
        author_id: column(row, "author_id")?,
        author_name: column(row, "author_name")?,
        profiles: None,
        department: column(row, "department")?,
        office: column(row, "office")?,
        attachments: column(row, "attachments")?,
        is_active: column(row, "is_active")?,
        created_at: column::<Option<DateTime<Utc>>>(row, "created_at")?,
        expire_at: column::<Option<DateTime<Utc>>>(row, "expire_at")?,
    })
}

fn comment_from_row(row: &Row) -> Result<Comment, RowError> {
    Comment::try_from(CommentRow {
        id: column(row, "id")?,
        notice_id: column(row, "notice_id")?,
        user_id: column(row, "user_id")?,
        user_name: column(row, "user_name")?,
        profiles: None,
        content: column(row, "content")?,
        created_at: column(row, "created_at")?,
    })
}

impl NoticeStore for PgNoticeStore {
    fn fetch_active_notices(&self) -> BoxFuture<'_, Result<Vec<Notice>, StoreError>> {
        async move { self.query_notices("n.is_active = true", &[], &[]).await }.boxed()
    }

    fn fetch_notice(&self, notice_id: Uuid) -> BoxFuture<'_, Result<Option<Notice>, StoreError>> {
        async move {
            let client: Client = self.pool.get().await?;
            let s1 = client
                .prepare_typed_cached(
                    &format!(
                        "SELECT {}
                        FROM notice_board.notices AS n
                        LEFT JOIN notice_board.profiles AS p
                        ON p.id = n.author_id
                        WHERE n.id = $1",
                        NOTICE_COLUMNS
                    ),
                    &[DBType::UUID],
                )
                .await?;
            match client.query_opt(&s1, &[&notice_id]).await? {
                Some(r1) => Ok(Some(notice_from_row(&r1)?)),
                None => Ok(None),
            }
        }
        .boxed()
    }

    fn fetch_notices_by_author(&self, author_id: Uuid) -> BoxFuture<'_, Result<Vec<Notice>, StoreError>> {
        async move {
            self.query_notices("n.author_id = $1", &[DBType::UUID], &[&author_id])
                .await
        }
        .boxed()
    }

    fn fetch_departments(&self) -> BoxFuture<'_, Result<Vec<String>, StoreError>> {
        async move {
            self.query_names("departments", "department", ALL_DEPARTMENTS)
                .await
        }
        .boxed()
    }

    fn fetch_offices(&self) -> BoxFuture<'_, Result<Vec<String>, StoreError>> {
        async move { self.query_names("offices", "office", ALL_OFFICES).await }.boxed()
    }

    fn insert_notice(&self, notice: NewNotice) -> BoxFuture<'_, Result<Notice, StoreError>> {
        async move {
            let client: Client = self.pool.get().await?;
            let s1 = client
                .prepare_typed_cached(
                    &format!(
                        "WITH n AS (
                            INSERT INTO notice_board.notices(title, content, author_id, department_id, office_id, attachments, expire_at, is_active)
                            VALUES($1, $2, $3, $4, $5, $6, $7, true)
                            RETURNING *
                        )
                        SELECT {}
                        FROM n
                        LEFT JOIN notice_board.profiles AS p
                        ON p.id = n.author_id",
                        NOTICE_COLUMNS
                    ),
                    &[
                        DBType::TEXT,
                        DBType::TEXT,
                        DBType::UUID,
                        DBType::TEXT,
                        DBType::TEXT,
                        DBType::TEXT_ARRAY,
                        DBType::TIMESTAMPTZ,
                    ],
                )
                .await?;
            let r1 = client
                .query_one(
                    &s1,
                    &[
                        &notice.title,
                        &notice.content,
                        &notice.author_id,
                        &notice.department,
                        &notice.office,
                        &notice.attachments,
                        &notice.expire_at,
                    ],
                )
                .await?;
            Ok(notice_from_row(&r1)?)
        }
        .boxed()
    }

    fn fetch_comments(&self, notice_id: Uuid) -> BoxFuture<'_, Result<Vec<Comment>, StoreError>> {
        async move {
            let client: Client = self.pool.get().await?;
            let s1 = client
                .prepare_typed_cached(
                    &format!(
                        "SELECT {}
                        FROM notice_board.comments AS c
                        LEFT JOIN notice_board.profiles AS p
                        ON p.id = c.user_id
                        WHERE c.notice_id = $1
                        ORDER BY c.created_at ASC",
                        COMMENT_COLUMNS
                    ),
                    &[DBType::UUID],
                )
                .await?;
            let r1s = client.query(&s1, &[&notice_id]).await?;
            Ok(collect_valid(r1s.iter().map(comment_from_row), "评论"))
        }
        .boxed()
    }

    fn insert_comment(&self, comment: NewComment) -> BoxFuture<'_, Result<Comment, StoreError>> {
        async move {
            let client: Client = self.pool.get().await?;
            let s1 = client
                .prepare_typed_cached(
                    &format!(
                        "WITH c AS (
                            INSERT INTO notice_board.comments(notice_id, user_id, content)
                            VALUES($1, $2, $3)
                            RETURNING *
                        )
                        SELECT {}
                        FROM c
                        LEFT JOIN notice_board.profiles AS p
                        ON p.id = c.user_id",
                        COMMENT_COLUMNS
                    ),
                    &[DBType::UUID, DBType::UUID, DBType::TEXT],
                )
                .await?;
            let r1 = client
                .query_one(&s1, &[&comment.notice_id, &comment.user_id, &comment.content])
                .await?;
            Ok(comment_from_row(&r1)?)
        }
        .boxed()
    }

    fn fetch_role(&self, user_id: Uuid) -> BoxFuture<'_, Result<Option<UserRole>, StoreError>> {
        async move {
            let client: Client = self.pool.get().await?;
            let s1 = client
                .prepare_typed_cached(
                    "SELECT role FROM notice_board.profiles WHERE id = $1",
                    &[DBType::UUID],
                )
                .await?;
            match client.query_opt(&s1, &[&user_id]).await? {
                Some(r1) => {
                    let row = ProfileRow {
                        full_name: None,
                        role: column(&r1, "role")?,
                    };
                    Ok(Some(parse_role(row)?))
                }
                None => Ok(None),
            }
        }
        .boxed()
    }
}
