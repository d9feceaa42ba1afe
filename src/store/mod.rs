//! 公告数据访问
//!
//! `NoticeStore`是外部数据服务的原始接口，所有操作都可能失败。
//! `NoticeStoreClient`在其上提供视图使用的接口：读取失败时记录日志并返回空结果，
//! 写入失败时把错误交给调用方提示用户。

pub mod adapter;
pub mod postgres;
pub mod rest;

use std::sync::Arc;

use deadpool_postgres::PoolError;
use derive_more::Display;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::config::{Config, StoreBackend};
use crate::model::comment::{Comment, NewComment};
use crate::model::notice::{NewNotice, Notice};
use crate::model::user::UserRole;
use adapter::RowError;

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "获取数据库连接失败: {}", _0)]
    Pool(PoolError),
    #[display(fmt = "查询数据库失败: {}", _0)]
    Query(tokio_postgres::Error),
    #[display(fmt = "请求数据服务失败: {}", _0)]
    Transport(reqwest::Error),
    #[display(fmt = "数据服务响应状态码不正确: {}, 内容: {}", code, body)]
    Status { code: u16, body: String },
    #[display(fmt = "数据格式不正确: {}", _0)]
    Malformed(RowError),
    #[display(fmt = "数据服务配置不正确: {}", _0)]
    Config(String),
}

impl std::error::Error for StoreError {}

impl From<PoolError> for StoreError {
    fn from(error: PoolError) -> Self {
        Self::Pool(error)
    }
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(error: tokio_postgres::Error) -> Self {
        Self::Query(error)
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error)
    }
}

impl From<RowError> for StoreError {
    fn from(error: RowError) -> Self {
        Self::Malformed(error)
    }
}

pub trait NoticeStore: Send + Sync {
    /// 已激活的公告，按发布时间倒序
    fn fetch_active_notices(&self) -> BoxFuture<'_, Result<Vec<Notice>, StoreError>>;

    fn fetch_notice(&self, notice_id: Uuid) -> BoxFuture<'_, Result<Option<Notice>, StoreError>>;

    /// 某个作者的全部公告（包括未激活的），按发布时间倒序
    fn fetch_notices_by_author(&self, author_id: Uuid) -> BoxFuture<'_, Result<Vec<Notice>, StoreError>>;

    fn fetch_departments(&self) -> BoxFuture<'_, Result<Vec<String>, StoreError>>;

    fn fetch_offices(&self) -> BoxFuture<'_, Result<Vec<String>, StoreError>>;

    fn insert_notice(&self, notice: NewNotice) -> BoxFuture<'_, Result<Notice, StoreError>>;

    /// 公告下的评论，按发布时间正序
    fn fetch_comments(&self, notice_id: Uuid) -> BoxFuture<'_, Result<Vec<Comment>, StoreError>>;

    fn insert_comment(&self, comment: NewComment) -> BoxFuture<'_, Result<Comment, StoreError>>;

    /// 用户资料中的角色，没有资料时为None
    fn fetch_role(&self, user_id: Uuid) -> BoxFuture<'_, Result<Option<UserRole>, StoreError>>;
}

#[derive(Clone)]
pub struct NoticeStoreClient {
    store: Arc<dyn NoticeStore>,
}

impl NoticeStoreClient {
    pub fn new(store: Arc<dyn NoticeStore>) -> Self {
        Self { store }
    }

    pub async fn list_active_notices(&self) -> Vec<Notice> {
        self.store
            .fetch_active_notices()
            .await
            .unwrap_or_else(|e| degrade("获取公告列表失败", e))
    }

    /// 读取失败和公告不存在要区分开，所以这里不降级
    pub async fn get_notice(&self, notice_id: Uuid) -> Result<Option<Notice>, StoreError> {
        self.store.fetch_notice(notice_id).await.map_err(|e| {
            tracing::error!("获取公告失败, 公告ID: {}, 错误: {}", notice_id, e);
            e
        })
    }

    pub async fn get_role(&self, user_id: Uuid) -> Result<Option<UserRole>, StoreError> {
        self.store.fetch_role(user_id).await.map_err(|e| {
            tracing::error!("获取用户角色失败, 用户ID: {}, 错误: {}", user_id, e);
            e
        })
    }

    pub async fn list_author_notices(&self, author_id: Uuid) -> Vec<Notice> {
        self.store
            .fetch_notices_by_author(author_id)
            .await
            .unwrap_or_else(|e| degrade("获取作者公告失败", e))
    }

    pub async fn list_departments(&self) -> Vec<String> {
        self.store
            .fetch_departments()
            .await
            .unwrap_or_else(|e| degrade("获取部门列表失败", e))
    }

    pub async fn list_offices(&self) -> Vec<String> {
        self.store
            .fetch_offices()
            .await
            .unwrap_or_else(|e| degrade("获取办公室列表失败", e))
    }

    pub async fn create_notice(&self, notice: NewNotice) -> Result<Notice, StoreError> {
        let author_id = notice.author_id;
        self.store.insert_notice(notice).await.map_err(|e| {
            tracing::error!("创建公告失败, 作者ID: {}, 错误: {}", author_id, e);
            e
        })
    }

    pub async fn list_comments(&self, notice_id: Uuid) -> Vec<Comment> {
        self.store
            .fetch_comments(notice_id)
            .await
            .unwrap_or_else(|e| degrade("获取评论失败", e))
    }

    pub async fn add_comment(&self, comment: NewComment) -> Result<Comment, StoreError> {
        let notice_id = comment.notice_id;
        self.store.insert_comment(comment).await.map_err(|e| {
            tracing::error!("添加评论失败, 公告ID: {}, 错误: {}", notice_id, e);
            e
        })
    }
}

fn degrade<T>(message: &str, error: StoreError) -> Vec<T> {
    tracing::error!("{}: {}", message, error);
    Vec::new()
}

/// 按配置创建数据服务
pub async fn new_store(config: &Config) -> Result<NoticeStoreClient, StoreError> {
    let store: Arc<dyn NoticeStore> = match config.store.backend {
        StoreBackend::Postgres => {
            let sql_config = config
                .pgsql
                .as_ref()
                .ok_or_else(|| StoreError::Config("缺少[pgsql]配置".to_string()))?;
            let store = postgres::PgNoticeStore::new(sql_config)?;
            // 维持一个与数据库的连接
            store.warm_up().await?;
            Arc::new(store)
        }
        StoreBackend::Rest => {
            let rest_config = config
                .rest
                .as_ref()
                .ok_or_else(|| StoreError::Config("缺少[rest]配置".to_string()))?;
            Arc::new(rest::RestNoticeStore::new(rest_config)?)
        }
    };
    tracing::info!("数据服务初始化成功, 类型: {}", config.store.backend);
    Ok(NoticeStoreClient::new(store))
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::mock::MockStore;
    use super::NoticeStoreClient;
    use crate::model::comment::NewComment;
    use crate::model::notice::NewNotice;

    fn failing_client() -> NoticeStoreClient {
        NoticeStoreClient::new(Arc::new(MockStore {
            failing: true,
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn read_failures_degrade_to_empty_results() {
        let client = failing_client();
        assert!(client.list_active_notices().await.is_empty());
        assert!(client.list_departments().await.is_empty());
        assert!(client.list_offices().await.is_empty());
        assert!(client.list_author_notices(Uuid::new_v4()).await.is_empty());
        assert!(client.list_comments(Uuid::new_v4()).await.is_empty());
    }

    #[tokio::test]
    async fn single_notice_and_role_failures_are_not_absence() {
        let client = failing_client();
        assert!(client.get_notice(Uuid::new_v4()).await.is_err());
        assert!(client.get_role(Uuid::new_v4()).await.is_err());

        let client = NoticeStoreClient::new(Arc::new(MockStore::default()));
        assert_eq!(client.get_notice(Uuid::new_v4()).await.unwrap(), None);
        assert_eq!(client.get_role(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_failures_reach_the_caller() {
        let client = failing_client();
        let notice = NewNotice {
            title: "Fee deadline".to_string(),
            content: "Pay by Friday.".to_string(),
            author_id: Uuid::new_v4(),
            department: None,
            office: Some("Finance Office".to_string()),
            attachments: Vec::new(),
            expire_at: None,
        };
        assert!(client.create_notice(notice).await.is_err());
        let comment = NewComment {
            notice_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            content: "When exactly?".to_string(),
        };
        assert!(client.add_comment(comment).await.is_err());
    }

    #[tokio::test]
    async fn created_notice_is_listed_first() {
        let client = NoticeStoreClient::new(Arc::new(MockStore::default()));
        for title in ["first", "second"] {
            client
                .create_notice(NewNotice {
                    title: title.to_string(),
                    content: "body".to_string(),
                    author_id: Uuid::new_v4(),
                    department: None,
                    office: None,
                    attachments: Vec::new(),
                    expire_at: None,
                })
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        let notices = client.list_active_notices().await;
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].title, "second");
    }
}
