use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use chrono::Utc;
use uuid::Uuid;

use crate::config::BoardConfig;
use crate::error::ResponseError;
use crate::filter::{filter_notices, FilterCriteria, Selection, ALL_DEPARTMENTS, ALL_OFFICES};
use crate::model::notice::{
    GetAttachmentPath, GetNoticeOutput, GetNoticePath, GetNoticesOutput, GetNoticesQuery, NewNotice,
    Notice, PostNoticeInput,
};
use crate::store::NoticeStoreClient;
use crate::util::req_parse::{get_author_session, get_session};

pub const NO_NOTICES_FOUND: &str = "No notices found";

// 公开的公告流，按配置丢弃已过期的公告
pub(super) async fn load_feed(store: &NoticeStoreClient, board: &BoardConfig) -> Vec<Notice> {
    let mut notices = store.list_active_notices().await;
    if board.enforce_expiry {
        let now = Utc::now();
        notices.retain(|notice| !notice.is_expired(now));
    }
    notices
}

// 获取筛选后的公告
#[get("/notices")]
pub async fn get_notices(
    store: web::Data<NoticeStoreClient>,
    board: web::Data<BoardConfig>,
    query: web::Query<GetNoticesQuery>,
) -> Result<HttpResponse, ResponseError> {
    let notices = load_feed(&store, &board).await;
    let criteria = FilterCriteria::from(&*query);
    let visible = filter_notices(&notices, &criteria);

    Ok(HttpResponse::Ok().json(GetNoticesOutput {
        total: visible.len(),
        empty_message: visible.is_empty().then(|| NO_NOTICES_FOUND),
        notices: visible,
    }))
}

// 未激活的公告只对作者可见，其他人看到的是不存在
pub(super) async fn visible_notice(
    req: &HttpRequest,
    store: &NoticeStoreClient,
    notice_id: Uuid,
) -> Result<Notice, ResponseError> {
    let notice = store.get_notice(notice_id).await.map_err(|e| {
        ResponseError::store_err("Failed to load the notice", &e.to_string())
    })?;
    let not_found = || {
        ResponseError::resource_not_found_err(
            "Notice not found",
            &format!("公告不存在或未激活, 公告ID: {}", notice_id),
        )
    };
    match notice {
        Some(notice) if notice.is_active => Ok(notice),
        Some(notice) => match viewer_id(req).await {
            Some(viewer) if viewer == notice.author_id => Ok(notice),
            _ => Err(not_found()),
        },
        None => Err(not_found()),
    }
}

// 匿名或会话无效时为None
async fn viewer_id(req: &HttpRequest) -> Option<Uuid> {
    get_session(req).await.ok().map(|session| session.user_id)
}

// 获取单个公告及其评论
#[get("/notice/{notice_id}")]
pub async fn get_notice(
    req: HttpRequest,
    store: web::Data<NoticeStoreClient>,
    path: web::Path<GetNoticePath>,
) -> Result<HttpResponse, ResponseError> {
    let notice = visible_notice(&req, &store, path.notice_id).await?;
    let comments = store.list_comments(notice.id).await;
    Ok(HttpResponse::Ok().json(GetNoticeOutput { notice, comments }))
}

// 创建公告
#[post("/notice")]
pub async fn post_notice(
    req: HttpRequest,
    store: web::Data<NoticeStoreClient>,
    input: web::Json<PostNoticeInput>,
) -> Result<HttpResponse, ResponseError> {
    let session = get_author_session(&req).await?;
    let input = input.into_inner();

    for (field, value) in [
        ("title", &input.title),
        ("content", &input.content),
        ("department", &input.department),
        ("office", &input.office),
    ] {
        if value.trim().is_empty() {
            return Err(ResponseError::input_err(
                &format!("{} is required", field),
                &format!("[用户ID: {}]创建公告时{}为空", session.user_id, field),
            ));
        }
    }

    // 选择"全部"时存为空，表示面向全体
    let scope = |selection: Selection| match selection {
        Selection::All => None,
        Selection::Only(v) => Some(v),
    };
    let notice = NewNotice {
        title: input.title,
        content: input.content,
        author_id: session.user_id,
        department: scope(Selection::parse(&input.department, ALL_DEPARTMENTS)),
        office: scope(Selection::parse(&input.office, ALL_OFFICES)),
        attachments: input.attachments.unwrap_or_default(),
        expire_at: input.expire_at,
    };
    let created = store
        .create_notice(notice)
        .await
        .map_err(|e| ResponseError::store_err("Failed to create notice", &e.to_string()))?;
    tracing::info!("[用户ID: {}]创建公告成功, 公告ID: {}", session.user_id, created.id);

    Ok(HttpResponse::Created().json(created))
}

// 修改公告，尚不支持
#[put("/notice/{notice_id}")]
pub async fn put_notice(
    req: HttpRequest,
    path: web::Path<GetNoticePath>,
) -> Result<HttpResponse, ResponseError> {
    let session = get_author_session(&req).await?;
    Err(ResponseError::unsupported_err(
        "editing notices",
        &format!("[用户ID: {}]尝试修改公告{}", session.user_id, path.notice_id),
    ))
}

// 删除公告，尚不支持
#[delete("/notice/{notice_id}")]
pub async fn delete_notice(
    req: HttpRequest,
    path: web::Path<GetNoticePath>,
) -> Result<HttpResponse, ResponseError> {
    let session = get_author_session(&req).await?;
    Err(ResponseError::unsupported_err(
        "deleting notices",
        &format!("[用户ID: {}]尝试删除公告{}", session.user_id, path.notice_id),
    ))
}

// 下载附件，没有文件服务
#[get("/notice/{notice_id}/attachment/{index}")]
pub async fn get_attachment(
    req: HttpRequest,
    store: web::Data<NoticeStoreClient>,
    path: web::Path<GetAttachmentPath>,
) -> Result<HttpResponse, ResponseError> {
    let notice = visible_notice(&req, &store, path.notice_id).await?;
    let attachment = notice.attachments.get(path.index).ok_or_else(|| {
        ResponseError::resource_not_found_err(
            "Attachment not found",
            &format!("附件不存在, 公告ID: {}, 序号: {}", path.notice_id, path.index),
        )
    })?;
    Err(ResponseError::unsupported_err(
        "attachment download requires a file backend",
        &format!("尝试下载附件{}", attachment),
    ))
}
