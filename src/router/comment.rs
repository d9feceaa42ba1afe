use actix_web::{get, post, web, HttpRequest, HttpResponse};

use crate::error::ResponseError;
use crate::model::comment::{NewComment, PostCommentInput};
use crate::model::notice::GetNoticePath;
use super::notice::visible_notice;
use crate::store::NoticeStoreClient;
use crate::util::req_parse::get_session;

// 获取公告的评论
#[get("/notice/{notice_id}/comments")]
pub async fn get_comments(
    req: HttpRequest,
    store: web::Data<NoticeStoreClient>,
    path: web::Path<GetNoticePath>,
) -> Result<HttpResponse, ResponseError> {
    let notice = visible_notice(&req, &store, path.notice_id).await?;
    Ok(HttpResponse::Ok().json(store.list_comments(notice.id).await))
}

// 发表评论
#[post("/notice/{notice_id}/comment")]
pub async fn post_comment(
    req: HttpRequest,
    store: web::Data<NoticeStoreClient>,
    path: web::Path<GetNoticePath>,
    input: web::Json<PostCommentInput>,
) -> Result<HttpResponse, ResponseError> {
    let session = get_session(&req).await?;
    let notice_id = path.notice_id;
    let input = input.into_inner();

    if input.content.trim().is_empty() {
        return Err(ResponseError::input_err(
            "comment is empty",
            &format!("[用户ID: {}]评论内容为空", session.user_id),
        ));
    }
    visible_notice(&req, &store, notice_id).await?;

    let comment = store
        .add_comment(NewComment {
            notice_id,
            user_id: session.user_id,
            content: input.content,
        })
        .await
        .map_err(|e| ResponseError::store_err("Failed to add comment", &e.to_string()))?;

    Ok(HttpResponse::Created().json(comment))
}
