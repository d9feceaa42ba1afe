use actix_web::{get, web, HttpRequest, HttpResponse};

use crate::error::ResponseError;
use crate::store::NoticeStoreClient;
use crate::util::req_parse::get_author_session;

// 获取自己发布的公告
#[get("/dashboard/notices")]
pub async fn get_dashboard_notices(
    req: HttpRequest,
    store: web::Data<NoticeStoreClient>,
) -> Result<HttpResponse, ResponseError> {
    let session = get_author_session(&req).await?;
    Ok(HttpResponse::Ok().json(store.list_author_notices(session.user_id).await))
}
