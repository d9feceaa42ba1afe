use actix_web::{get, web, HttpResponse};

use crate::error::ResponseError;
use crate::filter::{ALL_DEPARTMENTS, ALL_OFFICES};
use crate::store::NoticeStoreClient;

// 筛选项，保留值排在最前
fn with_sentinel(sentinel: &str, names: Vec<String>) -> Vec<String> {
    std::iter::once(sentinel.to_string()).chain(names).collect()
}

// 获取部门列表
#[get("/departments")]
pub async fn get_departments(
    store: web::Data<NoticeStoreClient>,
) -> Result<HttpResponse, ResponseError> {
    let departments = store.list_departments().await;
    Ok(HttpResponse::Ok().json(with_sentinel(ALL_DEPARTMENTS, departments)))
}

// 获取办公室列表
#[get("/offices")]
pub async fn get_offices(store: web::Data<NoticeStoreClient>) -> Result<HttpResponse, ResponseError> {
    let offices = store.list_offices().await;
    Ok(HttpResponse::Ok().json(with_sentinel(ALL_OFFICES, offices)))
}
