use actix_web::{get, web, HttpResponse};

use super::notice::load_feed;
use crate::config::BoardConfig;
use crate::error::ResponseError;
use crate::filter::{filter_notices, FilterCriteria};
use crate::model::notice::{GetBoardOutput, GetNoticesQuery};
use crate::scroll::board::looped_cards;
use crate::store::NoticeStoreClient;

// 自动滚动公告板的卡片
#[get("/board")]
pub async fn get_board(
    store: web::Data<NoticeStoreClient>,
    board: web::Data<BoardConfig>,
    query: web::Query<GetNoticesQuery>,
) -> Result<HttpResponse, ResponseError> {
    let notices = load_feed(&store, &board).await;
    let visible = filter_notices(&notices, &FilterCriteria::from(&*query));

    Ok(HttpResponse::Ok().json(GetBoardOutput {
        cards: looped_cards(&visible),
        scroll_step: board.scroll_step,
        refresh_rate: board.refresh_rate,
    }))
}
