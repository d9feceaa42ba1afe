mod board;
mod catalog;
mod comment;
mod dashboard;
mod notice;

pub fn register(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service((
        notice::get_notices,
        notice::post_notice,
        notice::get_notice,
        notice::put_notice,
        notice::delete_notice,
        notice::get_attachment,
    ));
    cfg.service((comment::get_comments, comment::post_comment));
    cfg.service((catalog::get_departments, catalog::get_offices));
    cfg.service(dashboard::get_dashboard_notices);
    cfg.service(board::get_board);
}
