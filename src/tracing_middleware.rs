use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::{Error, ResponseError};
use tracing::Span;
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpanBuilder};

/// 在默认的请求span上增加会话用户字段，由`get_session`填写
pub struct NoticeRootSpanBuilder;

impl RootSpanBuilder for NoticeRootSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> Span {
        tracing::debug!("请求头部: {:?}", request.headers());
        tracing_actix_web::root_span!(request, user_id = tracing::field::Empty)
    }

    fn on_request_end<B: MessageBody>(span: Span, outcome: &Result<ServiceResponse<B>, Error>) {
        DefaultRootSpanBuilder::on_request_end(span.clone(), outcome);
        span.in_scope(|| emit_event_on_error(outcome));
    }
}

fn emit_event_on_error<B>(outcome: &Result<ServiceResponse<B>, Error>) {
    match outcome {
        Ok(response) => match response.response().error() {
            Some(err) => emit_error_event(err.as_response_error()),
            None => tracing::info!("请求完成, 状态码: {}", response.status().as_u16()),
        },
        Err(error) => emit_error_event(error.as_response_error()),
    }
}

fn emit_error_event(response_error: &dyn ResponseError) {
    let status_code = response_error.status_code();
    if status_code.is_client_error() {
        tracing::info!("处理http请求失败: 客户端错误, 状态码: {}, 详细信息: {}", status_code.as_u16(), response_error);
    } else {
        tracing::error!("处理http请求失败: 服务器错误, 状态码: {}, 详细信息: {}", status_code.as_u16(), response_error);
    }
}
