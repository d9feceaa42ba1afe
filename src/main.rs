#![allow(dead_code)]

use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use time::macros::format_description;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{filter::LevelFilter, fmt::time::LocalTime, EnvFilter};

use crate::config::GLOBAL_CONFIG;
use crate::store::NoticeStoreClient;
use crate::tracing_middleware::NoticeRootSpanBuilder;

mod config;
mod db;
mod error;
mod filter;
mod model;
mod router;
mod scroll;
mod store;
mod tracing_middleware;
mod util;

fn main() {
    actix_web::rt::System::with_tokio_rt(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(GLOBAL_CONFIG.app.thread)
            .enable_all()
            .build()
            .unwrap()
    })
    .block_on(async_main());
}

async fn async_main() {
    // 设置日志
    tracing_log::LogTracer::init().unwrap();
    let log_level = match GLOBAL_CONFIG.app.log_level.as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    };
    let env_filter = EnvFilter::from_default_env()
        .add_directive("rustls=info".parse().unwrap())
        .add_directive("hyper=info".parse().unwrap())
        .add_directive("reqwest=info".parse().unwrap())
        .add_directive(log_level.into());
    let (stderr, _guard) = tracing_appender::non_blocking(std::io::stderr());
    let subscriber_builder = tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(stderr)
        .with_env_filter(env_filter)
        .with_timer(LocalTime::new(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]"
        )));
    match GLOBAL_CONFIG.app.log_format.as_str() {
        "pretty" => {
            tracing::subscriber::set_global_default(subscriber_builder.pretty().finish()).unwrap()
        }
        "json" => {
            tracing::subscriber::set_global_default(subscriber_builder.json().finish()).unwrap()
        }
        _ => tracing::subscriber::set_global_default(subscriber_builder.finish()).unwrap(),
    }

    // 初始化数据服务，postgres会先建立一个连接
    let store = store::new_store(&GLOBAL_CONFIG)
        .await
        .unwrap_or_else(|e| panic!("初始化数据服务失败: {}", e));

    if let Err(e) = run_server(store).await {
        tracing::error!("服务器异常退出: {}", e);
    }
}

async fn run_server(store: NoticeStoreClient) -> std::io::Result<()> {
    let board_config = web::Data::new(GLOBAL_CONFIG.board.clone());
    let jwt_config = web::Data::new(GLOBAL_CONFIG.jwt.clone());
    let store = web::Data::new(store);

    let temp_server = HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(board_config.clone())
            .app_data(jwt_config.clone())
            .wrap(middleware::Compress::default())
            .wrap(TracingLogger::<NoticeRootSpanBuilder>::new())
            .configure(router::register)
            .default_service(web::route().to(|| async { HttpResponse::NotFound().finish() }))
    })
    .max_connection_rate(1024)
    .workers(GLOBAL_CONFIG.app.thread);

    let server = match GLOBAL_CONFIG.app.mode.as_str() {
        #[cfg(unix)]
        "uds" => temp_server.bind_uds(&GLOBAL_CONFIG.app.addr)?,
        _ => temp_server.bind(&GLOBAL_CONFIG.app.addr)?,
    };
    tracing::info!("开始监听: {}", GLOBAL_CONFIG.app.addr);
    server.run().await
}
