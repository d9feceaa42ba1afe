use deadpool_postgres::{
    Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime, SslMode,
};
use rustls::{ClientConfig, RootCertStore};
use rustls_pemfile::certs;
use std::time::Duration;
use tokio_postgres::NoTls;
use tokio_postgres_rustls::MakeRustlsConnect;

use crate::config::SQLConfig;
use crate::store::StoreError;

pub type Type = tokio_postgres::types::Type;

pub fn new_db_pool(config: &SQLConfig) -> Result<Pool, StoreError> {
    // see https://docs.rs/tokio-postgres/0.7.2/tokio_postgres/config/struct.Config.html
    let mut cfg = Config::new();
    match config.mode.as_str() {
        "uds" => {
            cfg.host = Some(config.host.clone());
        }
        _ => {
            cfg.host = Some(config.host.clone());
            cfg.port = Some(config.port);
        }
    }
    cfg.dbname = Some(config.database_name.clone());
    cfg.user = Some(config.user.clone());
    cfg.password = Some(config.password.clone());
    cfg.application_name = Some(config.application_name.clone());
    cfg.keepalives_idle = Some(Duration::from_secs(config.keepalives_idle));
    cfg.connect_timeout = Some(Duration::from_secs(config.connect_timeout));
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.pool = Some(PoolConfig::new(100));
    let pool = match config.ssl {
        true => {
            cfg.ssl_mode = Some(SslMode::Require);
            let root_pem = std::fs::read(&config.root_cert).map_err(|e| {
                StoreError::Config(format!("读取数据库根证书{}失败: {}", config.root_cert, e))
            })?;
            let root_certs = certs(&mut std::io::Cursor::new(root_pem))
                .map_err(|e| StoreError::Config(format!("解析数据库根证书失败: {}", e)))?;
            let mut root_store = RootCertStore::empty();
            root_store.add_parsable_certificates(&root_certs);
            let client_config = ClientConfig::builder()
                .with_safe_defaults()
                .with_root_certificates(root_store)
                .with_no_client_auth();
            let tls_connector = MakeRustlsConnect::new(client_config);
            cfg.create_pool(Some(Runtime::Tokio1), tls_connector)
        }
        false => {
            cfg.ssl_mode = Some(SslMode::Disable);
            cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        }
    };
    pool.map_err(|e| StoreError::Config(format!("创建数据库连接池失败: {}", e)))
}
