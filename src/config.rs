use derive_more::Display;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

lazy_static! {
    pub static ref GLOBAL_CONFIG: Config = Config::new_from_file("config.toml");
}

#[derive(Deserialize, Serialize, Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreBackend {
    #[serde(rename = "postgres")]
    #[display(fmt = "postgres")]
    Postgres,
    #[serde(rename = "rest")]
    #[display(fmt = "rest")]
    Rest,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub jwt: JWTConfig,
    pub store: StoreConfig,
    pub pgsql: Option<SQLConfig>,
    pub rest: Option<RestConfig>,
    #[serde(default)]
    pub board: BoardConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub mode: String,
    pub addr: String,
    pub thread: usize,
    pub log_level: String,
    pub log_format: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JWTConfig {
    pub token_secret: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SQLConfig {
    pub mode: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database_name: String,
    pub application_name: String,
    pub ssl: bool,
    pub root_cert: String,
    pub connect_timeout: u64,
    pub keepalives_idle: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RestConfig {
    pub url: String,
    pub api_key: String,
    pub connect_timeout: u64,
    pub whole_timeout: u64,
    pub pool_idle_timeout: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BoardConfig {
    // 每帧滚动的像素
    #[serde(default = "default_scroll_step")]
    pub scroll_step: f64,
    // 每秒帧数
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate: u32,
    #[serde(default)]
    pub enforce_expiry: bool,
}

fn default_scroll_step() -> f64 {
    1.0
}

fn default_refresh_rate() -> u32 {
    60
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            scroll_step: default_scroll_step(),
            refresh_rate: default_refresh_rate(),
            enforce_expiry: false,
        }
    }
}

impl Config {
    pub fn new_from_file(file_path: &str) -> Self {
        let content = std::fs::read_to_string(file_path)
            .unwrap_or_else(|e| panic!("读取配置文件{}失败: {}", file_path, e));
        Self::from_toml(&content).unwrap_or_else(|e| panic!("解析配置文件{}失败: {}", file_path, e))
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [app]
        mode = "tcp"
        addr = "127.0.0.1:8080"
        thread = 2
        log_level = "info"
        log_format = "compact"

        [jwt]
        token_secret = "secret"

        [store]
        backend = "rest"

        [rest]
        url = "https://example.supabase.co"
        api_key = "anon"
        connect_timeout = 5
        whole_timeout = 10
        pool_idle_timeout = 90
    "#;

    #[test]
    fn board_section_falls_back_to_defaults() {
        let config = Config::from_toml(MINIMAL).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Rest);
        assert!(config.pgsql.is_none());
        assert_eq!(config.board.scroll_step, 1.0);
        assert_eq!(config.board.refresh_rate, 60);
        assert!(!config.board.enforce_expiry);
    }

    #[test]
    fn partial_board_section_keeps_remaining_defaults() {
        let content = format!("{}\n[board]\nenforce_expiry = true\n", MINIMAL);
        let config = Config::from_toml(&content).unwrap();
        assert!(config.board.enforce_expiry);
        assert_eq!(config.board.refresh_rate, 60);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let content = MINIMAL.replace("backend = \"rest\"", "backend = \"sqlite\"");
        assert!(Config::from_toml(&content).is_err());
    }
}
