use super::ServerError;
use crate::cart::{DEFAULT_IDLE_TTL, DEFAULT_MAX_SESSIONS};

/// 开发环境默认管理令牌 (生产环境禁止使用)
const DEV_ADMIN_TOKEN: &str = "dev-admin-token";

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/bundle-server | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | DATABASE_PATH | {WORK_DIR}/bundle.db | SQLite 数据库文件 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_DIR | (无) | 日志目录，设置后按天滚动写文件 |
/// | ADMIN_TOKEN | dev-admin-token | 管理端 Bearer 令牌 |
/// | NONCE_SECRET | (同 ADMIN_TOKEN，生产环境必须单独设置) | 防伪令牌签名密钥 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | CART_IDLE_TTL_SECS | 172800 | 购物车闲置多久后清理(秒) |
/// | CART_MAX_SESSIONS | 10000 | 内存中购物车数量上限 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/bundle HTTP_PORT=8080 ADMIN_TOKEN=xxx cargo run
/// ```
#[derive(Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 数据库文件路径 (None 时使用工作目录下的 bundle.db)
    pub database_path: Option<String>,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 管理端 Bearer 令牌
    pub admin_token: String,
    /// 防伪令牌签名密钥
    pub nonce_secret: String,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 购物车闲置清理时间 (秒)
    pub cart_idle_ttl_secs: u64,
    pub cart_max_sessions: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("work_dir", &self.work_dir)
            .field("http_port", &self.http_port)
            .field("database_path", &self.database_path)
            .field("environment", &self.environment)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .field("admin_token", &"***")
            .field("nonce_secret", &"***")
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("cart_idle_ttl_secs", &self.cart_idle_ttl_secs)
            .field("cart_max_sessions", &self.cart_max_sessions)
            .finish()
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let admin_token =
            std::env::var("ADMIN_TOKEN").unwrap_or_else(|_| DEV_ADMIN_TOKEN.into());
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/bundle-server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path: std::env::var("DATABASE_PATH").ok().filter(|p| !p.is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            nonce_secret: std::env::var("NONCE_SECRET").unwrap_or_else(|_| admin_token.clone()),
            admin_token,
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            cart_idle_ttl_secs: std::env::var("CART_IDLE_TTL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_IDLE_TTL.as_secs()),
            cart_max_sessions: std::env::var("CART_MAX_SESSIONS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_MAX_SESSIONS),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库文件路径
    pub fn database_path(&self) -> String {
        match &self.database_path {
            Some(path) => path.clone(),
            None => std::path::Path::new(&self.work_dir)
                .join("bundle.db")
                .to_string_lossy()
                .into_owned(),
        }
    }

    /// 启动前检查：生产环境必须配置自己的管理令牌和独立的 nonce 密钥
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.admin_token.trim().is_empty() {
            return Err(ServerError::Config("ADMIN_TOKEN must not be empty".into()));
        }
        if self.is_production() {
            if self.admin_token == DEV_ADMIN_TOKEN {
                return Err(ServerError::Config(
                    "ADMIN_TOKEN must be set in production".into(),
                ));
            }
            if self.nonce_secret.trim().is_empty() || self.nonce_secret == self.admin_token {
                return Err(ServerError::Config(
                    "NONCE_SECRET must be set and differ from ADMIN_TOKEN in production".into(),
                ));
            }
        }
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path_defaults_to_work_dir() {
        let mut config = Config::with_overrides("/tmp/bundle-test", 0);
        config.database_path = None;
        assert!(config.database_path().ends_with("bundle.db"));
        assert!(config.database_path().starts_with("/tmp/bundle-test"));

        config.database_path = Some("/elsewhere/x.db".into());
        assert_eq!(config.database_path(), "/elsewhere/x.db");
    }

    #[test]
    fn test_production_rejects_dev_token() {
        let mut config = Config::with_overrides("/tmp/bundle-test", 0);
        config.environment = "production".into();
        config.admin_token = DEV_ADMIN_TOKEN.into();
        config.nonce_secret = "a-nonce-secret".into();
        assert!(config.validate().is_err());

        config.admin_token = "a-real-token".into();
        assert!(config.validate().is_ok());

        config.admin_token = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_production_requires_distinct_nonce_secret() {
        let mut config = Config::with_overrides("/tmp/bundle-test", 0);
        config.environment = "production".into();
        config.admin_token = "a-real-token".into();

        config.nonce_secret = "a-real-token".into();
        assert!(config.validate().is_err());

        config.nonce_secret = String::new();
        assert!(config.validate().is_err());

        config.nonce_secret = "another-secret".into();
        assert!(config.validate().is_ok());

        // 开发环境允许复用
        config.environment = "development".into();
        config.nonce_secret = config.admin_token.clone();
        assert!(config.validate().is_ok());
    }
}
