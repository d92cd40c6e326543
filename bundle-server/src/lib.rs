//! Bundle Server - 组合价 (买 N 件固定价) 定价服务
//!
//! # 架构概述
//!
//! - **定价引擎** (`pricing`): 每次计算购物车总价时重新套用组合价规则
//! - **数据库** (`db`): SQLite 存储规则与商品目录
//! - **购物车** (`cart`): 按会话保存在内存中的购物车
//! - **认证** (`auth`): 管理端令牌 + 防伪 nonce
//! - **HTTP API** (`api`): 管理端与店面接口
//!
//! # 模块结构
//!
//! ```text
//! bundle-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # 管理权限、防伪令牌
//! ├── services/      # 商品目录缓存
//! ├── pricing/       # 组合价定价引擎
//! ├── cart/          # 会话购物车
//! ├── api/           # HTTP 处理器
//! ├── routes/        # 路由组装与中间件
//! ├── utils/         # 日志、校验
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod auth;
pub mod cart;
pub mod core;
pub mod db;
pub mod pricing;
pub mod routes;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use pricing::BundlePricingEngine;
pub use routes::build_app;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境: 初始化日志 (控制台或按天滚动的文件)
pub fn setup_environment(config: &Config) {
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
    ____                  ____
   / __ )__  ______  ____/ / /__
  / __  / / / / __ \/ __  / / _ \
 / /_/ / /_/ / / / / /_/ / /  __/
/_____/\__,_/_/ /_/\__,_/_/\___/
    "#
    );
}
