//! Catalog API 模块
//!
//! 读接口公开 (规则编辑器的分类/商品选择器、店面)，写接口需要管理权限。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Public read routes
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/catalog/categories", get(handler::list_categories))
        .route("/api/catalog/products", get(handler::list_products))
}

/// Admin write routes (mounted behind `require_admin`)
pub fn admin_router() -> Router<ServerState> {
    Router::new()
        .route("/api/catalog/categories", post(handler::create_category))
        .route("/api/catalog/products", post(handler::create_product))
}
