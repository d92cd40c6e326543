//! 店面购物车 API
//!
//! 每个请求只取一次规则 (`RuleSnapshot`)，之后在购物车上同步执行定价。
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/cart/{session} | GET | 重新定价并返回购物车 |
//! | /api/cart/{session}/items | POST | 加入购物车 |
//! | /api/cart/{session}/items/{key} | PATCH | 修改数量 (0 删除) |
//! | /api/cart/{session}/items/{key} | DELETE | 删除行 |

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{session}", get(handler::get_cart))
        .route("/{session}/items", post(handler::add_item))
        .route(
            "/{session}/items/{key}",
            patch(handler::update_item).delete(handler::remove_item),
        )
}
