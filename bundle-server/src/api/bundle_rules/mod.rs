//! Bundle Rule API 模块
//!
//! | 路径 | 方法 | 防伪令牌 |
//! |------|------|----------|
//! | /api/bundle-rules | GET | - |
//! | /api/bundle-rules/{id} | GET | get_rule |
//! | /api/bundle-rules | POST | save_rule |
//! | /api/bundle-rules/{id} | PUT | save_rule |
//! | /api/bundle-rules/{id} | DELETE | delete_rule |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::{DELETE_RULE, GET_RULE, SAVE_RULE, require_nonce};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/bundle-rules", routes())
}

fn routes() -> Router<ServerState> {
    let list_routes = Router::new().route("/", get(handler::list));

    let get_routes = Router::new()
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_nonce(GET_RULE)));

    let save_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update))
        .layer(middleware::from_fn(require_nonce(SAVE_RULE)));

    let delete_routes = Router::new()
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_nonce(DELETE_RULE)));

    list_routes
        .merge(get_routes)
        .merge(save_routes)
        .merge(delete_routes)
}
