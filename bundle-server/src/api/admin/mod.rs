//! 管理端辅助接口 - 签发防伪令牌

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::auth::NONCE_ACTIONS;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/admin/nonce", get(issue_nonce))
}

#[derive(Debug, Deserialize)]
pub struct NonceQuery {
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct NonceResponse {
    pub action: String,
    pub nonce: String,
}

/// GET /api/admin/nonce?action=save_rule
pub async fn issue_nonce(
    State(state): State<ServerState>,
    Query(query): Query<NonceQuery>,
) -> AppResult<ApiResponse<NonceResponse>> {
    if !NONCE_ACTIONS.contains(&query.action.as_str()) {
        return Err(AppError::validation(format!(
            "Unknown action: {}",
            query.action
        )));
    }
    let nonce = state.authority.issue_nonce(&query.action);
    Ok(ApiResponse::success(NonceResponse {
        action: query.action,
        nonce,
    }))
}
