//! Cart API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::cart::{CartItemInput, CartQuantityUpdate, CartView};

use crate::cart::{SessionCart, line_not_found};
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

/// 会话 ID 上限
const MAX_SESSION_ID_LEN: usize = 128;

fn validate_session(session: &str) -> AppResult<()> {
    if session.is_empty()
        || session.len() > MAX_SESSION_ID_LEN
        || !session
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::invalid_request("Invalid session id"));
    }
    Ok(())
}

/// Reprice the session cart with the request's rules and render it.
/// A session without a cart renders empty and stays absent.
async fn priced_view(state: &ServerState, session: &str) -> CartView {
    let snapshot = state.rule_snapshot().await;
    match state.carts.existing(session) {
        Some(mut cart) => {
            let applied = cart.reprice(&state.engine, snapshot.rules());
            cart.view(session, applied)
        }
        None => SessionCart::default().view(session, Vec::new()),
    }
}

/// GET /api/cart/{session}
pub async fn get_cart(
    State(state): State<ServerState>,
    Path(session): Path<String>,
) -> AppResult<ApiResponse<CartView>> {
    validate_session(&session)?;
    Ok(ApiResponse::success(priced_view(&state, &session).await))
}

/// POST /api/cart/{session}/items - 加入购物车
pub async fn add_item(
    State(state): State<ServerState>,
    Path(session): Path<String>,
    Json(input): Json<CartItemInput>,
) -> AppResult<ApiResponse<CartView>> {
    validate_session(&session)?;
    let product = state.catalog.get_product(input.product_id).ok_or_else(|| {
        AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", input.product_id)
    })?;

    {
        let mut cart = state.carts.cart_for_write(&session);
        let key = cart.add_item(&product, &input)?;
        tracing::debug!(session = %session, key = %key, product_id = product.id, "Item added to cart");
    }

    Ok(ApiResponse::success(priced_view(&state, &session).await))
}

/// PATCH /api/cart/{session}/items/{key} - 修改数量
pub async fn update_item(
    State(state): State<ServerState>,
    Path((session, key)): Path<(String, String)>,
    Json(update): Json<CartQuantityUpdate>,
) -> AppResult<ApiResponse<CartView>> {
    validate_session(&session)?;
    state
        .carts
        .existing(&session)
        .ok_or_else(|| line_not_found(&key))?
        .update_quantity(&key, update.quantity)?;
    Ok(ApiResponse::success(priced_view(&state, &session).await))
}

/// DELETE /api/cart/{session}/items/{key} - 删除行
pub async fn remove_item(
    State(state): State<ServerState>,
    Path((session, key)): Path<(String, String)>,
) -> AppResult<ApiResponse<CartView>> {
    validate_session(&session)?;
    state
        .carts
        .existing(&session)
        .ok_or_else(|| line_not_found(&key))?
        .remove_item(&key)?;
    Ok(ApiResponse::success(priced_view(&state, &session).await))
}
