//! 认证中间件
//!
//! 为管理端接口提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::HostAuthority;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::{AppError, ErrorCode};

/// 防伪令牌请求头
pub const NONCE_HEADER: &str = "x-admin-nonce";

/// 通过能力检查后注入请求扩展，供 [`require_nonce`] 使用
#[derive(Clone)]
pub struct AdminContext {
    pub authority: Arc<dyn HostAuthority>,
}

/// 管理员中间件 - 要求 `Authorization: Bearer <ADMIN_TOKEN>`
///
/// # 错误
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 |
/// | 令牌不匹配 | 403 |
pub async fn require_admin(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 允许 CORS 预检
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let bearer = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim);

    let Some(bearer) = bearer else {
        security_log!("WARN", "auth_missing", uri = req.uri().to_string());
        return Err(AppError::unauthorized());
    };

    if !state.authority.can_manage(bearer) {
        security_log!("WARN", "permission_denied", uri = req.uri().to_string());
        return Err(AppError::with_message(
            ErrorCode::AdminRequired,
            "Permission denied",
        ));
    }

    req.extensions_mut().insert(AdminContext {
        authority: state.authority.clone(),
    });
    Ok(next.run(req).await)
}

/// 防伪令牌中间件 - 要求 `X-Admin-Nonce` 与 action 匹配
///
/// # 用法
///
/// ```ignore
/// Router::new()
///     .route("/", post(handler::create))
///     .layer(middleware::from_fn(require_nonce(SAVE_RULE)));
/// ```
pub fn require_nonce(
    action: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let ctx = req
                .extensions()
                .get::<AdminContext>()
                .cloned()
                .ok_or(AppError::unauthorized())?;

            let nonce = req
                .headers()
                .get(NONCE_HEADER)
                .and_then(|h| h.to_str().ok())
                .unwrap_or_default();

            if nonce.is_empty() || !ctx.authority.verify_nonce(action, nonce) {
                security_log!(
                    "WARN",
                    "nonce_rejected",
                    action = action,
                    uri = req.uri().to_string()
                );
                return Err(AppError::nonce_invalid());
            }

            Ok(next.run(req).await)
        })
    }
}
