//! Bundle Rule API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{BundleRule, BundleRuleSave};

use crate::core::ServerState;
use crate::db::repository::RepoError;
use crate::utils::validation::validate_bundle_rule;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

fn rule_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::RuleNotFound, "Rule not found").with_detail("id", id)
}

/// GET /api/bundle-rules - 获取所有生效中的规则
pub async fn list(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<BundleRule>>> {
    let rules = state.rules.find_active().await?;
    Ok(ApiResponse::success(rules))
}

/// GET /api/bundle-rules/{id} - 获取单个规则 (含已删除)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<BundleRule>> {
    let rule = state
        .rules
        .find_by_id(id)
        .await?
        .ok_or_else(|| rule_not_found(id))?;
    Ok(ApiResponse::success(rule))
}

/// POST /api/bundle-rules - 创建规则
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<BundleRuleSave>,
) -> AppResult<ApiResponse<BundleRule>> {
    let draft = validate_bundle_rule(payload)?;
    let rule = state.rules.create(draft).await?;
    tracing::info!(rule_id = rule.id, name = %rule.name, "Bundle rule created");
    Ok(ApiResponse::success_with_message("Rule saved successfully", rule))
}

/// PUT /api/bundle-rules/{id} - 更新规则
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<BundleRuleSave>,
) -> AppResult<ApiResponse<BundleRule>> {
    let draft = validate_bundle_rule(payload)?;
    let rule = state.rules.update(id, draft).await.map_err(|e| match e {
        RepoError::NotFound(_) => rule_not_found(id),
        other => other.into(),
    })?;
    tracing::info!(rule_id = rule.id, "Bundle rule updated");
    Ok(ApiResponse::success_with_message("Rule saved successfully", rule))
}

/// DELETE /api/bundle-rules/{id} - 软删除规则
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state.rules.soft_delete(id).await.map_err(|e| match e {
        RepoError::NotFound(_) => rule_not_found(id),
        other => other.into(),
    })?;
    tracing::info!(rule_id = id, "Bundle rule deleted");
    Ok(ApiResponse::ok_with_message("Rule deleted successfully"))
}
