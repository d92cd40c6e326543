//! Catalog API Handlers

use axum::{Json, extract::State};
use shared::models::{Category, CategoryCreate, Product, ProductCreate};

use crate::core::ServerState;
use crate::utils::validation::{validate_category, validate_product};
use crate::utils::{ApiResponse, AppResult};

/// GET /api/catalog/categories
pub async fn list_categories(
    State(state): State<ServerState>,
) -> AppResult<ApiResponse<Vec<Category>>> {
    Ok(ApiResponse::success(state.catalog.list_categories()))
}

/// GET /api/catalog/products
pub async fn list_products(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<Product>>> {
    Ok(ApiResponse::success(state.catalog.list_products()))
}

/// POST /api/catalog/categories
pub async fn create_category(
    State(state): State<ServerState>,
    Json(mut payload): Json<CategoryCreate>,
) -> AppResult<ApiResponse<Category>> {
    validate_category(&payload)?;
    payload.name = payload.name.trim().to_string();
    let category = state.catalog.create_category(payload).await?;
    // 重新加载缓存，保持父子关系一致
    state.catalog.warmup().await?;
    Ok(ApiResponse::success(category))
}

/// POST /api/catalog/products
pub async fn create_product(
    State(state): State<ServerState>,
    Json(mut payload): Json<ProductCreate>,
) -> AppResult<ApiResponse<Product>> {
    validate_product(&payload)?;
    payload.name = payload.name.trim().to_string();
    let product = state.catalog.create_product(payload).await?;
    state.catalog.warmup().await?;
    Ok(ApiResponse::success(product))
}
