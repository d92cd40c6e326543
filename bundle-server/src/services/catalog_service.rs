//! Catalog Service - products and category tree with in-memory caching
//!
//! The pricing engine resolves categories on every cart read, so lookups go
//! to the cache and never to SQLite. Writes go through the repository and
//! then reload the cache.

use crate::db::repository::{CatalogRepository, RepoResult};
use crate::pricing::CategoryResolver;
use parking_lot::RwLock;
use shared::models::{Category, CategoryCreate, Product, ProductCreate};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    products: Arc<RwLock<HashMap<i64, Product>>>,
    categories: Arc<RwLock<HashMap<i64, Category>>>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("products", &self.products.read().len())
            .field("categories", &self.categories.read().len())
            .finish()
    }
}

impl CatalogService {
    pub fn new(repo: CatalogRepository) -> Self {
        Self {
            repo,
            products: Arc::new(RwLock::new(HashMap::new())),
            categories: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Load everything from the database into the cache
    pub async fn warmup(&self) -> RepoResult<()> {
        let categories = self.repo.list_categories().await?;
        let products = self.repo.list_products().await?;

        let category_count = categories.len();
        let product_count = products.len();

        *self.categories.write() = categories.into_iter().map(|c| (c.id, c)).collect();
        *self.products.write() = products.into_iter().map(|p| (p.id, p)).collect();

        tracing::info!(
            categories = category_count,
            products = product_count,
            "Catalog cache loaded"
        );
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub fn get_product(&self, id: i64) -> Option<Product> {
        self.products.read().get(&id).cloned()
    }

    pub fn list_products(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self.products.read().values().cloned().collect();
        products.sort_by_key(|p| p.id);
        products
    }

    pub async fn create_product(&self, data: ProductCreate) -> RepoResult<Product> {
        let product = self.repo.create_product(data).await?;
        self.products.write().insert(product.id, product.clone());
        Ok(product)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub fn get_category(&self, id: i64) -> Option<Category> {
        self.categories.read().get(&id).cloned()
    }

    pub fn list_categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.categories.read().values().cloned().collect();
        categories.sort_by_key(|c| c.id);
        categories
    }

    pub async fn create_category(&self, data: CategoryCreate) -> RepoResult<Category> {
        let category = self.repo.create_category(data).await?;
        self.categories.write().insert(category.id, category.clone());
        Ok(category)
    }

    /// Every ancestor of `category_id`, nearest first (the category itself excluded)
    pub fn ancestors(&self, category_id: i64) -> Vec<i64> {
        let categories = self.categories.read();
        let mut visited = HashSet::from([category_id]);
        let mut result = Vec::new();
        let mut current = categories.get(&category_id).and_then(|c| c.parent_id);

        while let Some(parent_id) = current {
            // 防止 parent 环
            if !visited.insert(parent_id) {
                tracing::warn!(category_id, parent_id, "Category parent cycle detected");
                break;
            }
            result.push(parent_id);
            current = categories.get(&parent_id).and_then(|c| c.parent_id);
        }
        result
    }
}

impl CategoryResolver for CatalogService {
    fn categories_with_ancestors(&self, product_id: i64) -> Option<HashSet<i64>> {
        let direct = self.products.read().get(&product_id)?.category_ids.clone();
        let mut expanded: HashSet<i64> = direct.iter().copied().collect();
        for category_id in direct {
            expanded.extend(self.ancestors(category_id));
        }
        Some(expanded)
    }
}
