//! Catalog Repository (categories + products)

use super::{RepoError, RepoResult};
use rust_decimal::Decimal;
use shared::models::{Category, CategoryCreate, Product, ProductCreate};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: String,
}

#[derive(sqlx::FromRow)]
struct ProductCategoryRow {
    product_id: i64,
    category_id: i64,
}

#[derive(Clone, Debug)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, parent_id FROM category ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn find_category(&self, id: i64) -> RepoResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, parent_id FROM category WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    /// Create a category; the parent (if any) must exist
    pub async fn create_category(&self, data: CategoryCreate) -> RepoResult<Category> {
        if let Some(parent_id) = data.parent_id
            && self.find_category(parent_id).await?.is_none()
        {
            return Err(RepoError::Validation(format!(
                "Parent category {parent_id} not found"
            )));
        }

        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO category (name, parent_id) VALUES (?1, ?2) RETURNING id, name, parent_id",
        )
        .bind(&data.name)
        .bind(data.parent_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    /// All products with their directly assigned categories
    pub async fn list_products(&self) -> RepoResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>("SELECT id, name, price FROM product ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let links = sqlx::query_as::<_, ProductCategoryRow>(
            "SELECT product_id, category_id FROM product_category ORDER BY product_id, category_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_product: HashMap<i64, Vec<i64>> = HashMap::new();
        for link in links {
            by_product
                .entry(link.product_id)
                .or_default()
                .push(link.category_id);
        }

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let price = match Decimal::from_str(&row.price) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(product_id = row.id, error = %e, "Skipping product with bad price");
                    continue;
                }
            };
            products.push(Product {
                id: row.id,
                name: row.name,
                price,
                category_ids: by_product.remove(&row.id).unwrap_or_default(),
            });
        }
        Ok(products)
    }

    /// Create a product and its category links in one transaction
    pub async fn create_product(&self, data: ProductCreate) -> RepoResult<Product> {
        let mut tx = self.pool.begin().await?;

        for category_id in &data.category_ids {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM category WHERE id = ?")
                .bind(category_id)
                .fetch_optional(&mut *tx)
                .await?;
            if exists.is_none() {
                return Err(RepoError::Validation(format!(
                    "Category {category_id} not found"
                )));
            }
        }

        let id: i64 =
            sqlx::query_scalar("INSERT INTO product (name, price) VALUES (?1, ?2) RETURNING id")
                .bind(&data.name)
                .bind(data.price.to_string())
                .fetch_one(&mut *tx)
                .await?;

        for category_id in &data.category_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO product_category (product_id, category_id) VALUES (?1, ?2)",
            )
            .bind(id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Product {
            id,
            name: data.name,
            price: data.price,
            category_ids: data.category_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn repo() -> CatalogRepository {
        let db = DbService::in_memory().await.unwrap();
        CatalogRepository::new(db.pool)
    }

    #[tokio::test]
    async fn test_category_tree() {
        let repo = repo().await;
        let clothing = repo
            .create_category(CategoryCreate { name: "Clothing".into(), parent_id: None })
            .await
            .unwrap();
        let shirts = repo
            .create_category(CategoryCreate { name: "Shirts".into(), parent_id: Some(clothing.id) })
            .await
            .unwrap();

        assert_eq!(shirts.parent_id, Some(clothing.id));
        assert_eq!(repo.list_categories().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_category_with_missing_parent_rejected() {
        let repo = repo().await;
        let result = repo
            .create_category(CategoryCreate { name: "Orphan".into(), parent_id: Some(42) })
            .await;
        assert!(matches!(result, Err(RepoError::Validation(_))));
    }

    #[tokio::test]
    async fn test_product_with_categories() {
        let repo = repo().await;
        let tees = repo
            .create_category(CategoryCreate { name: "T-Shirts".into(), parent_id: None })
            .await
            .unwrap();

        let created = repo
            .create_product(ProductCreate {
                name: "Plain Tee".into(),
                price: Decimal::new(59950, 2),
                category_ids: vec![tees.id],
            })
            .await
            .unwrap();

        let products = repo.list_products().await.unwrap();
        assert_eq!(products, vec![created]);
        assert_eq!(products[0].price, Decimal::new(59950, 2));
        assert_eq!(products[0].category_ids, vec![tees.id]);
    }

    #[tokio::test]
    async fn test_product_with_unknown_category_rolls_back() {
        let repo = repo().await;
        let result = repo
            .create_product(ProductCreate {
                name: "Ghost".into(),
                price: Decimal::from(10),
                category_ids: vec![77],
            })
            .await;

        assert!(matches!(result, Err(RepoError::Validation(_))));
        assert!(repo.list_products().await.unwrap().is_empty());
    }
}
