//! Bundle Rule Repository

use super::{RepoError, RepoResult, decode_ids, encode_ids};
use rust_decimal::Decimal;
use shared::models::{BundleRule, BundleRuleDraft, RuleStatus};
use sqlx::SqlitePool;
use std::str::FromStr;

const COLUMNS: &str = "id, name, categories, excluded_products, quantity, discount_price, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BundleRuleRow {
    id: i64,
    name: String,
    categories: String,
    excluded_products: String,
    quantity: i64,
    discount_price: String,
    status: String,
    created_at: i64,
    updated_at: i64,
}

impl BundleRuleRow {
    fn into_rule(self) -> RepoResult<BundleRule> {
        let categories = decode_ids(&self.categories, "categories")?;
        let excluded_products = decode_ids(&self.excluded_products, "excluded_products")?;
        let discount_price = Decimal::from_str(&self.discount_price)
            .map_err(|e| RepoError::Corrupt(format!("discount_price: {e}")))?;
        let quantity = u32::try_from(self.quantity)
            .map_err(|_| RepoError::Corrupt(format!("quantity: {}", self.quantity)))?;
        let status = RuleStatus::from_str(&self.status).unwrap_or_else(|e| {
            tracing::warn!(rule_id = self.id, error = %e, "Invalid status, treating rule as deleted");
            RuleStatus::Deleted
        });

        Ok(BundleRule {
            id: self.id,
            name: self.name,
            categories,
            excluded_products,
            quantity,
            discount_price,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone, Debug)]
pub struct BundleRuleRepository {
    pool: SqlitePool,
}

impl BundleRuleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find all active rules, newest first.
    ///
    /// Rows that fail to decode are skipped so one bad rule can't take the
    /// rest of the pricing down with it.
    pub async fn find_active(&self) -> RepoResult<Vec<BundleRule>> {
        let rows = sqlx::query_as::<_, BundleRuleRow>(&format!(
            "SELECT {COLUMNS} FROM bundle_rule WHERE status = 'active' ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut rules = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            match row.into_rule() {
                Ok(rule) => rules.push(rule),
                Err(e) => tracing::warn!(rule_id = id, error = %e, "Skipping undecodable bundle rule"),
            }
        }
        Ok(rules)
    }

    /// Find rule by id (any status)
    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<BundleRule>> {
        let row = sqlx::query_as::<_, BundleRuleRow>(&format!(
            "SELECT {COLUMNS} FROM bundle_rule WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(BundleRuleRow::into_rule).transpose()
    }

    /// Create a new rule
    pub async fn create(&self, draft: BundleRuleDraft) -> RepoResult<BundleRule> {
        let now = shared::util::now_millis();
        let categories = encode_ids(&draft.categories)?;
        let excluded = encode_ids(&draft.excluded_products)?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO bundle_rule (name, categories, excluded_products, quantity, discount_price, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 'active', ?6, ?6) RETURNING id",
        )
        .bind(&draft.name)
        .bind(categories)
        .bind(excluded)
        .bind(i64::from(draft.quantity))
        .bind(draft.discount_price.to_string())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create bundle rule".to_string()))
    }

    /// Update a rule's editable fields (status is left as is)
    pub async fn update(&self, id: i64, draft: BundleRuleDraft) -> RepoResult<BundleRule> {
        let now = shared::util::now_millis();
        let categories = encode_ids(&draft.categories)?;
        let excluded = encode_ids(&draft.excluded_products)?;

        let result = sqlx::query(
            "UPDATE bundle_rule SET name = ?1, categories = ?2, excluded_products = ?3, quantity = ?4, discount_price = ?5, updated_at = ?6 WHERE id = ?7",
        )
        .bind(&draft.name)
        .bind(categories)
        .bind(excluded)
        .bind(i64::from(draft.quantity))
        .bind(draft.discount_price.to_string())
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Bundle rule {id} not found")));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Bundle rule {id} not found")))
    }

    /// Soft delete: flip status, keep the row
    pub async fn soft_delete(&self, id: i64) -> RepoResult<()> {
        let now = shared::util::now_millis();
        let result = sqlx::query(
            "UPDATE bundle_rule SET status = 'deleted', updated_at = ?1 WHERE id = ?2",
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Bundle rule {id} not found")));
        }
        Ok(())
    }
}
