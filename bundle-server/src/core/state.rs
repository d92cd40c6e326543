//! Server State
//!
//! Everything a handler needs, cheap to clone (all `Arc`s or pools).

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::auth::{HostAuthority, TokenAuthority};
use crate::cart::CartSessions;
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::db::repository::{BundleRuleRepository, CatalogRepository};
use crate::pricing::{BundlePricingEngine, RuleSnapshot, RuleSource};
use crate::services::CatalogService;

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub catalog: Arc<CatalogService>,
    pub rules: BundleRuleRepository,
    pub rule_source: Arc<dyn RuleSource>,
    pub engine: BundlePricingEngine,
    pub carts: Arc<CartSessions>,
    pub authority: Arc<dyn HostAuthority>,
    /// 服务启动时间 (用于 uptime)
    pub started_at: Instant,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("catalog", &self.catalog)
            .field("engine", &self.engine)
            .field("carts", &self.carts.len())
            .field("authority", &"<HostAuthority>")
            .finish()
    }
}

impl ServerState {
    /// Open the database under the configured paths and build the state
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        let db = DbService::new(&config.database_path()).await?;
        Self::from_db(config.clone(), db).await
    }

    /// Build the state on an already opened database (tests use an in-memory one)
    pub async fn from_db(config: Config, db: DbService) -> Result<Self> {
        let catalog = Arc::new(CatalogService::new(CatalogRepository::new(db.pool.clone())));
        catalog.warmup().await.map_err(crate::utils::AppError::from)?;

        let rules = BundleRuleRepository::new(db.pool.clone());
        let authority: Arc<dyn HostAuthority> = Arc::new(
            TokenAuthority::new(config.admin_token.clone(), config.nonce_secret.clone())
                .map_err(|e| ServerError::Config(format!("Invalid nonce key: {e}")))?,
        );

        Ok(Self {
            engine: BundlePricingEngine::new(catalog.clone()),
            rule_source: Arc::new(rules.clone()),
            rules,
            catalog,
            carts: Arc::new(CartSessions::with_limits(
                Duration::from_secs(config.cart_idle_ttl_secs),
                config.cart_max_sessions,
            )),
            authority,
            started_at: Instant::now(),
            config,
            db,
        })
    }

    /// Swap the admin authority (host platforms bring their own)
    pub fn with_authority(mut self, authority: Arc<dyn HostAuthority>) -> Self {
        self.authority = authority;
        self
    }

    /// Active rules for the current request
    pub async fn rule_snapshot(&self) -> RuleSnapshot {
        RuleSnapshot::load(self.rule_source.as_ref()).await
    }
}
