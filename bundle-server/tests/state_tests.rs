//! Server state bootstrap against a real database file

use bundle_server::ServerState;
use bundle_server::pricing::RuleSource;
use rust_decimal::Decimal;
use shared::models::BundleRuleDraft;

mod common;

#[tokio::test]
async fn test_initialize_creates_database_in_work_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config();
    config.work_dir = dir.path().join("data").to_string_lossy().into_owned();
    config.database_path = None;

    let state = ServerState::initialize(&config).await.unwrap();
    assert!(dir.path().join("data").join("bundle.db").exists());

    state
        .rules
        .create(BundleRuleDraft {
            name: "Tees".to_string(),
            quantity: 2,
            discount_price: Decimal::from(900),
            categories: vec![1],
            excluded_products: vec![],
        })
        .await
        .unwrap();

    // reopening the same file sees the rule
    let reopened = ServerState::initialize(&config).await.unwrap();
    let rules = reopened.rule_source.list_active_rules().await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].name, "Tees");
}
