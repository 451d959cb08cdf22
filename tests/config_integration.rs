//! Integration tests for dialect configuration.
//!
//! These tests verify that configuration parsing feeds the SQL rendering the
//! way the settings say.

use strata::prelude::*;
use strata::query::DatabaseType;

#[derive(Debug, Clone, Default)]
struct Account {
    balance: i64,
}

impl_entity!(Account, "account" { balance });

fn overdrawn_or_huge() -> Expression {
    let balance = Argument::of(PropertyPath::<i64>::new("balance"));
    balance.lt(0).or(balance.gt(1_000_000))
}

/// Test minimal configuration
#[test]
fn test_config_minimal() {
    let config = DialectConfig::from_json("{}").expect("Failed to parse config");
    assert_eq!(config, DialectConfig::default());
    assert_eq!(config.database, DatabaseType::PostgreSQL);
    assert!(config.quote_identifiers);
    assert!(!config.resolve_negative_conjunctions);
}

/// Test full configuration with all options
#[test]
fn test_config_full() {
    let config = DialectConfig::from_json(
        r#"{
            "database": "mysql",
            "resolve_negative_conjunctions": true,
            "quote_identifiers": false
        }"#,
    )
    .expect("Failed to parse config");

    assert_eq!(config.database, DatabaseType::MySQL);
    assert!(config.resolve_negative_conjunctions);
    assert!(!config.quote_identifiers);
}

/// Test that invalid configuration is rejected
#[test]
fn test_config_invalid() {
    let err = DialectConfig::from_json(r#"{ "database": "oracle" }"#).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);
}

/// Test configuration round-trip through serde
#[test]
fn test_config_serde_roundtrip() {
    let config = DialectConfig::builder()
        .database(DatabaseType::SQLite)
        .resolve_negative_conjunctions(true)
        .build();
    let json = serde_json::to_string(&config).expect("serialize");
    assert_eq!(DialectConfig::from_json(&json).expect("parse"), config);
}

/// Test that rendering follows the negation setting
#[test]
fn test_config_controls_negation() {
    let statement = MemoryDialect::new()
        .select(Account::default())
        .r#where(overdrawn_or_huge().negate());

    let (sql, _) = statement.to_sql(&DialectConfig::postgres());
    assert_eq!(
        sql,
        "SELECT * FROM account WHERE NOT (balance < $1 OR balance > $2)"
    );

    let resolved = DialectConfig::builder().resolve_negative_conjunctions(true).build();
    let (sql, _) = statement.to_sql(&resolved);
    assert_eq!(sql, "SELECT * FROM account WHERE balance >= $1 AND balance <= $2");
}

/// Test that quoting can be turned off
#[test]
fn test_config_controls_quoting() {
    let statement = MemoryDialect::new()
        .select(Account::default())
        .order_by(OrderByField::asc("balance"))
        .group_by("order");

    let (sql, _) = statement.to_sql(&DialectConfig::postgres());
    assert_eq!(sql, "SELECT * FROM account GROUP BY \"order\" ORDER BY balance ASC");

    let unquoted = DialectConfig::builder().quote_identifiers(false).build();
    let (sql, _) = statement.to_sql(&unquoted);
    assert_eq!(sql, "SELECT * FROM account GROUP BY order ORDER BY balance ASC");
}
