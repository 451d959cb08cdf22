//! Integration tests for statements and dialects.
//!
//! These tests verify the public facade end to end:
//! - Statement building across every kind
//! - Execution against the in-memory dialect
//! - SQL rendering per database
//! - Error classification

use pretty_assertions::assert_eq;
use strata::prelude::*;
use strata::query::{DatabaseType, StatementKind};

#[derive(Debug, Clone, Default, PartialEq)]
struct Product {
    id: i64,
    title: String,
    price: f64,
    tags: Vec<String>,
    archived: bool,
    discount: Option<f64>,
}

impl_entity!(Product, "products" { id, title, price, tags, archived, discount });

fn price() -> Argument<f64> {
    Argument::of(PropertyPath::new("price"))
}

fn title() -> Argument<String> {
    Argument::of(PropertyPath::new("title"))
}

fn tags() -> Argument<Vec<String>> {
    Argument::of(PropertyPath::new("tags"))
}

fn product(id: i64, title: &str, price: f64, tags: &[&str]) -> Product {
    Product {
        id,
        title: title.to_string(),
        price,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..Product::default()
    }
}

fn catalog() -> MemoryDialect {
    let db = MemoryDialect::new();
    db.insert_rows([
        product(1, "Desk lamp", 24.5, &["home", "light"]),
        product(2, "Standing desk", 399.0, &["home", "office"]),
        product(3, "Notebook", 3.2, &[]),
        product(4, "Desk mat", 19.0, &["office"]),
    ])
    .expect("seed catalog");
    db
}

fn ids(products: &[Product]) -> Vec<i64> {
    products.iter().map(|p| p.id).collect()
}

/// Test a full select across filters, ordering and paging
#[tokio::test]
async fn test_select_with_every_feature() {
    let db = catalog();
    let found = db
        .select(Product::default())
        .r#where(title().contains("Desk").or(title().starts_with("Desk")))
        .r#where(price().leq(100.0))
        .order_by(OrderByField::asc("price"))
        .left_join_fetch("category")
        .fetch()
        .await
        .unwrap();

    assert_eq!(ids(&found), vec![4, 1]);
}

/// Test collection predicates
#[tokio::test]
async fn test_collection_predicates() {
    let db = catalog();

    let untagged = db
        .select(Product::default())
        .r#where(tags().is_empty())
        .fetch()
        .await
        .unwrap();
    assert_eq!(ids(&untagged), vec![3]);

    let picked = db
        .select(Product::default())
        .r#where(Argument::of(PropertyPath::<i64>::new("id")).is_in([2, 4, 9]))
        .fetch()
        .await
        .unwrap();
    assert_eq!(ids(&picked), vec![2, 4]);
}

/// Test that negation selects the complement
#[tokio::test]
async fn test_negated_filter_is_complement() {
    let db = catalog();
    let cheap_desk = title().like("Desk%").and(price().lt(20.0));

    let matching = db
        .select(Product::default())
        .r#where(cheap_desk.clone())
        .fetch()
        .await
        .unwrap();
    let rest = db
        .select(Product::default())
        .r#where(not(cheap_desk))
        .fetch()
        .await
        .unwrap();

    assert_eq!(ids(&matching), vec![4]);
    assert_eq!(ids(&rest), vec![1, 2, 3]);
}

/// Test the insert, update, delete lifecycle
#[tokio::test]
async fn test_modify_lifecycle() {
    let db = MemoryDialect::new();
    let title_path = PropertyPath::<String>::new("title");
    let price_path = PropertyPath::<f64>::new("price");
    let archived = PropertyPath::<bool>::new("archived");

    for (id, name, cost) in [(1, "Pen", 1.5), (2, "Ink", 8.0), (3, "Paper", 4.0)] {
        let inserted = db
            .insert(Product { id, ..Product::default() })
            .set(&title_path, name)
            .unwrap()
            .set(&price_path, cost)
            .unwrap()
            .execute()
            .await
            .unwrap();
        assert_eq!(inserted, 1);
    }

    let archived_rows = db
        .update(Product::default())
        .set_expression(&archived, price().gt(3.0))
        .unwrap()
        .execute_returning()
        .await
        .unwrap();
    assert_eq!(archived_rows.iter().filter(|p| p.archived).count(), 2);

    let flag = Argument::of(PropertyPath::<bool>::new("archived"));
    let removed = db
        .delete(Product::default())
        .r#where(flag.eq(true))
        .execute()
        .await
        .unwrap();
    assert_eq!(removed, 2);

    let left = db.select(Product::default()).fetch_one().await.unwrap();
    assert_eq!(left.title, "Pen");
}

/// Test that build-time misuse is reported as such
#[tokio::test]
async fn test_build_errors() {
    let db = MemoryDialect::new();
    let title_path = PropertyPath::<String>::new("title");

    let err = db
        .update(Product::default())
        .set(&title_path, "a")
        .and_then(|s| s.set(&title_path, "b"))
        .unwrap_err();
    assert!(err.is_build_error());
    assert_eq!(err.code, ErrorCode::DuplicateAssignment);

    let err = db.insert(Product::default()).execute().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::EmptyAssignment);
    assert!(db.is_empty());
}

/// Test type mismatches surface from the entity binding
#[tokio::test]
async fn test_type_mismatch_on_assignment() {
    let db = catalog();
    let price_as_text = PropertyPath::<String>::new("price");

    let err = db
        .update(Product::default())
        .set(&price_as_text, "free")
        .unwrap()
        .execute()
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::TypeMismatch);
    assert_eq!(db.rows::<Product>("products").unwrap(), catalog().rows::<Product>("products").unwrap());
}

/// Test SQL rendering through the facade
#[test]
fn test_sql_rendering_per_database() {
    let statement = MemoryDialect::new()
        .select(Product::default())
        .r#where(title().is_not_null().and(price().between(10.0, 20.0)))
        .order_by(OrderByField::desc("price").nulls(NullsOrder::Last))
        .page(3, 10)
        .unwrap();

    assert_eq!(statement.kind(), StatementKind::Select);

    let (sql, params) = statement.to_sql(&DialectConfig::postgres());
    assert_eq!(
        sql,
        "SELECT * FROM products WHERE title IS NOT NULL AND price >= $1 AND price <= $2 \
         ORDER BY price DESC NULLS LAST LIMIT 10 OFFSET 20"
    );
    assert_eq!(params, vec![Value::Float(10.0), Value::Float(20.0)]);

    let config = DialectConfig::builder().database(DatabaseType::SQLite).build();
    let (sql, _) = statement.to_sql(&config);
    assert!(sql.contains("price >= ?1 AND price <= ?2"));
}

/// Test the Display rendering used in diagnostics
#[test]
fn test_expression_display() {
    let expr = title().eq("Desk lamp").or(tags().is_not_empty());
    assert_eq!(expr.to_string(), "title = 'Desk lamp' OR tags IS NOT EMPTY");
    assert_eq!(not(expr).to_string(), "NOT (title = 'Desk lamp' OR tags IS NOT EMPTY)");
}
