use super::*;
use chrono::NaiveDate;
use sm_core::EntityKind;

fn product_row(id: i64, name: &str, price: Option<f64>) -> Vec<Value> {
    vec![
        Value::Integer(id),
        Value::from(name),
        Value::from("TOYS"),
        price.map_or(Value::Null, Value::Decimal),
        Value::Null,
        Value::from("N"),
    ]
}

#[tokio::test]
async fn test_in_memory() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(db.db_type(), "duckdb");
}

#[tokio::test]
async fn test_query_keys_skips_nulls() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch_sync("CREATE TABLE nums AS SELECT * FROM (VALUES (3), (NULL), (1)) t(n)")
        .unwrap();

    let keys = db.query_keys("SELECT n FROM nums ORDER BY n").await.unwrap();
    assert_eq!(keys, vec![1, 3]);
}

#[tokio::test]
async fn test_relation_exists_in_schema() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert!(!db.relation_exists("mart.product").await.unwrap());

    db.create_schema_if_not_exists("mart").await.unwrap();
    db.create_schema_if_not_exists("mart").await.unwrap();
    db.execute_batch_sync("CREATE TABLE mart.product (id INT)")
        .unwrap();

    assert!(db.relation_exists("mart.product").await.unwrap());
    assert!(!db.relation_exists("product").await.unwrap());
}

#[tokio::test]
async fn test_replace_table_writes_typed_rows() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = TableSchema::new(EntityKind::Product, None);

    let inserted = db
        .replace_table(
            &table,
            &[product_row(2, "GADGET", None), product_row(1, "WIDGET", Some(9.5))],
        )
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    let rows = db.query_text_rows(&table.select_text_sql()).await.unwrap();
    assert_eq!(
        rows,
        vec![
            vec![
                Some("1".to_string()),
                Some("WIDGET".to_string()),
                Some("TOYS".to_string()),
                Some("9.50".to_string()),
                None,
                Some("N".to_string())
            ],
            vec![
                Some("2".to_string()),
                Some("GADGET".to_string()),
                Some("TOYS".to_string()),
                None,
                None,
                Some("N".to_string())
            ],
        ]
    );

    let mut keys = db.query_keys(&table.key_sql()).await.unwrap();
    keys.sort_unstable();
    assert_eq!(keys, vec![1, 2]);
}

#[tokio::test]
async fn test_replace_table_binds_dates() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.create_schema_if_not_exists("mart").await.unwrap();
    let table = TableSchema::new(EntityKind::Sale, Some("mart"));
    let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

    db.replace_table(
        &table,
        &[vec![
            Value::Integer(10),
            Value::Date(date),
            Value::Integer(1),
            Value::Integer(1),
            Value::Null,
            Value::Integer(3),
            Value::Decimal(29.99),
            Value::Null,
            Value::from("Y"),
        ]],
    )
    .await
    .unwrap();

    let keys = db
        .query_keys("SELECT sale_id FROM mart.sale WHERE sale_date = DATE '2024-01-15' AND campaign_id IS NULL")
        .await
        .unwrap();
    assert_eq!(keys, vec![10]);
}

#[tokio::test]
async fn test_replace_table_is_idempotent() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = TableSchema::new(EntityKind::Product, None);
    let rows = [product_row(1, "WIDGET", Some(1.0))];

    db.replace_table(&table, &rows).await.unwrap();
    db.replace_table(&table, &rows).await.unwrap();

    assert_eq!(db.query_keys(&table.key_sql()).await.unwrap(), vec![1]);
}

#[tokio::test]
async fn test_failed_replace_keeps_previous_table() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = TableSchema::new(EntityKind::Product, None);
    db.replace_table(&table, &[product_row(1, "WIDGET", Some(1.0))])
        .await
        .unwrap();

    // product_name is NOT NULL
    let mut bad = product_row(2, "", None);
    bad[1] = Value::Null;
    let err = db
        .replace_table(&table, &[product_row(3, "GIZMO", None), bad])
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ExecutionError(_)));

    let keys = db.query_keys(&table.key_sql()).await.unwrap();
    assert_eq!(keys, vec![1]);
}

#[tokio::test]
async fn test_replace_table_rejects_wrong_width() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = TableSchema::new(EntityKind::Product, None);
    let err = db
        .replace_table(&table, &[vec![Value::Integer(1)]])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("expected 6"));
    assert!(!db.relation_exists("product").await.unwrap());
}

#[tokio::test]
async fn test_missing_table_classified() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db.query_keys("SELECT id FROM nowhere").await.unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(_)));
}

#[tokio::test]
async fn test_amount_at_decimal_limit_fits() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = TableSchema::new(EntityKind::Product, None);
    db.replace_table(&table, &[product_row(1, "YACHT", Some(9_999_999_999_999.99))])
        .await
        .unwrap();

    let rows = db.query_text_rows(&table.select_text_sql()).await.unwrap();
    assert_eq!(rows[0][3].as_deref(), Some("9999999999999.99"));
}

#[tokio::test]
async fn test_file_backed_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("warehouse.duckdb");
    let table = TableSchema::new(EntityKind::Product, None);
    {
        let db = DuckDbBackend::from_path(&path).unwrap();
        db.replace_table(&table, &[product_row(5, "LAMP", Some(20.0))])
            .await
            .unwrap();
    }
    let db = DuckDbBackend::new(path.to_str().unwrap()).unwrap();
    assert_eq!(db.query_keys(&table.key_sql()).await.unwrap(), vec![5]);
}
