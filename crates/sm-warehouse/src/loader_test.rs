use super::*;
use sm_core::{scrub, RawRecord, ScrubOptions};
use sm_db::DuckDbBackend;

fn raw(pairs: &[(&str, &str)]) -> RawRecord {
    pairs.iter().copied().collect()
}

fn customers() -> ScrubOutcome {
    let records = [
        raw(&[("CustomerID", "1"), ("First Name", "ann")]),
        raw(&[("CustomerID", "2"), ("First Name", "bob")]),
    ];
    scrub(&records, EntityKind::Customer, &ScrubOptions::default())
}

fn products() -> ScrubOutcome {
    let records = [raw(&[("ProductID", "10"), ("ProductName", "widget"), ("Price", "9.99")])];
    scrub(&records, EntityKind::Product, &ScrubOptions::default())
}

fn sales(rows: &[(&str, &str, &str)]) -> ScrubOutcome {
    let records: Vec<RawRecord> = rows
        .iter()
        .map(|&(id, customer, product)| {
            raw(&[
                ("SaleID", id),
                ("SaleDate", "2024-02-01"),
                ("CustomerID", customer),
                ("ProductID", product),
                ("Quantity", "1"),
                ("TotalAmount", "9.99"),
            ])
        })
        .collect();
    scrub(&records, EntityKind::Sale, &ScrubOptions::default())
}

#[tokio::test]
async fn test_load_all_in_dimension_order() {
    let db = DuckDbBackend::in_memory().unwrap();
    let loader = WarehouseLoader::new(&db, None);

    // facts listed first still load last
    let sets = [sales(&[("100", "1", "10")]), products(), customers()];
    let summary = loader.load_all(&sets).await;

    assert!(summary.is_success());
    let order: Vec<EntityKind> = summary.loads.iter().map(|l| l.entity).collect();
    assert_eq!(order, EntityKind::ALL.to_vec());
    assert_eq!(summary.get(EntityKind::Sale).unwrap().rows_loaded, 1);
    assert_eq!(
        db.query_keys("SELECT customer_id FROM customer ORDER BY 1").await.unwrap(),
        vec![1, 2]
    );
}

#[tokio::test]
async fn test_sale_with_unknown_customer_rejected() {
    let db = DuckDbBackend::in_memory().unwrap();
    let loader = WarehouseLoader::new(&db, None);

    let sets = [
        customers(),
        products(),
        sales(&[("100", "1", "10"), ("101", "999", "10"), ("102", "2", "77")]),
    ];
    let summary = loader.load_all(&sets).await;
    assert!(summary.is_success());

    let sale = summary.get(EntityKind::Sale).unwrap();
    assert_eq!(sale.rows_loaded, 1);
    assert_eq!(sale.rejected.len(), 2);
    assert!(sale
        .rejected
        .iter()
        .all(|i| i.kind == sm_core::IssueKind::ReferentialViolation));
    assert_eq!(sale.rejected[0].column.as_deref(), Some("customer_id"));
    assert_eq!(
        sale.rejected[0].message,
        "sale 101: customer_id 999 not found in customer"
    );
    assert_eq!(sale.rejected[1].column.as_deref(), Some("product_id"));

    let orphans = db
        .query_keys(
            "SELECT s.sale_id FROM sale s LEFT JOIN customer c USING (customer_id) WHERE c.customer_id IS NULL",
        )
        .await
        .unwrap();
    assert!(orphans.is_empty());
}

#[tokio::test]
async fn test_absent_text_columns_get_sentinel() {
    let db = DuckDbBackend::in_memory().unwrap();
    let loader = WarehouseLoader::new(&db, None);
    loader.load_entity(&customers()).await.unwrap();

    let rows = db
        .query_text_rows("SELECT email, join_date FROM customer WHERE customer_id = 1")
        .await
        .unwrap();
    assert_eq!(rows, vec![vec![Some("UNKNOWN".to_string()), None]]);
}

#[tokio::test]
async fn test_oversized_amount_rejected_rest_loads() {
    let db = DuckDbBackend::in_memory().unwrap();
    let loader = WarehouseLoader::new(&db, None);

    let records: Vec<RawRecord> = [("100", "250000000000000000"), ("101", "12500000000.50")]
        .iter()
        .map(|&(id, amount)| {
            raw(&[
                ("SaleID", id),
                ("SaleDate", "2024-02-01"),
                ("CustomerID", "1"),
                ("ProductID", "10"),
                ("Quantity", "1"),
                ("TotalAmount", amount),
            ])
        })
        .collect();
    let scrubbed = scrub(&records, EntityKind::Sale, &ScrubOptions::default());
    assert_eq!(scrubbed.stats.rejected, 1);
    assert_eq!(scrubbed.issues[0].column.as_deref(), Some("total_amount"));

    let summary = loader.load_all(&[customers(), products(), scrubbed]).await;
    assert!(summary.is_success());
    assert_eq!(summary.get(EntityKind::Sale).unwrap().rows_loaded, 1);

    let rows = db
        .query_text_rows("SELECT CAST(sale_id AS VARCHAR), CAST(total_amount AS VARCHAR) FROM sale")
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![vec![Some("101".to_string()), Some("12500000000.50".to_string())]]
    );
}

#[tokio::test]
async fn test_absent_flags_load_as_no() {
    let db = DuckDbBackend::in_memory().unwrap();
    let loader = WarehouseLoader::new(&db, None);
    loader.load_entity(&products()).await.unwrap();

    let rows = db
        .query_text_rows("SELECT seasonal, CAST(rating AS VARCHAR) FROM product")
        .await
        .unwrap();
    assert_eq!(rows, vec![vec![Some("N".to_string()), None]]);
}

#[tokio::test]
async fn test_fact_before_dimension_fails() {
    let db = DuckDbBackend::in_memory().unwrap();
    let loader = WarehouseLoader::new(&db, None);

    let err = loader
        .load_entity(&sales(&[("1", "1", "10")]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LoadError::DimensionNotLoaded {
            entity: EntityKind::Sale,
            ..
        }
    ));
    assert!(!db.relation_exists("sale").await.unwrap());
}

#[tokio::test]
async fn test_reload_is_idempotent() {
    let db = DuckDbBackend::in_memory().unwrap();
    let loader = WarehouseLoader::new(&db, Some("mart"));
    let sets = [customers(), products(), sales(&[("100", "1", "10")])];

    loader.load_all(&sets).await;
    let first = db
        .query_text_rows(&loader.table(EntityKind::Sale).select_text_sql())
        .await
        .unwrap();
    loader.load_all(&sets).await;
    let second = db
        .query_text_rows(&loader.table(EntityKind::Sale).select_text_sql())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        db.query_keys(&loader.table(EntityKind::Customer).key_sql()).await.unwrap().len(),
        2
    );
}

/// Delegates to DuckDB but refuses to replace one table
struct FailingStore {
    inner: DuckDbBackend,
    fail_on: EntityKind,
}

#[async_trait::async_trait]
impl Database for FailingStore {
    async fn relation_exists(&self, name: &str) -> sm_db::DbResult<bool> {
        self.inner.relation_exists(name).await
    }

    async fn query_keys(&self, sql: &str) -> sm_db::DbResult<Vec<i64>> {
        self.inner.query_keys(sql).await
    }

    async fn query_text_rows(&self, sql: &str) -> sm_db::DbResult<Vec<Vec<Option<String>>>> {
        self.inner.query_text_rows(sql).await
    }

    async fn replace_table(
        &self,
        table: &TableSchema,
        rows: &[Vec<Value>],
    ) -> sm_db::DbResult<usize> {
        if table.entity() == self.fail_on {
            return Err(DbError::ConnectionError("disk full".to_string()));
        }
        self.inner.replace_table(table, rows).await
    }

    fn db_type(&self) -> &'static str {
        "failing"
    }

    async fn create_schema_if_not_exists(&self, schema: &str) -> sm_db::DbResult<()> {
        self.inner.create_schema_if_not_exists(schema).await
    }
}

#[tokio::test]
async fn test_store_failure_stops_at_entity() {
    let db = FailingStore {
        inner: DuckDbBackend::in_memory().unwrap(),
        fail_on: EntityKind::Product,
    };
    let loader = WarehouseLoader::new(&db, None);
    let sets = [customers(), products(), sales(&[("100", "1", "10")])];
    let summary = loader.load_all(&sets).await;

    assert!(!summary.is_success());
    let failure = summary.failure.as_ref().unwrap();
    assert!(matches!(failure, LoadError::StoreUnavailable { .. }));
    assert_eq!(failure.entity(), EntityKind::Product);
    assert!(failure.to_string().starts_with("[L001]"));

    // customer committed before the failure and stays
    assert_eq!(summary.loads.len(), 1);
    assert!(db.relation_exists("customer").await.unwrap());
    assert!(!db.relation_exists("sale").await.unwrap());
}
