use super::*;

#[test]
fn test_snake_case_headers() {
    assert_eq!(snake_case("CampaignID"), "campaign_id");
    assert_eq!(snake_case("Customer Name"), "customer_name");
    assert_eq!(snake_case("JoinDate"), "join_date");
    assert_eq!(snake_case("  First Name "), "first_name");
    assert_eq!(snake_case("HTTPServer"), "http_server");
    assert_eq!(snake_case("e-mail"), "e_mail");
    assert_eq!(snake_case("already_snake"), "already_snake");
    assert_eq!(snake_case("\u{feff}CustomerID"), "customer_id");
    assert_eq!(snake_case("Address2Line"), "address2_line");
    assert_eq!(snake_case("  "), "");
}

#[test]
fn test_resolve_renames_and_classifies() {
    let sale = SchemaMapping::for_entity(EntityKind::Sale);
    let campaign = sale.resolve("CampaignID").unwrap();
    assert_eq!(campaign.name, "campaign_id");
    assert_eq!(campaign.kind, FieldKind::NumericIdentifier);

    let customer = SchemaMapping::for_entity(EntityKind::Customer);
    let name = customer.resolve("Customer Name").unwrap();
    assert_eq!(name.name, "customer_name");
    assert_eq!(name.kind, FieldKind::Text);

    let join = customer.resolve("JoinDate").unwrap();
    assert_eq!(join.name, "join_date");
    assert_eq!(join.kind, FieldKind::Date);
}

#[test]
fn test_identifier_classification_ignores_header_casing() {
    let sale = SchemaMapping::for_entity(EntityKind::Sale);
    for header in ["CustomerID", "customer_id", "CUSTOMER_ID", "customerid", "Customer Id"] {
        let spec = sale.resolve(header).unwrap_or_else(|| panic!("{} unmapped", header));
        assert_eq!(spec.name, "customer_id");
        assert_eq!(spec.kind, FieldKind::NumericIdentifier);
    }
}

#[test]
fn test_aliases_from_legacy_headers() {
    let sale = SchemaMapping::for_entity(EntityKind::Sale);
    assert_eq!(sale.resolve("TransactionID").unwrap().name, "sale_id");
    assert_eq!(sale.resolve("SaleAmount").unwrap().name, "total_amount");
    assert_eq!(sale.resolve("ItemsPurchased").unwrap().name, "quantity");
    assert_eq!(sale.resolve("saleamount").unwrap().name, "total_amount");

    let product = SchemaMapping::for_entity(EntityKind::Product);
    assert_eq!(product.resolve("UnitPrice").unwrap().name, "price");
    assert_eq!(product.resolve("ProductName").unwrap().name, "product_name");

    let customer = SchemaMapping::for_entity(EntityKind::Customer);
    assert_eq!(customer.resolve("Name").unwrap().name, "customer_name");
    assert_eq!(customer.resolve("LoyaltyTier").unwrap().name, "loyalty_tier");
}

#[test]
fn test_unknown_header_is_unmapped() {
    let sale = SchemaMapping::for_entity(EntityKind::Sale);
    assert!(sale.resolve("Favourite Colour").is_none());
    assert!(sale.resolve("").is_none());
}

#[test]
fn test_primary_and_foreign_keys() {
    let sale = SchemaMapping::for_entity(EntityKind::Sale);
    let pk: Vec<&str> = sale.primary_key().map(|c| c.name).collect();
    assert_eq!(pk, vec!["sale_id"]);

    let fks: Vec<(&str, EntityKind)> = sale.foreign_keys().map(|(c, e)| (c.name, e)).collect();
    assert_eq!(
        fks,
        vec![
            ("customer_id", EntityKind::Customer),
            ("product_id", EntityKind::Product)
        ]
    );

    let campaign = sale.column("campaign_id").unwrap();
    assert!(!campaign.required);
    assert_eq!(campaign.role, ColumnRole::Attribute);
}

#[test]
fn test_every_entity_has_a_single_integer_key() {
    for entity in EntityKind::ALL {
        let mapping = SchemaMapping::for_entity(entity);
        let keys: Vec<_> = mapping.primary_key().collect();
        assert_eq!(keys.len(), 1, "{} key count", entity);
        assert_eq!(keys[0].kind, FieldKind::NumericIdentifier);
        assert!(keys[0].required);
        assert!(mapping.column(entity.outlier_column()).is_some());
    }
}

#[test]
fn test_value_constraints() {
    assert!(ValueConstraint::Positive.check(&Value::Integer(1)).is_ok());
    assert!(ValueConstraint::Positive.check(&Value::Integer(0)).is_err());
    assert!(ValueConstraint::NonNegative.check(&Value::Decimal(0.0)).is_ok());
    assert!(ValueConstraint::NonNegative
        .check(&Value::Decimal(-0.01))
        .is_err());
    assert!(ValueConstraint::Positive.check(&Value::Null).is_ok());

    let rating = ValueConstraint::Range { min: 1, max: 5 };
    assert!(rating.check(&Value::Decimal(1.0)).is_ok());
    assert!(rating.check(&Value::Decimal(5.0)).is_ok());
    assert!(rating.check(&Value::Decimal(0.5)).is_err());
    assert!(rating.check(&Value::Integer(6)).is_err());
}

#[test]
fn test_store_and_flag_columns() {
    let sale = SchemaMapping::for_entity(EntityKind::Sale);
    let card = sale.resolve("StoreCreditCard").unwrap();
    assert_eq!(card.name, "store_credit_card");
    assert_eq!(card.kind, FieldKind::Flag);
    let store = sale.resolve("StoreID").unwrap();
    assert_eq!(store.name, "store_id");
    assert_eq!(store.kind, FieldKind::NumericIdentifier);
    assert_eq!(store.role, ColumnRole::Attribute);

    let product = SchemaMapping::for_entity(EntityKind::Product);
    assert_eq!(product.resolve("Seasonal").unwrap().kind, FieldKind::Flag);
    let rating = product.resolve("Rating").unwrap();
    assert_eq!(rating.kind, FieldKind::Decimal);
    assert_eq!(rating.constraint, ValueConstraint::Range { min: 1, max: 5 });
}

#[test]
fn test_region_vocabulary_folds_synonyms() {
    let customer = SchemaMapping::for_entity(EntityKind::Customer);
    let region = customer.column("region").unwrap();
    let formats = DateFormats::default();
    for raw in ["South West", "southwest", "South-Western", "south-west"] {
        assert_eq!(
            region.normalize(Some(raw), &formats).unwrap(),
            Value::from("SOUTH-WEST"),
            "{}",
            raw
        );
    }
    assert_eq!(region.normalize(Some("Midlands"), &formats).unwrap(), Value::from("MIDLANDS"));
    assert_eq!(region.normalize(None, &formats).unwrap(), Value::from("UNKNOWN"));
}

#[test]
fn test_loyalty_tier_vocabulary_is_closed() {
    let customer = SchemaMapping::for_entity(EntityKind::Customer);
    let tier = customer.column("loyalty_tier").unwrap();
    let formats = DateFormats::default();
    assert_eq!(tier.normalize(Some(" silver "), &formats).unwrap(), Value::from("SILVER"));
    assert_eq!(tier.normalize(Some("Platinum"), &formats).unwrap(), Value::from("UNKNOWN"));
    assert_eq!(tier.normalize(Some(""), &formats).unwrap(), Value::from("UNKNOWN"));
}

#[test]
fn test_column_check_covers_type_range() {
    let sale = SchemaMapping::for_entity(EntityKind::Sale);
    let amount = sale.column("total_amount").unwrap();
    assert!(amount.check(&Value::Decimal(9_999_999_999_999.99)).is_ok());
    assert!(amount.check(&Value::Decimal(1e16)).is_err());
    assert!(amount.check(&Value::Decimal(-1.0)).is_err());
}

#[test]
fn test_mapping_serializes_for_listing() {
    let sale = SchemaMapping::for_entity(EntityKind::Sale);
    let json = serde_json::to_value(sale.column("customer_id").unwrap()).unwrap();
    assert_eq!(json["name"], "customer_id");
    assert_eq!(json["kind"], "numeric_identifier");
    assert_eq!(json["role"], "foreign_key");
    assert_eq!(json["references"], "customer");
    assert!(json.get("vocabulary").is_none());

    let customer = SchemaMapping::for_entity(EntityKind::Customer);
    let json = serde_json::to_value(customer.column("loyalty_tier").unwrap()).unwrap();
    assert_eq!(json["vocabulary"]["closed"], true);
    assert_eq!(json["vocabulary"]["values"][2], "GOLD");
}
