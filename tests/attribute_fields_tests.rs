//! Integration tests for attribute and input field mapping over the fixture models

mod harness;

use harness::*;
use indexmap::IndexMap;
use orm_graphql::prelude::*;
use serde_json::json;

fn type_of(fields: &IndexMap<String, FieldConfig>, key: &str) -> Option<String> {
    fields.get(key).map(|field| field.ty.to_string())
}

// ---------------------------------------------------------------------------
// attribute_fields_for_create
// ---------------------------------------------------------------------------

#[test]
fn test_create_fields() {
    let db = database();
    let fields = attribute_fields_for_create(
        model(&db, "Customer").as_ref(),
        &AttributeFieldsOptions::default(),
    );

    assert_eq!(type_of(&fields, "firstName").as_deref(), Some("String!"));
    assert_eq!(type_of(&fields, "lastName").as_deref(), Some("String!"));
    assert_eq!(type_of(&fields, "address").as_deref(), Some("String"));
    assert_eq!(type_of(&fields, "phone").as_deref(), Some("String"));
    assert!(fields.get("id").is_none());
    assert!(fields.get("createdAt").is_none());
    assert!(fields.get("updatedAt").is_none());
}

#[test]
fn test_create_fields_exclude_list() {
    let db = database();
    let options = AttributeFieldsOptions::new().exclude(vec!["lastName", "phone"]);
    let fields = attribute_fields_for_create(model(&db, "Customer").as_ref(), &options);

    let names: Vec<&str> = fields.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["firstName", "address"]);
    assert_eq!(type_of(&fields, "firstName").as_deref(), Some("String!"));
}

#[test]
fn test_create_fields_exclude_predicate() {
    let db = database();
    let options = AttributeFieldsOptions::new()
        .exclude(KeyFilter::predicate(|key| key == "lastName" || key == "phone"));
    let fields = attribute_fields_for_create(model(&db, "Customer").as_ref(), &options);

    assert!(fields.get("lastName").is_none());
    assert!(fields.get("phone").is_none());
    assert_eq!(type_of(&fields, "address").as_deref(), Some("String"));
}

#[test]
fn test_create_fields_cover_each_column_once() {
    let db = database();
    for name in ["Customer", "Product", "Warehouse", "BranchCustomer"] {
        let model = model(&db, name);
        let fields =
            attribute_fields_for_create(model.as_ref(), &AttributeFieldsOptions::default());
        let expected: Vec<String> = model
            .list_attributes()
            .into_iter()
            .filter(|attribute| !attribute.auto_generated)
            .map(|attribute| attribute.name)
            .collect();

        assert_eq!(fields.len(), expected.len(), "{}", name);
        assert!(expected.iter().all(|key| fields.contains_key(key)), "{}", name);
    }
}

#[test]
fn test_create_fields_forced_nullable() {
    let db = database();
    let options = AttributeFieldsOptions::new().allow_null(true);
    let fields = attribute_fields_for_create(model(&db, "Customer").as_ref(), &options);

    assert!(fields.values().all(|field| !field.ty.to_string().ends_with('!')));
}

// ---------------------------------------------------------------------------
// attribute_fields_for_update
// ---------------------------------------------------------------------------

#[test]
fn test_update_fields() {
    let db = database();
    let fields = attribute_fields_for_update(
        model(&db, "Customer").as_ref(),
        &AttributeFieldsOptions::default(),
    );

    assert_eq!(type_of(&fields, "firstName").as_deref(), Some("String"));
    assert_eq!(type_of(&fields, "lastName").as_deref(), Some("String"));
    assert_eq!(type_of(&fields, "address").as_deref(), Some("String"));
    assert_eq!(type_of(&fields, "phone").as_deref(), Some("String"));
    assert_eq!(type_of(&fields, "id").as_deref(), Some("Int"));
    assert!(fields.get("createdAt").is_none());
    assert!(fields.get("updatedAt").is_none());
}

#[test]
fn test_update_fields_exclude() {
    let db = database();
    for options in [
        AttributeFieldsOptions::new().exclude(vec!["lastName", "phone"]),
        AttributeFieldsOptions::new()
            .exclude(KeyFilter::predicate(|key| key == "lastName" || key == "phone")),
    ] {
        let fields = attribute_fields_for_update(model(&db, "Customer").as_ref(), &options);
        let names: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["id", "firstName", "address"]);
    }
}

// ---------------------------------------------------------------------------
// attribute_fields
// ---------------------------------------------------------------------------

#[test]
fn test_output_fields() {
    let db = database();
    let fields = attribute_fields(
        model(&db, "Product").as_ref(),
        &AttributeFieldsOptions::default(),
    );

    assert_eq!(type_of(&fields, "id").as_deref(), Some("Int!"));
    assert_eq!(type_of(&fields, "weight").as_deref(), Some("String!"));
    assert_eq!(type_of(&fields, "createdAt").as_deref(), Some("String!"));
    assert_eq!(type_of(&fields, "WarehouseId").as_deref(), Some("Int"));
}

#[test]
fn test_output_fields_only_and_map() {
    let db = database();
    let options = AttributeFieldsOptions::new()
        .only(vec!["id", "firstName", "lastName"])
        .exclude(vec!["lastName"])
        .map(KeyMap::table([("firstName", "givenName")]));
    let fields = attribute_fields(model(&db, "Customer").as_ref(), &options);

    let names: Vec<&str> = fields.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["id", "givenName"]);
}

#[tokio::test]
async fn test_global_ids_through_schema() {
    let db = database();
    let defaults = CreateOptions::default();
    model(&db, "Warehouse")
        .create(record(json!({ "address": "1 Dock Road" })), &defaults)
        .await
        .expect("create warehouse");
    model(&db, "Product")
        .create(
            record(json!({ "name": "Widget", "weight": "2.5", "WarehouseId": 1 })),
            &defaults,
        )
        .await
        .expect("create product");

    let schema = ModelSchema::new(db.models())
        .attribute_options(AttributeFieldsOptions::new().global_id(true))
        .finish()
        .expect("schema should build");

    let product_id = to_global_id("Product", "1");
    let response = execute(
        &schema,
        "query ($id: ID) { product(id: $id) { id WarehouseId } }",
        json!({ "id": product_id }),
    )
    .await;
    assert_eq!(
        data(response),
        json!({
            "product": {
                "id": product_id,
                "WarehouseId": to_global_id("Warehouse", "1"),
            }
        })
    );
}

const SKU_MODELS: &str = r#"
models:
  - name: Sku
    attributes:
      - name: code
        type: string
        primary_key: true
      - name: label
        type: string
"#;

#[tokio::test]
async fn test_global_ids_round_trip_string_keys() {
    let config = DatabaseConfig::from_yaml_str(SKU_MODELS).expect("sku config should load");
    let db = InMemoryDatabase::from_config(&config);
    let schema = ModelSchema::new(db.models())
        .attribute_options(AttributeFieldsOptions::new().global_id(true))
        .finish()
        .expect("schema should build");
    let sku_id = to_global_id("Sku", "0042");

    let created = execute(
        &schema,
        "mutation { createSku(values: { code: \"0042\", label: \"a\" }) { code label } }",
        json!({}),
    )
    .await;
    assert_eq!(
        data(created),
        json!({ "createSku": { "code": sku_id, "label": "a" } })
    );

    let updated = execute(
        &schema,
        "mutation ($values: UpdateSku!) { updateSku(values: $values) { code label } }",
        json!({ "values": { "code": sku_id, "label": "b" } }),
    )
    .await;
    assert_eq!(
        data(updated),
        json!({ "updateSku": { "code": sku_id, "label": "b" } })
    );

    let destroyed = execute(
        &schema,
        "mutation ($code: ID) { destroySku(code: $code) }",
        json!({ "code": sku_id }),
    )
    .await;
    assert_eq!(data(destroyed), json!({ "destroySku": 1 }));
}

#[tokio::test]
async fn test_schema_exposes_input_types() {
    let db = database();
    let sdl = schema(&db).sdl();

    assert!(sdl.contains("input CreateCustomer"));
    assert!(sdl.contains("input UpdateCustomer"));
    assert!(sdl.contains("scalar JSON"));
}
