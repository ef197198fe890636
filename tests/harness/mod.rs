//! Shared harness for the GraphQL integration tests
//!
//! Loads `tests/fixtures/models.yaml` into a fresh [`InMemoryDatabase`] and
//! offers helpers to seed rows and run operations against a dynamic schema.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! mod harness;
//! use harness::*;
//! ```

#![allow(dead_code)]

use async_graphql::dynamic::Schema;
use async_graphql::{Request, Response, Variables};
use serde_json::{Value as JsonValue, json};

use orm_graphql::prelude::*;

pub const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/models.yaml");

pub const ADDRESS: &str = "Wouldn't you like to know!";

/// Request data carried by the destroy hook tests
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// A fresh database over the fixture models
pub fn database() -> InMemoryDatabase {
    let config = DatabaseConfig::from_yaml_file(FIXTURE).expect("fixture config should load");
    InMemoryDatabase::from_config(&config)
}

pub fn model(db: &InMemoryDatabase, name: &str) -> ModelRef {
    db.model(name)
        .unwrap_or_else(|| panic!("fixture model {} should exist", name))
}

pub fn record(value: JsonValue) -> Record {
    match value {
        JsonValue::Object(record) => record,
        other => panic!("expected an object, got {}", other),
    }
}

/// Insert Andy Edwards and return his id
pub async fn seed_customer(db: &InMemoryDatabase) -> i64 {
    let created = model(db, "Customer")
        .create(
            record(json!({
                "firstName": "Andy",
                "lastName": "Edwards",
                "address": ADDRESS,
            })),
            &CreateOptions::default(),
        )
        .await
        .expect("seeding a customer should succeed");
    created
        .get("id")
        .and_then(JsonValue::as_i64)
        .expect("created customer should have an integer id")
}

pub async fn find_customer(db: &InMemoryDatabase, id: i64) -> Option<Record> {
    let mut criteria = Where::new();
    criteria.insert("id".to_string(), json!(id));
    model(db, "Customer")
        .find_one(&criteria)
        .await
        .expect("find_one should succeed")
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Schema with the generated mutations of every fixture model
pub fn schema(db: &InMemoryDatabase) -> Schema {
    ModelSchema::new(db.models())
        .finish()
        .expect("fixture schema should build")
}

/// Schema whose generated mutations are replaced by `mutations`
pub fn schema_with(db: &InMemoryDatabase, mutations: Vec<(&str, FieldConfig)>) -> Schema {
    mutations
        .into_iter()
        .fold(ModelSchema::new(db.models()), |schema, (name, field)| {
            schema.mutation(name, field)
        })
        .finish()
        .expect("fixture schema should build")
}

pub async fn execute(schema: &Schema, query: &str, variables: JsonValue) -> Response {
    schema
        .execute(Request::new(query).variables(Variables::from_json(variables)))
        .await
}

pub async fn execute_with_session(
    schema: &Schema,
    query: &str,
    variables: JsonValue,
    session: Session,
) -> Response {
    schema
        .execute(
            Request::new(query)
                .variables(Variables::from_json(variables))
                .data(session),
        )
        .await
}

/// Response data as JSON, failing the test on errors
pub fn data(response: Response) -> JsonValue {
    assert!(
        response.errors.is_empty(),
        "unexpected errors: {:?}",
        response.errors
    );
    response.data.into_json().expect("data should convert to JSON")
}

/// Messages of every error in the response
pub fn error_messages(response: &Response) -> Vec<String> {
    response
        .errors
        .iter()
        .map(|error| error.message.clone())
        .collect()
}
