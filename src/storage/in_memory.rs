//! In-memory implementation of [`Model`] for testing and development
//!
//! Tables live behind a single `RwLock`; locks are never held across an
//! `.await`. Model handles are cheap and hold the shared database, never
//! each other, so association graphs carry no reference cycles.

use crate::config::{AssociationConfig, DatabaseConfig, ModelConfig};
use crate::core::model::{
    Alias, AssociationDescriptor, AssociationKind, AttributeDescriptor, AttributeType,
    CreateOptions, DestroyOptions, FindOptions, Model, ModelDescriptor, ModelRef, Record,
    UpdateOptions, UpdateResult, Where,
};
use crate::core::pluralize::Pluralizer;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";
const DEFAULT_PRIMARY_KEY: &str = "id";

/// Resolved structure of one model
#[derive(Debug, Clone)]
struct ModelSchema {
    name: String,
    attributes: Vec<AttributeDescriptor>,
    associations: Vec<AssociationSchema>,
    timestamps: bool,
}

impl ModelSchema {
    fn primary_key(&self) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|attribute| attribute.primary_key)
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|attribute| attribute.name == name)
    }
}

#[derive(Debug, Clone)]
struct AssociationSchema {
    name: String,
    kind: AssociationKind,
    target: String,
    alias: Alias,
    /// Column holding the reference; on the source for `BelongsTo`, on the
    /// target for `HasOne`/`HasMany`, on the join model for `BelongsToMany`
    foreign_key: String,
    through: Option<ThroughSchema>,
}

#[derive(Debug, Clone)]
struct ThroughSchema {
    model: String,
    /// Join column pointing at the target
    other_key: String,
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Record>,
    next_id: i64,
}

struct DatabaseInner {
    schemas: IndexMap<String, ModelSchema>,
    tables: RwLock<HashMap<String, Table>>,
}

/// A set of related in-memory models built from a [`DatabaseConfig`]
///
/// Cloning is cheap and clones share their tables.
#[derive(Clone)]
pub struct InMemoryDatabase {
    inner: Arc<DatabaseInner>,
}

impl InMemoryDatabase {
    /// Build the database, adding primary keys, timestamps and foreign
    /// key columns the configuration leaves implicit
    pub fn from_config(config: &DatabaseConfig) -> Self {
        let mut schemas: IndexMap<String, ModelSchema> = config
            .models
            .iter()
            .map(|model| (model.name.clone(), base_schema(model)))
            .collect();

        for model in &config.models {
            for association in &model.associations {
                let resolved = resolve_association(config, model, association);
                add_foreign_keys(&mut schemas, &model.name, &resolved);
                if let Some(schema) = schemas.get_mut(&model.name) {
                    schema.associations.push(resolved);
                }
            }
        }

        let tables = schemas
            .keys()
            .map(|name| {
                (
                    name.clone(),
                    Table {
                        rows: Vec::new(),
                        next_id: 1,
                    },
                )
            })
            .collect();

        Self {
            inner: Arc::new(DatabaseInner {
                schemas,
                tables: RwLock::new(tables),
            }),
        }
    }

    /// Handle to the named model
    pub fn model(&self, name: &str) -> Option<ModelRef> {
        self.inner
            .schemas
            .contains_key(name)
            .then(|| model_ref(&self.inner, name))
    }

    /// Handles to every model, in declaration order
    pub fn models(&self) -> Vec<ModelRef> {
        self.inner
            .schemas
            .keys()
            .map(|name| model_ref(&self.inner, name))
            .collect()
    }

    /// Drop every row and reset key sequences
    pub fn truncate(&self) -> Result<()> {
        let mut tables = self
            .inner
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        for table in tables.values_mut() {
            table.rows.clear();
            table.next_id = 1;
        }
        Ok(())
    }
}

fn model_ref(inner: &Arc<DatabaseInner>, name: &str) -> ModelRef {
    Arc::new(InMemoryModel {
        db: inner.clone(),
        name: name.to_string(),
    })
}

fn base_schema(model: &ModelConfig) -> ModelSchema {
    let mut attributes = Vec::new();
    if !model.attributes.iter().any(|attribute| attribute.primary_key) {
        attributes.push(
            AttributeDescriptor::new(DEFAULT_PRIMARY_KEY, AttributeType::Integer).primary_key(),
        );
    }
    attributes.extend(model.attributes.iter().cloned());
    if model.timestamps {
        for name in [CREATED_AT, UPDATED_AT] {
            if !attributes.iter().any(|attribute| attribute.name == name) {
                attributes.push(
                    AttributeDescriptor::new(name, AttributeType::DateTime)
                        .required()
                        .auto_generated(),
                );
            }
        }
    }

    ModelSchema {
        name: model.name.clone(),
        attributes,
        associations: Vec::new(),
        timestamps: model.timestamps,
    }
}

fn resolve_association(
    config: &DatabaseConfig,
    source: &ModelConfig,
    association: &AssociationConfig,
) -> AssociationSchema {
    let alias = association.alias.clone().unwrap_or_else(|| {
        let target = config.model(&association.target);
        Alias::Pair {
            singular: target
                .map(ModelConfig::singular_name)
                .unwrap_or_else(|| association.target.clone()),
            plural: target
                .map(ModelConfig::plural_name)
                .unwrap_or_else(|| Pluralizer::pluralize(&association.target)),
        }
    });

    let foreign_key = association.foreign_key.clone().unwrap_or_else(|| {
        match association.kind {
            AssociationKind::BelongsTo => foreign_key_name(&association.target),
            _ => foreign_key_name(&source.name),
        }
    });

    let through = match association.kind {
        AssociationKind::BelongsToMany => {
            association.through.as_ref().map(|through| ThroughSchema {
                model: through.clone(),
                other_key: foreign_key_name(&association.target),
            })
        }
        _ => None,
    };

    AssociationSchema {
        name: alias.for_kind(association.kind).to_string(),
        kind: association.kind,
        target: association.target.clone(),
        alias,
        foreign_key,
        through,
    }
}

fn foreign_key_name(model: &str) -> String {
    format!("{}Id", model)
}

/// Add the columns an association relies on, typed after the key they
/// reference
fn add_foreign_keys(
    schemas: &mut IndexMap<String, ModelSchema>,
    source: &str,
    association: &AssociationSchema,
) {
    let mut columns: Vec<(String, String, String)> = Vec::new();
    match (association.kind, &association.through) {
        (AssociationKind::BelongsTo, _) => columns.push((
            source.to_string(),
            association.foreign_key.clone(),
            association.target.clone(),
        )),
        (AssociationKind::HasOne | AssociationKind::HasMany, _) => columns.push((
            association.target.clone(),
            association.foreign_key.clone(),
            source.to_string(),
        )),
        (AssociationKind::BelongsToMany, Some(through)) => {
            columns.push((
                through.model.clone(),
                association.foreign_key.clone(),
                source.to_string(),
            ));
            columns.push((
                through.model.clone(),
                through.other_key.clone(),
                association.target.clone(),
            ));
        }
        (AssociationKind::BelongsToMany, None) => {}
    }

    for (owner, column, referenced) in columns {
        let data_type = schemas
            .get(&referenced)
            .and_then(ModelSchema::primary_key)
            .map(|key| key.data_type.clone())
            .unwrap_or(AttributeType::Integer);

        if let Some(schema) = schemas.get_mut(&owner) {
            if !schema.has_attribute(&column) {
                schema
                    .attributes
                    .push(AttributeDescriptor::new(column, data_type).references(referenced));
            }
        }
    }
}

/// Whether `row` satisfies every pair in `criteria`
///
/// An array value matches when the column equals any of its elements.
fn matches(row: &Record, criteria: &Where) -> bool {
    criteria.iter().all(|(key, expected)| {
        let actual = row.get(key).unwrap_or(&JsonValue::Null);
        match expected {
            JsonValue::Array(candidates) => candidates.contains(actual),
            _ => actual == expected,
        }
    })
}

fn now() -> JsonValue {
    JsonValue::String(Utc::now().to_rfc3339())
}

fn check_not_null(schema: &ModelSchema, values: &Record, all: bool) -> Result<()> {
    for attribute in &schema.attributes {
        if attribute.allow_null || attribute.primary_key {
            continue;
        }
        let value = values.get(&attribute.name);
        let missing = match value {
            Some(JsonValue::Null) => true,
            None => all,
            Some(_) => false,
        };
        if missing {
            return Err(anyhow!(
                "notNull Violation: {}.{} cannot be null",
                schema.name,
                attribute.name
            ));
        }
    }
    Ok(())
}

/// Keep only known columns, further restricted to `fields` when given
fn writable(schema: &ModelSchema, values: Record, fields: Option<&[String]>) -> Record {
    values
        .into_iter()
        .filter(|(key, _)| schema.has_attribute(key))
        .filter(|(key, _)| fields.is_none_or(|fields| fields.iter().any(|field| field == key)))
        .collect()
}

/// Handle to one table of an [`InMemoryDatabase`]
pub struct InMemoryModel {
    db: Arc<DatabaseInner>,
    name: String,
}

impl InMemoryModel {
    fn schema(&self) -> Result<&ModelSchema> {
        self.db
            .schemas
            .get(&self.name)
            .ok_or_else(|| anyhow!("unknown model '{}'", self.name))
    }

    fn select(&self, model: &str, criteria: &Where) -> Result<Vec<Record>> {
        let tables = self
            .db
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(tables
            .get(model)
            .map(|table| {
                table
                    .rows
                    .iter()
                    .filter(|row| matches(row, criteria))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl ModelDescriptor for InMemoryModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_attributes(&self) -> Vec<AttributeDescriptor> {
        self.schema()
            .map(|schema| schema.attributes.clone())
            .unwrap_or_default()
    }

    fn list_associations(&self) -> Vec<AssociationDescriptor> {
        let Ok(schema) = self.schema() else {
            return Vec::new();
        };

        schema
            .associations
            .iter()
            .map(|association| AssociationDescriptor {
                name: association.name.clone(),
                kind: association.kind,
                target: model_ref(&self.db, &association.target),
                alias: association.alias.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl Model for InMemoryModel {
    async fn create(&self, values: Record, options: &CreateOptions) -> Result<Record> {
        let schema = self.schema()?;
        let mut row = writable(schema, values, options.fields.as_deref());

        if schema.timestamps {
            let stamp = now();
            for name in [CREATED_AT, UPDATED_AT] {
                if schema.has_attribute(name) {
                    row.insert(name.to_string(), stamp.clone());
                }
            }
        }
        if options.validate {
            check_not_null(schema, &row, true)?;
        }

        let mut tables = self
            .db
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        let table = tables.entry(self.name.clone()).or_default();

        if let Some(key) = schema.primary_key() {
            let assigned = row.get(&key.name).filter(|value| !value.is_null()).cloned();
            let id = match (assigned, &key.data_type) {
                (Some(id), _) => {
                    if let Some(n) = id.as_i64() {
                        table.next_id = table.next_id.max(n + 1);
                    }
                    id
                }
                (None, AttributeType::Uuid) => JsonValue::String(Uuid::new_v4().to_string()),
                (None, AttributeType::Integer | AttributeType::BigInt) => {
                    let id = table.next_id;
                    table.next_id += 1;
                    JsonValue::from(id)
                }
                (None, _) => {
                    return Err(anyhow!(
                        "notNull Violation: {}.{} cannot be null",
                        schema.name,
                        key.name
                    ));
                }
            };

            let duplicate = table
                .rows
                .iter()
                .any(|existing| existing.get(&key.name) == Some(&id));
            if duplicate {
                return Err(anyhow!(
                    "Validation error: {}.{} must be unique",
                    schema.name,
                    key.name
                ));
            }
            row.insert(key.name.clone(), id);
        }

        for attribute in &schema.attributes {
            row.entry(attribute.name.clone()).or_insert(JsonValue::Null);
        }

        table.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, values: Record, options: &UpdateOptions) -> Result<UpdateResult> {
        let schema = self.schema()?;
        let mut changes = writable(schema, values, options.fields.as_deref());
        if options.validate {
            check_not_null(schema, &changes, false)?;
        }
        if schema.timestamps && schema.has_attribute(UPDATED_AT) {
            changes.insert(UPDATED_AT.to_string(), now());
        }

        let mut tables = self
            .db
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        let table = tables.entry(self.name.clone()).or_default();

        // A key change must leave every key unique, checked before any write.
        let new_key = schema
            .primary_key()
            .and_then(|key| changes.get(&key.name).map(|value| (&key.name, value)));
        if let Some((key, value)) = new_key {
            let (targeted, others): (Vec<&Record>, Vec<&Record>) = table
                .rows
                .iter()
                .partition(|row| matches(row, &options.criteria));
            let collides = others.iter().any(|row| row.get(key) == Some(value));
            if collides || targeted.len() > 1 {
                return Err(anyhow!(
                    "Validation error: {}.{} must be unique",
                    schema.name,
                    key
                ));
            }
            if let Some(n) = value.as_i64() {
                table.next_id = table.next_id.max(n + 1);
            }
        }

        let mut updated = Vec::new();
        for row in table.rows.iter_mut().filter(|row| matches(row, &options.criteria)) {
            for (key, value) in &changes {
                row.insert(key.clone(), value.clone());
            }
            updated.push(row.clone());
        }

        Ok(UpdateResult {
            affected: updated.len() as u64,
            rows: options.returning.then_some(updated),
        })
    }

    async fn destroy(&self, options: &DestroyOptions) -> Result<u64> {
        let mut tables = self
            .db
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        let Some(table) = tables.get_mut(&self.name) else {
            return Ok(0);
        };

        let limit = options.limit.unwrap_or(usize::MAX);
        let mut removed = 0usize;
        table.rows.retain(|row| {
            if removed < limit && matches(row, &options.criteria) {
                removed += 1;
                false
            } else {
                true
            }
        });

        Ok(removed as u64)
    }

    async fn find_one(&self, criteria: &Where) -> Result<Option<Record>> {
        Ok(self.select(&self.name, criteria)?.into_iter().next())
    }

    async fn find_all(&self, options: &FindOptions) -> Result<Vec<Record>> {
        let rows = self.select(&self.name, &options.criteria)?;
        Ok(rows
            .into_iter()
            .skip(options.offset.unwrap_or(0))
            .take(options.limit.unwrap_or(usize::MAX))
            .collect())
    }

    async fn find_associated(
        &self,
        association: &str,
        source: &Record,
        criteria: &Where,
    ) -> Result<Vec<Record>> {
        let schema = self.schema()?;
        let association = schema
            .associations
            .iter()
            .find(|candidate| candidate.name == association)
            .ok_or_else(|| anyhow!("unknown association '{}' on {}", association, schema.name))?;
        let target = self
            .db
            .schemas
            .get(&association.target)
            .ok_or_else(|| anyhow!("unknown model '{}'", association.target))?;
        let target_key = target
            .primary_key()
            .map(|key| key.name.clone())
            .unwrap_or_else(|| DEFAULT_PRIMARY_KEY.to_string());
        let source_key = schema
            .primary_key()
            .map(|key| key.name.clone())
            .unwrap_or_else(|| DEFAULT_PRIMARY_KEY.to_string());

        let key_of = |row: &Record, key: &str| row.get(key).cloned().unwrap_or(JsonValue::Null);

        let link = match (association.kind, &association.through) {
            (AssociationKind::BelongsTo, _) => {
                let reference = key_of(source, &association.foreign_key);
                if reference.is_null() {
                    return Ok(Vec::new());
                }
                (target_key, reference)
            }
            (AssociationKind::HasOne | AssociationKind::HasMany, _) => (
                association.foreign_key.clone(),
                key_of(source, &source_key),
            ),
            (AssociationKind::BelongsToMany, Some(through)) => {
                let mut join = Where::new();
                join.insert(association.foreign_key.clone(), key_of(source, &source_key));
                let ids: Vec<JsonValue> = self
                    .select(&through.model, &join)?
                    .iter()
                    .map(|row| key_of(row, &through.other_key))
                    .collect();
                (target_key, JsonValue::Array(ids))
            }
            (AssociationKind::BelongsToMany, None) => {
                return Err(anyhow!(
                    "association '{}' on {} has no through model",
                    association.name,
                    schema.name
                ));
            }
        };

        let mut combined = criteria.clone();
        combined.insert(link.0, link.1);
        let rows = self.select(&association.target, &combined)?;

        tracing::trace!(
            model = %schema.name,
            association = %association.name,
            count = rows.len(),
            "loaded associated rows"
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const YAML: &str = r#"
models:
  - name: Customer
    attributes:
      - name: firstName
        type: string
        allow_null: false
      - name: lastName
        type: string
        allow_null: false
    associations:
      - kind: belongs_to_many
        target: Branch
        through: BranchCustomer
  - name: Branch
    attributes:
      - name: name
        type: string
    associations:
      - kind: has_many
        target: Product
  - name: BranchCustomer
    timestamps: false
  - name: Product
    attributes:
      - name: name
        type: string
    associations:
      - kind: belongs_to
        target: Branch
      - kind: has_one
        target: Barcode
  - name: Barcode
    attributes:
      - name: code
        type: string
"#;

    fn database() -> InMemoryDatabase {
        let config = DatabaseConfig::from_yaml_str(YAML).expect("config should parse");
        InMemoryDatabase::from_config(&config)
    }

    fn record(value: JsonValue) -> Record {
        value.as_object().cloned().expect("object")
    }

    fn model(db: &InMemoryDatabase, name: &str) -> ModelRef {
        db.model(name).expect("model should exist")
    }

    #[test]
    fn test_implicit_columns() {
        let db = database();
        let customer = model(&db, "Customer");
        let names: Vec<String> = customer
            .list_attributes()
            .into_iter()
            .map(|attribute| attribute.name)
            .collect();
        assert_eq!(
            names,
            vec!["id", "firstName", "lastName", "createdAt", "updatedAt"]
        );
        assert_eq!(customer.primary_key_attribute().as_deref(), Some("id"));

        let join = model(&db, "BranchCustomer");
        let join_names: Vec<String> = join
            .list_attributes()
            .into_iter()
            .map(|attribute| attribute.name)
            .collect();
        assert_eq!(join_names, vec!["id", "CustomerId", "BranchId"]);

        let product = model(&db, "Product");
        let branch_id = product.attribute("BranchId").expect("foreign key");
        assert_eq!(branch_id.references.as_deref(), Some("Branch"));
        assert!(model(&db, "Barcode").attribute("ProductId").is_some());
    }

    #[test]
    fn test_association_names() {
        let db = database();
        let names: Vec<String> = model(&db, "Customer")
            .list_associations()
            .into_iter()
            .map(|association| association.name)
            .collect();
        assert_eq!(names, vec!["Branches"]);

        let product = model(&db, "Product").list_associations();
        assert_eq!(product[0].name, "Branch");
        assert_eq!(product[1].name, "Barcode");
        assert_eq!(product[1].target.name(), "Barcode");
    }

    #[test]
    fn test_unknown_model() {
        assert!(database().model("Warehouse").is_none());
        assert_eq!(database().models().len(), 5);
    }

    #[tokio::test]
    async fn test_create_assigns_key_and_timestamps() {
        let db = database();
        let customer = model(&db, "Customer");

        let andy = customer
            .create(
                record(json!({ "firstName": "Andy", "lastName": "Edwards", "bogus": 1 })),
                &CreateOptions::default(),
            )
            .await
            .expect("create should succeed");
        assert_eq!(andy.get("id"), Some(&json!(1)));
        assert!(andy.get("createdAt").is_some_and(JsonValue::is_string));
        assert!(andy.get("bogus").is_none());

        let jim = customer
            .create(
                record(json!({ "firstName": "Jim", "lastName": "Edwards" })),
                &CreateOptions::default(),
            )
            .await
            .expect("create should succeed");
        assert_eq!(jim.get("id"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_create_enforces_not_null() {
        let db = database();
        let err = model(&db, "Customer")
            .create(record(json!({ "firstName": "Andy" })), &CreateOptions::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "notNull Violation: Customer.lastName cannot be null"
        );

        let lenient = CreateOptions {
            validate: false,
            ..CreateOptions::default()
        };
        let created = model(&db, "Customer")
            .create(record(json!({ "firstName": "Andy" })), &lenient)
            .await
            .expect("unvalidated create should succeed");
        assert_eq!(created.get("lastName"), Some(&JsonValue::Null));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_key() {
        let db = database();
        let branch = model(&db, "Branch");
        branch
            .create(record(json!({ "id": 7, "name": "North" })), &CreateOptions::default())
            .await
            .expect("create should succeed");
        let err = branch
            .create(record(json!({ "id": 7, "name": "South" })), &CreateOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Branch.id must be unique");

        let next = branch
            .create(record(json!({ "name": "East" })), &CreateOptions::default())
            .await
            .expect("create should succeed");
        assert_eq!(next.get("id"), Some(&json!(8)));
    }

    #[tokio::test]
    async fn test_update_and_returning() {
        let db = database();
        let customer = model(&db, "Customer");
        for (first, last) in [("Andy", "Edwards"), ("Jim", "Edwards"), ("Bob", "Jones")] {
            customer
                .create(
                    record(json!({ "firstName": first, "lastName": last })),
                    &CreateOptions::default(),
                )
                .await
                .expect("create should succeed");
        }

        let result = customer
            .update(
                record(json!({ "lastName": "Edwardson" })),
                &UpdateOptions {
                    criteria: record(json!({ "lastName": "Edwards" })),
                    ..UpdateOptions::default()
                },
            )
            .await
            .expect("update should succeed");
        assert_eq!(result.affected, 2);
        assert!(result.rows.is_none());

        let result = customer
            .update(
                record(json!({ "firstName": "Robert" })),
                &UpdateOptions {
                    criteria: record(json!({ "id": 3 })),
                    returning: true,
                    ..UpdateOptions::default()
                },
            )
            .await
            .expect("update should succeed");
        let rows = result.rows.expect("rows should be returned");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("firstName"), Some(&json!("Robert")));
        assert_eq!(rows[0].get("lastName"), Some(&json!("Jones")));

        let err = customer
            .update(
                record(json!({ "lastName": null })),
                &UpdateOptions {
                    criteria: record(json!({ "id": 3 })),
                    ..UpdateOptions::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("notNull Violation"));
    }

    #[tokio::test]
    async fn test_update_rejects_key_collision() {
        let db = database();
        let customer = model(&db, "Customer");
        for first in ["Andy", "Jim"] {
            customer
                .create(
                    record(json!({ "firstName": first, "lastName": "Edwards" })),
                    &CreateOptions::default(),
                )
                .await
                .expect("create should succeed");
        }

        let err = customer
            .update(
                record(json!({ "id": 2 })),
                &UpdateOptions {
                    criteria: record(json!({ "id": 1 })),
                    ..UpdateOptions::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Customer.id must be unique");

        // Several rows cannot share one new key either.
        let err = customer
            .update(
                record(json!({ "id": 9 })),
                &UpdateOptions {
                    criteria: record(json!({ "lastName": "Edwards" })),
                    ..UpdateOptions::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Customer.id must be unique");

        let ids: Vec<JsonValue> = customer
            .find_all(&FindOptions::default())
            .await
            .expect("find_all should succeed")
            .into_iter()
            .filter_map(|row| row.get("id").cloned())
            .collect();
        assert_eq!(ids, vec![json!(1), json!(2)]);

        let moved = customer
            .update(
                record(json!({ "id": 5 })),
                &UpdateOptions {
                    criteria: record(json!({ "id": 1 })),
                    returning: true,
                    ..UpdateOptions::default()
                },
            )
            .await
            .expect("a free key should be accepted");
        assert_eq!(moved.affected, 1);

        let next = customer
            .create(
                record(json!({ "firstName": "Bob", "lastName": "Jones" })),
                &CreateOptions::default(),
            )
            .await
            .expect("create should succeed");
        assert_eq!(next.get("id"), Some(&json!(6)));
    }

    #[tokio::test]
    async fn test_destroy_and_find() {
        let db = database();
        let branch = model(&db, "Branch");
        for name in ["North", "South", "East"] {
            branch
                .create(record(json!({ "name": name })), &CreateOptions::default())
                .await
                .expect("create should succeed");
        }

        let page = branch
            .find_all(&FindOptions {
                offset: Some(1),
                limit: Some(1),
                ..FindOptions::default()
            })
            .await
            .expect("find should succeed");
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].get("name"), Some(&json!("South")));

        let count = branch
            .destroy(&DestroyOptions {
                criteria: record(json!({ "id": [1, 3] })),
                limit: None,
            })
            .await
            .expect("destroy should succeed");
        assert_eq!(count, 2);

        let remaining = branch
            .find_one(&Where::new())
            .await
            .expect("find should succeed")
            .expect("one branch left");
        assert_eq!(remaining.get("name"), Some(&json!("South")));

        db.truncate().expect("truncate should succeed");
        assert!(branch.find_one(&Where::new()).await.expect("find").is_none());
    }

    #[tokio::test]
    async fn test_find_associated() {
        let db = database();
        let defaults = CreateOptions::default();
        let customer = model(&db, "Customer");
        let branch = model(&db, "Branch");
        let product = model(&db, "Product");
        let barcode = model(&db, "Barcode");
        let join = model(&db, "BranchCustomer");

        let andy = customer
            .create(
                record(json!({ "firstName": "Andy", "lastName": "Edwards" })),
                &defaults,
            )
            .await
            .expect("create customer");
        let north = branch
            .create(record(json!({ "name": "North" })), &defaults)
            .await
            .expect("create branch");
        branch
            .create(record(json!({ "name": "South" })), &defaults)
            .await
            .expect("create branch");
        join.create(record(json!({ "CustomerId": 1, "BranchId": 1 })), &defaults)
            .await
            .expect("create join row");
        let widget = product
            .create(record(json!({ "name": "Widget", "BranchId": 1 })), &defaults)
            .await
            .expect("create product");
        barcode
            .create(record(json!({ "code": "0001", "ProductId": 1 })), &defaults)
            .await
            .expect("create barcode");

        let branches = customer
            .find_associated("Branches", &andy, &Where::new())
            .await
            .expect("belongs_to_many");
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].get("name"), Some(&json!("North")));

        let products = branch
            .find_associated("Products", &north, &Where::new())
            .await
            .expect("has_many");
        assert_eq!(products.len(), 1);

        let owner = product
            .find_associated("Branch", &widget, &Where::new())
            .await
            .expect("belongs_to");
        assert_eq!(owner[0].get("name"), Some(&json!("North")));

        let code = product
            .find_associated("Barcode", &widget, &record(json!({ "code": "9999" })))
            .await
            .expect("has_one with criteria");
        assert!(code.is_empty());

        let err = product
            .find_associated("Warehouses", &widget, &Where::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unknown association"));
    }
}
