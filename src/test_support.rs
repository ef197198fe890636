//! Test double recording every call made against a model

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::{Arc, Mutex};

use crate::core::model::{
    AssociationDescriptor, AttributeDescriptor, AttributeType, CreateOptions, DestroyOptions,
    FindOptions, Model, ModelDescriptor, ModelRef, Record, UpdateOptions, UpdateResult, Where,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Create(Record, CreateOptions),
    Update(Record, UpdateOptions),
    Destroy(DestroyOptions),
    FindOne(Where),
}

pub(crate) struct RecordingModel {
    name: String,
    attributes: Vec<AttributeDescriptor>,
    associations: Mutex<Vec<AssociationDescriptor>>,
    rows: Mutex<Vec<Record>>,
    calls: Mutex<Vec<Call>>,
    /// Hand back updated rows from `update`
    returning: bool,
    /// Error to raise from every persistence call
    failure: Option<String>,
}

impl RecordingModel {
    pub(crate) fn new(name: &str, attributes: Vec<AttributeDescriptor>) -> Self {
        Self {
            name: name.to_string(),
            attributes,
            associations: Mutex::new(Vec::new()),
            rows: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            returning: false,
            failure: None,
        }
    }

    /// `Customer` with an integer key, two required and two optional names
    pub(crate) fn customer() -> Self {
        Self::new(
            "Customer",
            vec![
                AttributeDescriptor::new("id", AttributeType::Integer).primary_key(),
                AttributeDescriptor::new("firstName", AttributeType::String).required(),
                AttributeDescriptor::new("lastName", AttributeType::String).required(),
                AttributeDescriptor::new("address", AttributeType::String),
                AttributeDescriptor::new("phone", AttributeType::String),
            ],
        )
    }

    pub(crate) fn returning(mut self) -> Self {
        self.returning = true;
        self
    }

    pub(crate) fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub(crate) fn with_rows(self, rows: Vec<JsonValue>) -> Self {
        {
            let mut stored = self.rows.lock().expect("rows lock");
            stored.extend(rows.into_iter().filter_map(|row| match row {
                JsonValue::Object(record) => Some(record),
                _ => None,
            }));
        }
        self
    }

    pub(crate) fn add_association(&self, association: AssociationDescriptor) {
        self.associations
            .lock()
            .expect("associations lock")
            .push(association);
    }

    pub(crate) fn into_ref(self) -> Arc<RecordingModel> {
        Arc::new(self)
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn rows(&self) -> Vec<Record> {
        self.rows.lock().expect("rows lock").clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().expect("calls lock").push(call);
        match &self.failure {
            Some(message) => Err(anyhow!("{}", message)),
            None => Ok(()),
        }
    }
}

pub(crate) fn as_model(model: &Arc<RecordingModel>) -> ModelRef {
    model.clone()
}

fn matches(row: &Record, criteria: &Where) -> bool {
    criteria.iter().all(|(key, value)| row.get(key) == Some(value))
}

impl ModelDescriptor for RecordingModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_attributes(&self) -> Vec<AttributeDescriptor> {
        self.attributes.clone()
    }

    fn list_associations(&self) -> Vec<AssociationDescriptor> {
        self.associations.lock().expect("associations lock").clone()
    }
}

#[async_trait]
impl Model for RecordingModel {
    async fn create(&self, values: Record, options: &CreateOptions) -> Result<Record> {
        self.record(Call::Create(values.clone(), options.clone()))?;
        let mut rows = self.rows.lock().expect("rows lock");
        let mut row = values;
        row.insert("id".to_string(), JsonValue::from(rows.len() as u64 + 1));
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, values: Record, options: &UpdateOptions) -> Result<UpdateResult> {
        self.record(Call::Update(values.clone(), options.clone()))?;
        let mut rows = self.rows.lock().expect("rows lock");
        let mut updated = Vec::new();
        for row in rows.iter_mut().filter(|row| matches(row, &options.criteria)) {
            for (key, value) in &values {
                row.insert(key.clone(), value.clone());
            }
            updated.push(row.clone());
        }
        Ok(UpdateResult {
            affected: updated.len() as u64,
            rows: self.returning.then_some(updated),
        })
    }

    async fn destroy(&self, options: &DestroyOptions) -> Result<u64> {
        self.record(Call::Destroy(options.clone()))?;
        let mut rows = self.rows.lock().expect("rows lock");
        let before = rows.len();
        rows.retain(|row| !matches(row, &options.criteria));
        Ok((before - rows.len()) as u64)
    }

    async fn find_one(&self, criteria: &Where) -> Result<Option<Record>> {
        self.record(Call::FindOne(criteria.clone()))?;
        let rows = self.rows.lock().expect("rows lock");
        Ok(rows.iter().find(|row| matches(row, criteria)).cloned())
    }

    async fn find_all(&self, options: &FindOptions) -> Result<Vec<Record>> {
        let rows = self.rows.lock().expect("rows lock");
        Ok(rows
            .iter()
            .filter(|row| matches(row, &options.criteria))
            .skip(options.offset.unwrap_or(0))
            .take(options.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn find_associated(
        &self,
        _association: &str,
        _source: &Record,
        _criteria: &Where,
    ) -> Result<Vec<Record>> {
        Ok(Vec::new())
    }
}
