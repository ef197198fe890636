//! Model descriptors and the persistence contract
//!
//! A model is described by two capabilities: its metadata (attributes and
//! associations, see [`ModelDescriptor`]) and its persistence operations
//! (see [`Model`]). Field mappers only need the former, mutation resolvers
//! need both.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A persisted row, keyed by attribute name
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Equality criteria, keyed by attribute name
///
/// Every pair must match for a row to be selected. A JSON array value
/// matches any of its elements.
pub type Where = serde_json::Map<String, serde_json::Value>;

/// Shared handle to a model
pub type ModelRef = Arc<dyn Model>;

/// Column data types understood by the field mappers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Text,
    Integer,
    BigInt,
    Float,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Uuid,
    Json,
    Enum(Vec<String>),
}

/// Metadata for a single column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    pub name: String,

    #[serde(rename = "type")]
    pub data_type: AttributeType,

    /// Whether the column accepts null
    #[serde(default = "default_allow_null")]
    pub allow_null: bool,

    #[serde(default)]
    pub primary_key: bool,

    /// Value assigned by the persistence layer (primary keys, timestamps)
    #[serde(default)]
    pub auto_generated: bool,

    /// Column comment, copied to GraphQL descriptions on request
    #[serde(default)]
    pub comment: Option<String>,

    /// Name of the model this column points at, for foreign keys
    #[serde(default)]
    pub references: Option<String>,
}

fn default_allow_null() -> bool {
    true
}

impl AttributeDescriptor {
    /// A nullable, caller-assigned column
    pub fn new(name: impl Into<String>, data_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            data_type,
            allow_null: true,
            primary_key: false,
            auto_generated: false,
            comment: None,
            references: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.allow_null = false;
        self
    }

    /// Mark as an auto-generated, non-null primary key
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.allow_null = false;
        self.auto_generated = true;
        self
    }

    pub fn auto_generated(mut self) -> Self {
        self.auto_generated = true;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn references(mut self, model: impl Into<String>) -> Self {
        self.references = Some(model.into());
        self
    }
}

/// The four relationship kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    HasOne,
    BelongsTo,
    HasMany,
    BelongsToMany,
}

impl AssociationKind {
    /// Whether the association resolves to a list of targets
    pub fn is_plural(self) -> bool {
        match self {
            AssociationKind::HasOne | AssociationKind::BelongsTo => false,
            AssociationKind::HasMany | AssociationKind::BelongsToMany => true,
        }
    }
}

/// Name under which an association is exposed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Alias {
    /// Used verbatim regardless of cardinality
    Plain(String),
    Pair { singular: String, plural: String },
}

impl Alias {
    pub fn singular(&self) -> &str {
        match self {
            Alias::Plain(name) => name,
            Alias::Pair { singular, .. } => singular,
        }
    }

    pub fn plural(&self) -> &str {
        match self {
            Alias::Plain(name) => name,
            Alias::Pair { plural, .. } => plural,
        }
    }

    /// Pick the name matching the association's cardinality
    pub fn for_kind(&self, kind: AssociationKind) -> &str {
        if kind.is_plural() {
            self.plural()
        } else {
            self.singular()
        }
    }
}

/// A declared relationship from one model to another
#[derive(Clone)]
pub struct AssociationDescriptor {
    /// Key of the association on its source model
    pub name: String,
    pub kind: AssociationKind,
    pub target: ModelRef,
    pub alias: Alias,
}

impl fmt::Debug for AssociationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssociationDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("target", &self.target.name())
            .field("alias", &self.alias)
            .finish()
    }
}

/// Structural metadata of a model
pub trait ModelDescriptor: Send + Sync {
    /// Model name, also used as the default GraphQL type name
    fn name(&self) -> &str;

    fn list_attributes(&self) -> Vec<AttributeDescriptor>;

    fn list_associations(&self) -> Vec<AssociationDescriptor>;

    /// Name of the primary key attribute, if the model has one
    fn primary_key_attribute(&self) -> Option<String> {
        self.list_attributes()
            .into_iter()
            .find(|attribute| attribute.primary_key)
            .map(|attribute| attribute.name)
    }

    fn attribute(&self, name: &str) -> Option<AttributeDescriptor> {
        self.list_attributes()
            .into_iter()
            .find(|attribute| attribute.name == name)
    }
}

/// Options forwarded verbatim to [`Model::create`]
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOptions {
    /// Restrict persisted values to these attributes
    pub fields: Option<Vec<String>>,
    /// Enforce non-null constraints before writing
    pub validate: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            fields: None,
            validate: true,
        }
    }
}

/// Options for [`Model::update`]
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOptions {
    pub criteria: Where,
    /// Ask the store to hand back the updated rows
    pub returning: bool,
    pub fields: Option<Vec<String>>,
    pub validate: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            criteria: Where::new(),
            returning: false,
            fields: None,
            validate: true,
        }
    }
}

/// Outcome of [`Model::update`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateResult {
    pub affected: u64,
    /// Updated rows, when the store supports returning them
    pub rows: Option<Vec<Record>>,
}

/// Options for [`Model::destroy`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestroyOptions {
    pub criteria: Where,
    pub limit: Option<usize>,
}

/// Options for [`Model::find_all`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub criteria: Where,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Persistence operations of a model
///
/// Implementations adapt a concrete ORM. Every call is a single round-trip;
/// atomicity beyond one call is the store's business.
#[async_trait]
pub trait Model: ModelDescriptor {
    /// Insert a row and return it as stored
    async fn create(&self, values: Record, options: &CreateOptions) -> Result<Record>;

    /// Apply `values` to every row matching `options.criteria`
    async fn update(&self, values: Record, options: &UpdateOptions) -> Result<UpdateResult>;

    /// Remove matching rows, returning how many were removed
    async fn destroy(&self, options: &DestroyOptions) -> Result<u64>;

    async fn find_one(&self, criteria: &Where) -> Result<Option<Record>>;

    async fn find_all(&self, options: &FindOptions) -> Result<Vec<Record>>;

    /// Load the rows reachable from `source` through the named association
    async fn find_associated(
        &self,
        association: &str,
        source: &Record,
        criteria: &Where,
    ) -> Result<Vec<Record>>;
}
