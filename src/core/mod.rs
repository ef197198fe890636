//! Core module containing the model contract and GraphQL field primitives

pub mod error;
pub mod field;
pub mod global_id;
pub mod model;
pub mod pluralize;

pub use error::{ConfigError, FieldMapperError, MutationError, SchemaBuildError};
pub use field::{
    FieldConfig, InputValueConfig, JSON_SCALAR, Resolver, base_type_name, json_scalar, list_of,
    non_null, property_resolver, resolver_fn,
};
pub use global_id::{from_global_id, to_global_id};
pub use model::{
    Alias, AssociationDescriptor, AssociationKind, AttributeDescriptor, AttributeType,
    CreateOptions, DestroyOptions, FindOptions, Model, ModelDescriptor, ModelRef, Record,
    UpdateOptions, UpdateResult, Where,
};
pub use pluralize::Pluralizer;
