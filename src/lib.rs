//! # orm-graphql
//!
//! Derive GraphQL schema fragments from ORM model metadata.
//!
//! ## Features
//!
//! - **Association fields**: one object field per relationship, singular or list typed by cardinality
//! - **Input fields**: create and update payload fields derived from column nullability
//! - **CRUD mutations**: `create`, `update` (one row) and `destroy` resolvers with before/after hooks
//! - **Relay global ids**: optional encoding of primary and foreign keys
//! - **In-memory ORM**: a YAML-configured [`Model`](core::model::Model) implementation for tests and demos
//!
//! Everything is built on the `async_graphql::dynamic` API. Builders return
//! [`FieldConfig`](core::field::FieldConfig) values that convert into
//! dynamic fields and input values.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use orm_graphql::prelude::*;
//!
//! let config = DatabaseConfig::from_yaml_file("models.yaml")?;
//! let db = InMemoryDatabase::from_config(&config);
//! let customer = db.model("Customer").expect("Customer is configured");
//!
//! let shout = before_hook(|params: ResolveParams<()>| async move {
//!     let values = params.args["values"].as_object().cloned().unwrap_or_default();
//!     Ok(Some(values))
//! });
//!
//! let schema = ModelSchema::new(db.models())
//!     .mutation(
//!         "createCustomer",
//!         create_mutation(
//!             CreateMutationOptions::new(
//!                 customer,
//!                 TypeRef::named("CreateCustomer"),
//!                 TypeRef::named("Customer"),
//!             )
//!             .before(shout),
//!         ),
//!     )
//!     .finish()?;
//! ```

pub mod config;
pub mod core;
pub mod fields;
pub mod mutations;
pub mod schema;
pub mod storage;

#[cfg(test)]
mod test_support;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Model Contract ===
    pub use crate::core::{
        Alias, AssociationDescriptor, AssociationKind, AttributeDescriptor, AttributeType,
        CreateOptions, DestroyOptions, FindOptions, Model, ModelDescriptor, ModelRef, Record,
        UpdateOptions, UpdateResult, Where,
    };

    // === Errors ===
    pub use crate::core::{ConfigError, FieldMapperError, MutationError, SchemaBuildError};

    // === Field Primitives ===
    pub use crate::core::{
        FieldConfig, InputValueConfig, Pluralizer, Resolver, from_global_id, json_scalar,
        to_global_id,
    };

    // === Field Mappers ===
    pub use crate::fields::{
        AssociationFieldsOptions, AttributeFieldsOptions, KeyFilter, KeyMap, association_fields,
        association_resolver, attribute_enum_types, attribute_fields, attribute_fields_for_create,
        attribute_fields_for_update, default_args, default_args_with, default_list_args,
        model_list_resolver, model_resolver,
    };

    // === Mutations ===
    pub use crate::mutations::{
        CreateMutationOptions, DestroyMutationOptions, ResolveInfo, ResolveParams,
        UpdateOneMutationOptions, after_hook, before_hook, create_mutation, destroy_after_hook,
        destroy_before_hook, destroy_mutation, update_one_mutation,
    };

    // === Schema ===
    pub use crate::schema::ModelSchema;

    // === Config ===
    pub use crate::config::{AssociationConfig, DatabaseConfig, ModelConfig};

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryDatabase;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_graphql::dynamic::TypeRef;
}
