//! Field mappers deriving GraphQL fields from model metadata

pub mod args;
pub mod association;
pub mod attribute;
pub mod input;
pub mod resolver;

pub use args::{default_args, default_args_with, default_list_args};
pub use association::{AssociationFieldsOptions, association_fields};
pub use attribute::{
    AttributeFieldsOptions, KeyFilter, KeyMap, attribute_enum_types, attribute_fields,
    attribute_type_name, enum_type_name,
};
pub use input::{attribute_fields_for_create, attribute_fields_for_update};
pub use resolver::{association_resolver, model_list_resolver, model_resolver};
