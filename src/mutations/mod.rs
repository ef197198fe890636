//! CRUD mutation field builders
//!
//! Each builder returns a [`FieldConfig`](crate::core::field::FieldConfig)
//! whose resolver calls the model once (twice for updates that must read
//! the row back), running optional hooks around the call.

pub mod create;
pub mod destroy;
pub mod hooks;
pub mod update_one;

mod criteria;

pub use create::{CreateMutationOptions, DEFAULT_VALUES_ARG, create_mutation};
pub use destroy::{DestroyMutationOptions, destroy_mutation};
pub use hooks::{
    AfterHook, BeforeHook, DestroyAfterHook, DestroyBeforeHook, ResolveInfo, ResolveParams,
    after_hook, before_hook, destroy_after_hook, destroy_before_hook,
};
pub use update_one::{UpdateOneMutationOptions, update_one_mutation};
