//! `create` mutation builder

use async_graphql::dynamic::{FieldFuture, FieldValue, TypeRef};
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::core::error::MutationError;
use crate::core::field::{FieldConfig, InputValueConfig, base_type_name, non_null, resolver_fn};
use crate::core::model::{CreateOptions, ModelRef, Record};
use crate::mutations::hooks::{AfterHook, BeforeHook, ResolveParams};

pub const DEFAULT_VALUES_ARG: &str = "values";

/// Configuration of a create mutation field
pub struct CreateMutationOptions<C = ()> {
    pub model: ModelRef,
    /// Input object holding the new row's attributes
    pub input_type: TypeRef,
    pub return_type: TypeRef,
    pub values_arg_name: String,
    pub before: Option<BeforeHook<C>>,
    pub after: Option<AfterHook<C>>,
    pub create_options: CreateOptions,
}

impl<C> CreateMutationOptions<C> {
    pub fn new(model: ModelRef, input_type: TypeRef, return_type: TypeRef) -> Self {
        Self {
            model,
            input_type,
            return_type,
            values_arg_name: DEFAULT_VALUES_ARG.to_string(),
            before: None,
            after: None,
            create_options: CreateOptions::default(),
        }
    }

    pub fn values_arg_name(mut self, name: impl Into<String>) -> Self {
        self.values_arg_name = name.into();
        self
    }

    pub fn before(mut self, hook: BeforeHook<C>) -> Self {
        self.before = Some(hook);
        self
    }

    pub fn after(mut self, hook: AfterHook<C>) -> Self {
        self.after = Some(hook);
        self
    }

    pub fn create_options(mut self, options: CreateOptions) -> Self {
        self.create_options = options;
        self
    }
}

/// A field that inserts one row and returns it
///
/// Takes a single required argument holding the row's values.
pub fn create_mutation<C>(options: CreateMutationOptions<C>) -> FieldConfig
where
    C: Clone + Send + Sync + 'static,
{
    let type_name = base_type_name(&options.return_type).to_string();
    let return_type = options.return_type.clone();
    let values_arg = InputValueConfig::new(non_null(options.input_type.clone()))
        .description(format!("The attribute values of the {} to create", type_name));
    let values_arg_name = options.values_arg_name.clone();

    let mutation = Arc::new(CreateMutation { options });
    let return_type_sdl = return_type.to_string();
    let resolver = resolver_fn(move |ctx| {
        let mutation = mutation.clone();
        let return_type_sdl = return_type_sdl.clone();
        FieldFuture::new(async move {
            let params = ResolveParams::<C>::from_context(&ctx, &return_type_sdl)?;
            let record = mutation
                .resolve(params)
                .await
                .map_err(MutationError::into_graphql_error)?;
            Ok(Some(FieldValue::owned_any(record)))
        })
    });

    FieldConfig::new(return_type)
        .argument(values_arg_name, values_arg)
        .resolver(resolver)
}

struct CreateMutation<C> {
    options: CreateMutationOptions<C>,
}

impl<C> CreateMutation<C>
where
    C: Clone + Send + Sync + 'static,
{
    async fn resolve(&self, params: ResolveParams<C>) -> Result<Record, MutationError> {
        let options = &self.options;
        let mut values = values_arg(&params.args, &options.values_arg_name)?;

        if let Some(before) = &options.before {
            if let Some(replaced) = before(params.clone()).await.map_err(MutationError::Hook)? {
                values = replaced;
            }
        }

        tracing::debug!(model = %options.model.name(), "creating record");
        let instance = options
            .model
            .create(values, &options.create_options)
            .await
            .map_err(MutationError::Model)?;

        match &options.after {
            Some(after) => Ok(after(instance.clone(), params)
                .await
                .map_err(MutationError::Hook)?
                .unwrap_or(instance)),
            None => Ok(instance),
        }
    }
}

/// Read the values payload, which must be an object
pub(crate) fn values_arg(args: &Record, name: &str) -> Result<Record, MutationError> {
    match args.get(name) {
        Some(JsonValue::Object(values)) => Ok(values.clone()),
        Some(other) => Err(MutationError::InvalidArgument {
            name: name.to_string(),
            message: format!("expected an object, got {}", other),
        }),
        None => Err(MutationError::InvalidArgument {
            name: name.to_string(),
            message: "argument is required".to_string(),
        }),
    }
}
