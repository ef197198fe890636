//! `updateOne` mutation builder

use async_graphql::dynamic::{FieldFuture, FieldValue, TypeRef};
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::core::error::MutationError;
use crate::core::field::{FieldConfig, InputValueConfig, base_type_name, non_null, resolver_fn};
use crate::core::model::{ModelRef, Record, UpdateOptions};
use crate::fields::args::{default_args_with, key_attribute};
use crate::fields::attribute::AttributeFieldsOptions;
use crate::mutations::create::{DEFAULT_VALUES_ARG, values_arg};
use crate::mutations::criteria::{KeySources, identifying_criteria, merge_criteria, strip_null_key};
use crate::mutations::hooks::{AfterHook, BeforeHook, ResolveParams};

/// Configuration of an update-one mutation field
pub struct UpdateOneMutationOptions<C = ()> {
    pub model: ModelRef,
    /// Input object holding the attributes to change
    pub input_type: TypeRef,
    pub return_type: TypeRef,
    pub values_arg_name: String,
    pub before: Option<BeforeHook<C>>,
    pub after: Option<AfterHook<C>>,
    /// Forwarded to [`Model::update`](crate::core::model::Model::update);
    /// its criteria are laid over the computed ones
    pub update_options: UpdateOptions,
    /// Type the primary key argument `ID`, matching global id output
    pub global_id: bool,
}

impl<C> UpdateOneMutationOptions<C> {
    pub fn new(model: ModelRef, input_type: TypeRef, return_type: TypeRef) -> Self {
        Self {
            model,
            input_type,
            return_type,
            values_arg_name: DEFAULT_VALUES_ARG.to_string(),
            before: None,
            after: None,
            update_options: UpdateOptions::default(),
            global_id: false,
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

    pub fn update_options(mut self, options: UpdateOptions) -> Self {
        self.update_options = options;
        self
    }

    pub fn global_id(mut self, enabled: bool) -> Self {
        self.global_id = enabled;
        self
    }
}

/// A field that updates one row and returns it
///
/// The row is identified by `where`, the primary key argument or the
/// primary key inside the values payload, in that order of precedence.
pub fn update_one_mutation<C>(options: UpdateOneMutationOptions<C>) -> FieldConfig
where
    C: Clone + Send + Sync + 'static,
{
    let type_name = base_type_name(&options.return_type).to_string();
    let return_type = options.return_type.clone();
    let values_arg = InputValueConfig::new(non_null(options.input_type.clone()))
        .description(format!("The attribute values of the {} to update", type_name));
    let mut args = default_args_with(
        options.model.as_ref(),
        &AttributeFieldsOptions::new().global_id(options.global_id),
    );
    args.insert(options.values_arg_name.clone(), values_arg);

    let mutation = Arc::new(UpdateOneMutation { type_name, options });
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

    FieldConfig::new(return_type).arguments(args).resolver(resolver)
}

struct UpdateOneMutation<C> {
    type_name: String,
    options: UpdateOneMutationOptions<C>,
}

impl<C> UpdateOneMutation<C>
where
    C: Clone + Send + Sync + 'static,
{
    async fn resolve(&self, mut params: ResolveParams<C>) -> Result<Record, MutationError> {
        let options = &self.options;
        let model = &options.model;
        let primary_key = key_attribute(model.as_ref());
        let mut values = values_arg(&params.args, &options.values_arg_name)?;

        let criteria = identifying_criteria(
            &params.args,
            KeySources {
                model_name: model.name(),
                primary_key: primary_key.as_ref(),
                values: Some((&mut values, options.values_arg_name.as_str())),
            },
        )?;
        strip_null_key(
            &mut values,
            primary_key.as_ref().map(|key| key.name.as_str()),
        );
        let criteria = merge_criteria(criteria, &options.update_options.criteria);

        // Hooks see the payload without the key that was moved into the criteria.
        params.args.insert(
            options.values_arg_name.clone(),
            JsonValue::Object(values.clone()),
        );

        if let Some(before) = &options.before {
            if let Some(replaced) = before(params.clone()).await.map_err(MutationError::Hook)? {
                values = replaced;
            }
        }

        let update_options = UpdateOptions {
            criteria: criteria.clone(),
            ..options.update_options.clone()
        };

        tracing::debug!(model = %model.name(), criteria = ?criteria, "updating record");
        let result = model
            .update(values, &update_options)
            .await
            .map_err(MutationError::Model)?;

        let instance = match result.rows {
            Some(mut rows) if rows.len() == 1 => rows.pop(),
            _ => model.find_one(&criteria).await.map_err(MutationError::Model)?,
        };
        let Some(instance) = instance else {
            tracing::warn!(
                model = %model.name(),
                affected = result.affected,
                "updated record could not be read back"
            );
            return Err(MutationError::NotFound {
                type_name: self.type_name.clone(),
            });
        };

        match &options.after {
            Some(after) => Ok(after(instance.clone(), params)
                .await
                .map_err(MutationError::Hook)?
                .unwrap_or(instance)),
            None => Ok(instance),
        }
    }
}
