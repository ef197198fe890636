//! `destroy` mutation builder

use async_graphql::dynamic::{FieldFuture, FieldValue, TypeRef};
use async_graphql::Value;
use std::sync::Arc;

use crate::core::error::MutationError;
use crate::core::field::{FieldConfig, resolver_fn};
use crate::core::model::{DestroyOptions, ModelRef};
use crate::fields::args::{default_args_with, key_attribute};
use crate::fields::attribute::AttributeFieldsOptions;
use crate::mutations::criteria::{KeySources, identifying_criteria, merge_criteria};
use crate::mutations::hooks::{DestroyAfterHook, DestroyBeforeHook, ResolveParams};

const RETURN_TYPE: &str = "Int!";

/// Configuration of a destroy mutation field
pub struct DestroyMutationOptions<C = ()> {
    pub model: ModelRef,
    pub before: Option<DestroyBeforeHook<C>>,
    pub after: Option<DestroyAfterHook<C>>,
    /// Forwarded to [`Model::destroy`](crate::core::model::Model::destroy);
    /// its criteria are laid over the computed ones
    pub destroy_options: DestroyOptions,
    /// Type the primary key argument `ID`, matching global id output
    pub global_id: bool,
}

impl<C> DestroyMutationOptions<C> {
    pub fn new(model: ModelRef) -> Self {
        Self {
            model,
            before: None,
            after: None,
            destroy_options: DestroyOptions::default(),
            global_id: false,
        }
    }

    pub fn before(mut self, hook: DestroyBeforeHook<C>) -> Self {
        self.before = Some(hook);
        self
    }

    pub fn after(mut self, hook: DestroyAfterHook<C>) -> Self {
        self.after = Some(hook);
        self
    }

    pub fn destroy_options(mut self, options: DestroyOptions) -> Self {
        self.destroy_options = options;
        self
    }

    pub fn global_id(mut self, enabled: bool) -> Self {
        self.global_id = enabled;
        self
    }
}

/// A field that deletes every matching row and returns how many went
pub fn destroy_mutation<C>(options: DestroyMutationOptions<C>) -> FieldConfig
where
    C: Clone + Send + Sync + 'static,
{
    let args = default_args_with(
        options.model.as_ref(),
        &AttributeFieldsOptions::new().global_id(options.global_id),
    );
    let mutation = Arc::new(DestroyMutation { options });

    let resolver = resolver_fn(move |ctx| {
        let mutation = mutation.clone();
        FieldFuture::new(async move {
            let params = ResolveParams::<C>::from_context(&ctx, RETURN_TYPE)?;
            let count = mutation
                .resolve(params)
                .await
                .map_err(MutationError::into_graphql_error)?;
            Ok(Some(FieldValue::value(Value::from(count))))
        })
    });

    FieldConfig::new(TypeRef::named_nn(TypeRef::INT))
        .arguments(args)
        .resolver(resolver)
}

struct DestroyMutation<C> {
    options: DestroyMutationOptions<C>,
}

impl<C> DestroyMutation<C>
where
    C: Clone + Send + Sync + 'static,
{
    async fn resolve(&self, params: ResolveParams<C>) -> Result<u64, MutationError> {
        let options = &self.options;
        let model = &options.model;
        let primary_key = key_attribute(model.as_ref());

        let criteria = identifying_criteria(
            &params.args,
            KeySources {
                model_name: model.name(),
                primary_key: primary_key.as_ref(),
                values: None,
            },
        )?;
        let destroy_options = DestroyOptions {
            criteria: merge_criteria(criteria, &options.destroy_options.criteria),
            ..options.destroy_options.clone()
        };

        if let Some(before) = &options.before {
            before(params.clone()).await.map_err(MutationError::Hook)?;
        }

        tracing::debug!(
            model = %model.name(),
            criteria = ?destroy_options.criteria,
            "destroying records"
        );
        let count = model
            .destroy(&destroy_options)
            .await
            .map_err(MutationError::Model)?;

        if let Some(after) = &options.after {
            after(count, params).await.map_err(MutationError::Hook)?;
        }
        Ok(count)
    }
}
