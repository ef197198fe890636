//! Hook signatures and the call parameters handed to them
//!
//! Hooks run inside the generated resolvers. A `before` hook that returns
//! `Some(values)` REPLACES the values sent to the model; nothing is merged.
//! An `after` hook that returns `Some(record)` replaces the returned record.

use async_graphql::dynamic::ResolverContext;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value as JsonValue;
use std::future::Future;
use std::sync::Arc;

use crate::core::model::Record;
use crate::fields::args::args_record;

/// Static facts about the field being resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveInfo {
    pub field_name: String,
    /// Return type in SDL notation, e.g. `Customer` or `Int!`
    pub return_type: String,
}

/// Everything a hook sees about the current call
#[derive(Debug, Clone)]
pub struct ResolveParams<C> {
    /// Parent value of the mutation field, if any
    pub source: Option<JsonValue>,
    /// Field arguments as JSON; for updates the primary key has already
    /// been moved out of the values argument
    pub args: Record,
    /// Request data of type `C`, if the request carried one
    pub context: Option<C>,
    pub info: ResolveInfo,
}

impl<C> ResolveParams<C>
where
    C: Clone + Send + Sync + 'static,
{
    pub(crate) fn from_context(
        ctx: &ResolverContext<'_>,
        return_type: &str,
    ) -> async_graphql::Result<Self> {
        let source = match ctx.parent_value.downcast_ref::<Record>() {
            Some(record) => Some(JsonValue::Object(record.clone())),
            None => ctx
                .parent_value
                .as_value()
                .and_then(|value| value.clone().into_json().ok())
                .filter(|value| !value.is_null()),
        };

        Ok(Self {
            source,
            args: args_record(ctx)?,
            context: ctx.data_opt::<C>().cloned(),
            info: ResolveInfo {
                field_name: ctx.field().name().to_string(),
                return_type: return_type.to_string(),
            },
        })
    }
}

/// Runs before `create` or `update`; `Some` replaces the values
pub type BeforeHook<C> =
    Arc<dyn Fn(ResolveParams<C>) -> BoxFuture<'static, anyhow::Result<Option<Record>>> + Send + Sync>;

/// Runs after `create` or `update` with the resulting record
pub type AfterHook<C> = Arc<
    dyn Fn(Record, ResolveParams<C>) -> BoxFuture<'static, anyhow::Result<Option<Record>>>
        + Send
        + Sync,
>;

/// Runs before `destroy`; an error aborts the deletion
pub type DestroyBeforeHook<C> =
    Arc<dyn Fn(ResolveParams<C>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Runs after `destroy` with the number of deleted rows
pub type DestroyAfterHook<C> =
    Arc<dyn Fn(u64, ResolveParams<C>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

pub fn before_hook<C, F, Fut>(f: F) -> BeforeHook<C>
where
    F: Fn(ResolveParams<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Option<Record>>> + Send + 'static,
{
    Arc::new(move |params| f(params).boxed())
}

pub fn after_hook<C, F, Fut>(f: F) -> AfterHook<C>
where
    F: Fn(Record, ResolveParams<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Option<Record>>> + Send + 'static,
{
    Arc::new(move |record, params| f(record, params).boxed())
}

pub fn destroy_before_hook<C, F, Fut>(f: F) -> DestroyBeforeHook<C>
where
    F: Fn(ResolveParams<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |params| f(params).boxed())
}

pub fn destroy_after_hook<C, F, Fut>(f: F) -> DestroyAfterHook<C>
where
    F: Fn(u64, ResolveParams<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |count, params| f(count, params).boxed())
}
