//! Default resolvers backed by [`Model`] calls

use async_graphql::dynamic::{FieldFuture, FieldValue};

use crate::core::field::{Resolver, resolver_fn};
use crate::core::model::{AssociationDescriptor, FindOptions, ModelRef, Record};
use crate::fields::args::{LIMIT_ARG, OFFSET_ARG, args_record, query_criteria, usize_arg};

/// Resolve `association` from a parent record of `source`
///
/// Honors the target's `where` and primary key arguments. To-one
/// associations yield the first match or null, to-many a list.
pub fn association_resolver(source: ModelRef, association: &AssociationDescriptor) -> Resolver {
    let name = association.name.clone();
    let target = association.target.clone();
    let plural = association.kind.is_plural();

    resolver_fn(move |ctx| {
        let source = source.clone();
        let target = target.clone();
        let name = name.clone();
        FieldFuture::new(async move {
            let parent = ctx.parent_value.try_downcast_ref::<Record>()?;
            let args = args_record(&ctx)?;
            let criteria = query_criteria(target.as_ref(), &args)?;

            tracing::debug!(
                model = %source.name(),
                association = %name,
                "resolving association"
            );
            let rows = source.find_associated(&name, parent, &criteria).await?;

            if plural {
                Ok(Some(FieldValue::list(
                    rows.into_iter().map(FieldValue::owned_any),
                )))
            } else {
                Ok(rows.into_iter().next().map(FieldValue::owned_any))
            }
        })
    })
}

/// Root query resolver returning one row of `model`, or null
pub fn model_resolver(model: ModelRef) -> Resolver {
    resolver_fn(move |ctx| {
        let model = model.clone();
        FieldFuture::new(async move {
            let args = args_record(&ctx)?;
            let criteria = query_criteria(model.as_ref(), &args)?;
            let row = model.find_one(&criteria).await?;
            Ok(row.map(FieldValue::owned_any))
        })
    })
}

/// Root query resolver returning a page of rows of `model`
pub fn model_list_resolver(model: ModelRef) -> Resolver {
    resolver_fn(move |ctx| {
        let model = model.clone();
        FieldFuture::new(async move {
            let args = args_record(&ctx)?;
            let options = FindOptions {
                criteria: query_criteria(model.as_ref(), &args)?,
                limit: usize_arg(&args, LIMIT_ARG).map_err(|message| {
                    async_graphql::Error::new(format!("invalid argument 'limit': {}", message))
                })?,
                offset: usize_arg(&args, OFFSET_ARG).map_err(|message| {
                    async_graphql::Error::new(format!("invalid argument 'offset': {}", message))
                })?,
            };
            let rows = model.find_all(&options).await?;
            Ok(Some(FieldValue::list(
                rows.into_iter().map(FieldValue::owned_any),
            )))
        })
    })
}
