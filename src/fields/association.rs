//! Object fields for model associations

use async_graphql::dynamic::TypeRef;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::core::error::FieldMapperError;
use crate::core::field::{FieldConfig, InputValueConfig, Resolver, list_of};
use crate::core::model::{AssociationDescriptor, AssociationKind, Model, ModelRef};
use crate::fields::args::default_args;
use crate::fields::resolver::association_resolver;

type GetType = Arc<dyn Fn(&dyn Model) -> Option<TypeRef> + Send + Sync>;
type GetArgs = Arc<dyn Fn(&dyn Model) -> Option<IndexMap<String, InputValueConfig>> + Send + Sync>;
type GetResolver = Arc<dyn Fn(&dyn Model, &AssociationDescriptor) -> Option<Resolver> + Send + Sync>;

/// How association fields are typed, parameterised and resolved
#[derive(Clone)]
pub struct AssociationFieldsOptions {
    get_type: GetType,
    get_args: Option<GetArgs>,
    get_resolver: Option<GetResolver>,
}

impl AssociationFieldsOptions {
    /// `get_type` maps a target model to its GraphQL object type
    pub fn new<F>(get_type: F) -> Self
    where
        F: Fn(&dyn Model) -> Option<TypeRef> + Send + Sync + 'static,
    {
        Self {
            get_type: Arc::new(get_type),
            get_args: None,
            get_resolver: None,
        }
    }

    /// Arguments for a target's field; defaults to [`default_args`]
    pub fn get_args<F>(mut self, get_args: F) -> Self
    where
        F: Fn(&dyn Model) -> Option<IndexMap<String, InputValueConfig>> + Send + Sync + 'static,
    {
        self.get_args = Some(Arc::new(get_args));
        self
    }

    /// Resolver for an association; defaults to [`association_resolver`]
    pub fn get_resolver<F>(mut self, get_resolver: F) -> Self
    where
        F: Fn(&dyn Model, &AssociationDescriptor) -> Option<Resolver> + Send + Sync + 'static,
    {
        self.get_resolver = Some(Arc::new(get_resolver));
        self
    }
}

impl fmt::Debug for AssociationFieldsOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssociationFieldsOptions")
            .field("get_args", &self.get_args.is_some())
            .field("get_resolver", &self.get_resolver.is_some())
            .finish_non_exhaustive()
    }
}

/// One field per association of `model`
///
/// To-one associations (`HasOne`, `BelongsTo`) are keyed by the singular
/// alias and typed as the bare target type; to-many associations
/// (`HasMany`, `BelongsToMany`) use the plural alias and a list type.
pub fn association_fields(
    model: &ModelRef,
    options: &AssociationFieldsOptions,
) -> Result<IndexMap<String, FieldConfig>, FieldMapperError> {
    let mut fields = IndexMap::new();

    for association in model.list_associations() {
        let target = association.target.as_ref();

        let ty = (options.get_type)(target).ok_or_else(|| FieldMapperError::MissingType {
            model: target.name().to_string(),
        })?;

        let args = match &options.get_args {
            Some(get_args) => get_args(target),
            None => Some(default_args(target)),
        };

        let resolve = match &options.get_resolver {
            Some(get_resolver) => get_resolver(target, &association),
            None => Some(association_resolver(model.clone(), &association)),
        }
        .ok_or_else(|| FieldMapperError::MissingResolver {
            model: target.name().to_string(),
            association: association.name.clone(),
        })?;

        let (name, ty) = match association.kind {
            AssociationKind::HasOne | AssociationKind::BelongsTo => {
                (association.alias.singular().to_string(), ty)
            }
            AssociationKind::HasMany | AssociationKind::BelongsToMany => {
                (association.alias.plural().to_string(), list_of(ty))
            }
        };

        let mut field = FieldConfig::new(ty).resolver(resolve);
        if let Some(args) = args {
            field = field.arguments(args);
        }
        fields.insert(name, field);
    }

    Ok(fields)
}
