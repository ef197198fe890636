//! GraphQL field configuration values
//!
//! Field mappers and mutation builders produce [`FieldConfig`] values rather
//! than finished `async_graphql::dynamic::Field`s so callers can inspect,
//! rename and merge them before assembling a schema.

use async_graphql::Value;
use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, InputValue, ResolverContext, Scalar, TypeRef,
};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::core::model::Record;

/// Name of the JSON scalar used by `where` arguments
pub const JSON_SCALAR: &str = "JSON";

/// Resolver function shared by every generated field
pub type Resolver = Arc<dyn for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync>;

/// Wrap a closure as a [`Resolver`]
pub fn resolver_fn<F>(f: F) -> Resolver
where
    F: for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Resolver reading `name` off a parent [`Record`]
///
/// Missing keys and JSON nulls both resolve to GraphQL null.
pub fn property_resolver(name: impl Into<String>) -> Resolver {
    let name = name.into();
    resolver_fn(move |ctx| {
        let name = name.clone();
        FieldFuture::new(async move {
            let record = ctx.parent_value.try_downcast_ref::<Record>()?;
            match record.get(&name) {
                None | Some(serde_json::Value::Null) => Ok(None),
                Some(value) => Ok(Some(FieldValue::value(Value::from_json(value.clone())?))),
            }
        })
    })
}

/// The `JSON` scalar, accepting any value
pub fn json_scalar() -> Scalar {
    Scalar::new(JSON_SCALAR).description("Arbitrary JSON value")
}

/// Wrap a type in non-null unless it already is
pub fn non_null(ty: TypeRef) -> TypeRef {
    match ty {
        TypeRef::NonNull(_) => ty,
        other => TypeRef::NonNull(Box::new(other)),
    }
}

pub fn list_of(ty: TypeRef) -> TypeRef {
    TypeRef::List(Box::new(ty))
}

/// Innermost named type of a type reference
pub fn base_type_name(ty: &TypeRef) -> &str {
    match ty {
        TypeRef::Named(name) => name,
        TypeRef::NonNull(inner) | TypeRef::List(inner) => base_type_name(inner),
    }
}

/// Configuration of a single argument or input object field
#[derive(Debug, Clone)]
pub struct InputValueConfig {
    pub ty: TypeRef,
    pub description: Option<String>,
    pub default_value: Option<Value>,
}

impl InputValueConfig {
    pub fn new(ty: TypeRef) -> Self {
        Self {
            ty,
            description: None,
            default_value: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn into_input_value(self, name: impl Into<String>) -> InputValue {
        let mut input = InputValue::new(name, self.ty);
        if let Some(description) = self.description {
            input = input.description(description);
        }
        if let Some(value) = self.default_value {
            input = input.default_value(value);
        }
        input
    }
}

// Types compare by their SDL rendering.
impl PartialEq for InputValueConfig {
    fn eq(&self, other: &Self) -> bool {
        self.ty.to_string() == other.ty.to_string()
            && self.description == other.description
            && self.default_value == other.default_value
    }
}

/// A GraphQL field descriptor: type, arguments and an optional resolver
#[derive(Clone)]
pub struct FieldConfig {
    pub ty: TypeRef,
    pub args: IndexMap<String, InputValueConfig>,
    pub description: Option<String>,
    /// When absent, the field reads its own name off the parent record
    pub resolve: Option<Resolver>,
}

impl FieldConfig {
    pub fn new(ty: TypeRef) -> Self {
        Self {
            ty,
            args: IndexMap::new(),
            description: None,
            resolve: None,
        }
    }

    pub fn argument(mut self, name: impl Into<String>, arg: InputValueConfig) -> Self {
        self.args.insert(name.into(), arg);
        self
    }

    pub fn arguments(mut self, args: IndexMap<String, InputValueConfig>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.resolve = Some(resolver);
        self
    }

    /// Whether the field yields a list (ignoring non-null wrappers)
    pub fn is_list(&self) -> bool {
        match &self.ty {
            TypeRef::List(_) => true,
            TypeRef::NonNull(inner) => matches!(**inner, TypeRef::List(_)),
            TypeRef::Named(_) => false,
        }
    }

    /// Build an output field for an object type
    pub fn into_field(self, name: impl Into<String>) -> Field {
        let name = name.into();
        let resolve = self
            .resolve
            .unwrap_or_else(|| property_resolver(name.clone()));

        let mut field = Field::new(name, self.ty, move |ctx| resolve(ctx));
        for (arg_name, arg) in self.args {
            field = field.argument(arg.into_input_value(arg_name));
        }
        if let Some(description) = self.description {
            field = field.description(description);
        }
        field
    }

    /// Build an input object field; arguments and resolver are dropped
    pub fn into_input_value(self, name: impl Into<String>) -> InputValue {
        InputValueConfig {
            ty: self.ty,
            description: self.description,
            default_value: None,
        }
        .into_input_value(name)
    }
}

impl fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConfig")
            .field("ty", &self.ty.to_string())
            .field("args", &self.args)
            .field("description", &self.description)
            .field("resolve", &self.resolve.is_some())
            .finish()
    }
}

// Resolvers are closures; two configs match when both or neither carry one.
impl PartialEq for FieldConfig {
    fn eq(&self, other: &Self) -> bool {
        self.ty.to_string() == other.ty.to_string()
            && self.args == other.args
            && self.description == other.description
            && self.resolve.is_some() == other.resolve.is_some()
    }
}
