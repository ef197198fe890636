//! Output fields derived from model attributes

use async_graphql::dynamic::{Enum, EnumItem, FieldFuture, FieldValue, TypeRef};
use async_graphql::{Name, Value};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::field::{FieldConfig, JSON_SCALAR, Resolver, non_null, resolver_fn};
use crate::core::global_id::{id_string, to_global_id};
use crate::core::model::{AttributeDescriptor, AttributeType, ModelDescriptor, Record};

/// Selects attributes by name
#[derive(Clone)]
pub enum KeyFilter {
    Keys(Vec<String>),
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl KeyFilter {
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeyFilter::Keys(keys.into_iter().map(Into::into).collect())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        KeyFilter::Predicate(Arc::new(f))
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyFilter::Keys(keys) => keys.iter().any(|k| k == key),
            KeyFilter::Predicate(f) => f(key),
        }
    }
}

impl<S: Into<String>> From<Vec<S>> for KeyFilter {
    fn from(keys: Vec<S>) -> Self {
        KeyFilter::keys(keys)
    }
}

impl fmt::Debug for KeyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyFilter::Keys(keys) => f.debug_tuple("Keys").field(keys).finish(),
            KeyFilter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Renames attribute keys in the generated mapping
#[derive(Clone)]
pub enum KeyMap {
    /// Keys missing from the table keep their name
    Table(HashMap<String, String>),
    Function(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl KeyMap {
    pub fn table<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        KeyMap::Table(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        KeyMap::Function(Arc::new(f))
    }

    pub fn apply(&self, key: &str) -> String {
        match self {
            KeyMap::Table(table) => table.get(key).cloned().unwrap_or_else(|| key.to_string()),
            KeyMap::Function(f) => f(key),
        }
    }
}

impl fmt::Debug for KeyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMap::Table(table) => f.debug_tuple("Table").field(table).finish(),
            KeyMap::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Options shared by every attribute field mapper
#[derive(Debug, Clone, Default)]
pub struct AttributeFieldsOptions {
    pub exclude: Option<KeyFilter>,
    pub only: Option<KeyFilter>,
    pub map: Option<KeyMap>,
    pub comment_to_description: bool,
    /// Expose primary and foreign keys as relay global ids
    pub global_id: bool,
    /// Force every field nullable (`Some(true)`) or use column nullability
    pub allow_null: Option<bool>,
}

impl AttributeFieldsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude(mut self, filter: impl Into<KeyFilter>) -> Self {
        self.exclude = Some(filter.into());
        self
    }

    pub fn only(mut self, filter: impl Into<KeyFilter>) -> Self {
        self.only = Some(filter.into());
        self
    }

    pub fn map(mut self, map: KeyMap) -> Self {
        self.map = Some(map);
        self
    }

    pub fn comment_to_description(mut self, enabled: bool) -> Self {
        self.comment_to_description = enabled;
        self
    }

    pub fn global_id(mut self, enabled: bool) -> Self {
        self.global_id = enabled;
        self
    }

    pub fn allow_null(mut self, allow_null: bool) -> Self {
        self.allow_null = Some(allow_null);
        self
    }

    /// Whether `only` and `exclude` both let `key` through
    pub(crate) fn selects(&self, key: &str) -> bool {
        let included = self.only.as_ref().is_none_or(|only| only.matches(key));
        let excluded = self
            .exclude
            .as_ref()
            .is_some_and(|exclude| exclude.matches(key));
        included && !excluded
    }

    pub(crate) fn output_key(&self, key: &str) -> String {
        match &self.map {
            Some(map) => map.apply(key),
            None => key.to_string(),
        }
    }
}

/// Output fields for every selected attribute of `model`
pub fn attribute_fields<M>(model: &M, options: &AttributeFieldsOptions) -> IndexMap<String, FieldConfig>
where
    M: ModelDescriptor + ?Sized,
{
    let allow_null = options.allow_null.unwrap_or(false);
    model
        .list_attributes()
        .iter()
        .filter(|attribute| options.selects(&attribute.name))
        .map(|attribute| {
            (
                options.output_key(&attribute.name),
                output_field(model.name(), attribute, options, allow_null),
            )
        })
        .collect()
}

/// GraphQL type name for an attribute, ignoring nullability
pub fn attribute_type_name(model_name: &str, attribute: &AttributeDescriptor) -> String {
    match &attribute.data_type {
        AttributeType::String
        | AttributeType::Text
        | AttributeType::Date
        | AttributeType::DateTime
        | AttributeType::Decimal
        | AttributeType::BigInt => TypeRef::STRING.to_string(),
        AttributeType::Integer => TypeRef::INT.to_string(),
        AttributeType::Float => TypeRef::FLOAT.to_string(),
        AttributeType::Boolean => TypeRef::BOOLEAN.to_string(),
        AttributeType::Uuid => TypeRef::ID.to_string(),
        AttributeType::Json => JSON_SCALAR.to_string(),
        AttributeType::Enum(_) => enum_type_name(model_name, &attribute.name),
    }
}

/// `{Model}{Attribute}Enum`, e.g. `CustomerStatusEnum`
pub fn enum_type_name(model_name: &str, attribute_name: &str) -> String {
    format!("{}{}Enum", model_name, pascal_case(attribute_name))
}

/// Enum types backing the model's enum attributes, ready to register
pub fn attribute_enum_types<M>(model: &M) -> Vec<Enum>
where
    M: ModelDescriptor + ?Sized,
{
    model
        .list_attributes()
        .iter()
        .filter_map(|attribute| match &attribute.data_type {
            AttributeType::Enum(values) => Some(
                values
                    .iter()
                    .fold(Enum::new(enum_type_name(model.name(), &attribute.name)), |e, v| {
                        e.item(EnumItem::new(v.as_str()))
                    }),
            ),
            _ => None,
        })
        .collect()
}

/// Render one attribute as an input field (no resolver)
pub(crate) fn input_field(
    model_name: &str,
    attribute: &AttributeDescriptor,
    options: &AttributeFieldsOptions,
    allow_null: bool,
) -> FieldConfig {
    let type_name = if options.global_id && is_key(attribute) {
        TypeRef::ID.to_string()
    } else {
        attribute_type_name(model_name, attribute)
    };
    finish(
        FieldConfig::new(wrap(type_name, attribute, allow_null)),
        attribute,
        options,
    )
}

fn output_field(
    model_name: &str,
    attribute: &AttributeDescriptor,
    options: &AttributeFieldsOptions,
    allow_null: bool,
) -> FieldConfig {
    let field = if options.global_id && attribute.primary_key {
        FieldConfig::new(TypeRef::named_nn(TypeRef::ID))
            .resolver(global_id_resolver(&attribute.name, model_name))
    } else if let (true, Some(target)) = (options.global_id, &attribute.references) {
        FieldConfig::new(wrap(TypeRef::ID.to_string(), attribute, allow_null))
            .resolver(global_id_resolver(&attribute.name, target))
    } else {
        let field = FieldConfig::new(wrap(
            attribute_type_name(model_name, attribute),
            attribute,
            allow_null,
        ));
        match &attribute.data_type {
            AttributeType::Enum(_) => field.resolver(enum_resolver(&attribute.name)),
            AttributeType::Decimal | AttributeType::BigInt => {
                field.resolver(string_resolver(&attribute.name))
            }
            _ => field,
        }
    };
    finish(field, attribute, options)
}

fn wrap(type_name: String, attribute: &AttributeDescriptor, allow_null: bool) -> TypeRef {
    let ty = TypeRef::named(type_name);
    if !attribute.allow_null && !allow_null {
        non_null(ty)
    } else {
        ty
    }
}

fn finish(
    field: FieldConfig,
    attribute: &AttributeDescriptor,
    options: &AttributeFieldsOptions,
) -> FieldConfig {
    match (&attribute.comment, options.comment_to_description) {
        (Some(comment), true) => field.description(comment.clone()),
        _ => field,
    }
}

fn is_key(attribute: &AttributeDescriptor) -> bool {
    attribute.primary_key || attribute.references.is_some()
}

/// Read `name` off the parent record and apply `convert` to non-null values
fn record_resolver<F>(name: &str, convert: F) -> Resolver
where
    F: Fn(&JsonValue) -> Option<Value> + Send + Sync + 'static,
{
    let name = name.to_string();
    let convert = Arc::new(convert);
    resolver_fn(move |ctx| {
        let name = name.clone();
        let convert = convert.clone();
        FieldFuture::new(async move {
            let record = ctx.parent_value.try_downcast_ref::<Record>()?;
            Ok(record
                .get(&name)
                .filter(|value| !value.is_null())
                .and_then(|value| convert(value))
                .map(FieldValue::value))
        })
    })
}

fn global_id_resolver(name: &str, type_name: &str) -> Resolver {
    let type_name = type_name.to_string();
    record_resolver(name, move |value| {
        id_string(value).map(|id| Value::String(to_global_id(&type_name, &id)))
    })
}

fn enum_resolver(name: &str) -> Resolver {
    record_resolver(name, |value| {
        value.as_str().map(|item| Value::Enum(Name::new(item)))
    })
}

fn string_resolver(name: &str) -> Resolver {
    record_resolver(name, |value| match value {
        JsonValue::String(s) => Some(Value::String(s.clone())),
        other => Some(Value::String(other.to_string())),
    })
}

fn pascal_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}
