//! Default query arguments and their runtime interpretation

use async_graphql::dynamic::{ResolverContext, TypeRef};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::core::field::{InputValueConfig, JSON_SCALAR};
use crate::core::global_id::from_global_id;
use crate::core::model::{AttributeDescriptor, AttributeType, ModelDescriptor, Record, Where};
use crate::fields::attribute::{AttributeFieldsOptions, attribute_type_name};

/// Name of the free-form criteria argument
pub const WHERE_ARG: &str = "where";
pub const LIMIT_ARG: &str = "limit";
pub const OFFSET_ARG: &str = "offset";

/// Arguments for fetching a single row of `model`
///
/// The primary key (nullable, typed after the column) followed by
/// `where: JSON`. Models without a primary key only get `where`.
pub fn default_args<M>(model: &M) -> IndexMap<String, InputValueConfig>
where
    M: ModelDescriptor + ?Sized,
{
    default_args_with(model, &AttributeFieldsOptions::default())
}

/// Like [`default_args`], but the primary key argument is typed `ID` when
/// `options.global_id` is set, so ids read from results can be sent back
pub fn default_args_with<M>(
    model: &M,
    options: &AttributeFieldsOptions,
) -> IndexMap<String, InputValueConfig>
where
    M: ModelDescriptor + ?Sized,
{
    let mut args = IndexMap::new();

    if let Some(attribute) = key_attribute(model) {
        let type_name = if options.global_id {
            TypeRef::ID.to_string()
        } else {
            attribute_type_name(model.name(), &attribute)
        };
        args.insert(
            attribute.name.clone(),
            InputValueConfig::new(TypeRef::named(type_name)),
        );
    }

    args.insert(
        WHERE_ARG.to_string(),
        InputValueConfig::new(TypeRef::named(JSON_SCALAR))
            .description("Equality criteria keyed by attribute name"),
    );
    args
}

/// Arguments for fetching a page of rows
pub fn default_list_args() -> IndexMap<String, InputValueConfig> {
    let mut args = IndexMap::new();
    args.insert(
        LIMIT_ARG.to_string(),
        InputValueConfig::new(TypeRef::named(TypeRef::INT)),
    );
    args.insert(
        OFFSET_ARG.to_string(),
        InputValueConfig::new(TypeRef::named(TypeRef::INT)),
    );
    args.insert(
        WHERE_ARG.to_string(),
        InputValueConfig::new(TypeRef::named(JSON_SCALAR))
            .description("Equality criteria keyed by attribute name"),
    );
    args
}

/// Collect the field arguments of a resolver call as JSON
pub(crate) fn args_record(ctx: &ResolverContext<'_>) -> async_graphql::Result<Record> {
    let mut record = Record::new();
    for (name, value) in ctx.args.iter() {
        record.insert(name.to_string(), value.as_value().clone().into_json()?);
    }
    Ok(record)
}

/// Read the `where` argument, treating null as absent
pub(crate) fn where_arg(args: &Record) -> Result<Option<Where>, String> {
    match args.get(WHERE_ARG) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Object(criteria)) => Ok(Some(criteria.clone())),
        Some(other) => Err(format!("expected an object, got {}", other)),
    }
}

/// Read a non-negative integer argument such as `limit`
pub(crate) fn usize_arg(args: &Record, name: &str) -> Result<Option<usize>, String> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| format!("expected a non-negative integer, got {}", value)),
    }
}

/// Descriptor of the model's primary key column
pub(crate) fn key_attribute<M>(model: &M) -> Option<AttributeDescriptor>
where
    M: ModelDescriptor + ?Sized,
{
    model
        .primary_key_attribute()
        .and_then(|name| model.attribute(&name))
}

/// Turn a key argument back into the value stored in the `key` column
///
/// Runs whether or not the schema exposes global ids: a string is only
/// unwrapped when it decodes to `{type_name}:{id}`, and `ID` typed inputs
/// may carry either form. Integer columns get integers, every other
/// column keeps the string.
pub(crate) fn decode_key(
    type_name: &str,
    key: &AttributeDescriptor,
    value: JsonValue,
) -> JsonValue {
    let JsonValue::String(candidate) = &value else {
        return value;
    };
    let local = match from_global_id(candidate) {
        Some((decoded_type, id)) if decoded_type == type_name => id,
        _ => candidate.clone(),
    };
    match key.data_type {
        AttributeType::Integer | AttributeType::BigInt => local
            .parse::<i64>()
            .map(JsonValue::from)
            .unwrap_or(JsonValue::String(local)),
        _ => JsonValue::String(local),
    }
}

/// Criteria for query resolvers: `where` plus the primary key argument
pub(crate) fn query_criteria<M>(model: &M, args: &Record) -> async_graphql::Result<Where>
where
    M: ModelDescriptor + ?Sized,
{
    let mut criteria = where_arg(args)
        .map_err(|message| async_graphql::Error::new(format!("invalid argument 'where': {}", message)))?
        .unwrap_or_default();

    if let Some(key) = key_attribute(model) {
        match args.get(&key.name) {
            None | Some(JsonValue::Null) => {}
            Some(value) => {
                let decoded = decode_key(model.name(), &key, value.clone());
                criteria.insert(key.name, decoded);
            }
        }
    }
    Ok(criteria)
}
