//! Selecting the rows a mutation applies to

use serde_json::Value as JsonValue;

use crate::core::error::MutationError;
use crate::core::model::{AttributeDescriptor, Record, Where};
use crate::fields::args::{WHERE_ARG, decode_key, where_arg};

/// Where the primary key may come from, beyond the `where` argument
pub(crate) struct KeySources<'a> {
    pub model_name: &'a str,
    pub primary_key: Option<&'a AttributeDescriptor>,
    /// The values payload and its argument name, for updates
    pub values: Option<(&'a mut Record, &'a str)>,
}

/// Build the criteria identifying the target rows
///
/// Starts from the `where` argument. A primary key argument is added on
/// top; failing that, a primary key inside the values payload is moved
/// into the criteria and removed from the payload. Without `where` some
/// primary key must be present.
pub(crate) fn identifying_criteria(
    args: &Record,
    sources: KeySources<'_>,
) -> Result<Where, MutationError> {
    let KeySources {
        model_name,
        primary_key,
        values,
    } = sources;

    let given = where_arg(args).map_err(|message| MutationError::InvalidArgument {
        name: WHERE_ARG.to_string(),
        message,
    })?;

    let Some(primary_key) = primary_key else {
        return given.ok_or(MutationError::MissingWhere);
    };

    let name = primary_key.name.as_str();
    let key_arg = present(args.get(name));
    let (values, values_arg) = match values {
        Some((values, values_arg)) => (Some(values), Some(values_arg)),
        None => (None, None),
    };
    let key_in_values = values
        .as_deref()
        .and_then(|values| present(values.get(name)));

    if given.is_none() && key_arg.is_none() && key_in_values.is_none() {
        return Err(match values_arg {
            Some(values_arg) => MutationError::MissingCriteria {
                primary_key: name.to_string(),
                values_arg: values_arg.to_string(),
            },
            None => MutationError::MissingWhere,
        });
    }

    let mut criteria = given.unwrap_or_default();
    if let Some(key) = key_arg {
        criteria.insert(
            name.to_string(),
            decode_key(model_name, primary_key, key.clone()),
        );
    } else if let Some(values) = values {
        if let Some(key) = values.remove(name).filter(|key| !key.is_null()) {
            criteria.insert(name.to_string(), decode_key(model_name, primary_key, key));
        }
    }

    Ok(criteria)
}

/// Drop an explicit null primary key from the values payload
pub(crate) fn strip_null_key(values: &mut Record, primary_key: Option<&str>) {
    if let Some(primary_key) = primary_key {
        if values.get(primary_key).is_some_and(JsonValue::is_null) {
            values.remove(primary_key);
        }
    }
}

/// Lay statically configured criteria over the computed ones
///
/// Keys present in both keep the static value.
pub(crate) fn merge_criteria(mut criteria: Where, fixed: &Where) -> Where {
    for (key, value) in fixed {
        criteria.insert(key.clone(), value.clone());
    }
    criteria
}

fn present(value: Option<&JsonValue>) -> Option<&JsonValue> {
    value.filter(|value| !value.is_null())
}
