//! Input fields for create and update payloads

use indexmap::IndexMap;

use crate::core::field::FieldConfig;
use crate::core::model::{AttributeDescriptor, ModelDescriptor};
use crate::fields::attribute::{AttributeFieldsOptions, input_field};

/// Input fields for a create payload
///
/// Non-nullable columns come first and are required (`T!`) unless
/// `options.allow_null` is set; nullable columns follow and stay optional
/// unless `options.allow_null` is `Some(false)`. Auto-generated columns are
/// never included.
pub fn attribute_fields_for_create<M>(
    model: &M,
    options: &AttributeFieldsOptions,
) -> IndexMap<String, FieldConfig>
where
    M: ModelDescriptor + ?Sized,
{
    let (optional, required): (Vec<_>, Vec<_>) = model
        .list_attributes()
        .into_iter()
        .filter(|attribute| !attribute.auto_generated && options.selects(&attribute.name))
        .partition(|attribute| attribute.allow_null);

    let mut fields = render(
        model.name(),
        required.iter(),
        options,
        options.allow_null.unwrap_or(false),
    );
    fields.extend(render(
        model.name(),
        optional.iter(),
        options,
        options.allow_null.unwrap_or(true),
    ));
    fields
}

/// Input fields for an update payload
///
/// Every field is optional. Auto-generated columns are left out, except the
/// primary key: it may identify the row through the values argument.
pub fn attribute_fields_for_update<M>(
    model: &M,
    options: &AttributeFieldsOptions,
) -> IndexMap<String, FieldConfig>
where
    M: ModelDescriptor + ?Sized,
{
    let attributes = model.list_attributes();
    let selected = attributes.iter().filter(|attribute| {
        (!attribute.auto_generated || attribute.primary_key) && options.selects(&attribute.name)
    });
    render(
        model.name(),
        selected,
        options,
        options.allow_null.unwrap_or(true),
    )
}

fn render<'a>(
    model_name: &str,
    attributes: impl Iterator<Item = &'a AttributeDescriptor>,
    options: &AttributeFieldsOptions,
    allow_null: bool,
) -> IndexMap<String, FieldConfig> {
    attributes
        .map(|attribute| {
            (
                options.output_key(&attribute.name),
                input_field(model_name, attribute, options, allow_null),
            )
        })
        .collect()
}
