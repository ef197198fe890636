//! Assembly of a complete dynamic schema over a set of models
//!
//! Every model gets an object type, `Create{Model}` / `Update{Model}` input
//! types, a single and a list query field, and `create`, `update` and
//! `destroy` mutations. Generated mutations can be replaced one by one,
//! typically to attach hooks.

use async_graphql::dynamic::{InputObject, Object, Schema, SchemaBuilder, TypeRef};
use indexmap::IndexMap;

use crate::core::error::{FieldMapperError, SchemaBuildError};
use crate::core::field::{FieldConfig, json_scalar, list_of};
use crate::core::model::{ModelDescriptor, ModelRef};
use crate::core::pluralize::Pluralizer;
use crate::fields::{
    AssociationFieldsOptions, AttributeFieldsOptions, association_fields, attribute_enum_types,
    attribute_fields, attribute_fields_for_create, attribute_fields_for_update, default_args_with,
    default_list_args, model_list_resolver, model_resolver,
};
use crate::mutations::{
    CreateMutationOptions, DestroyMutationOptions, UpdateOneMutationOptions, create_mutation,
    destroy_mutation, update_one_mutation,
};

pub const QUERY_TYPE: &str = "Query";
pub const MUTATION_TYPE: &str = "Mutation";

pub fn create_input_name(model_name: &str) -> String {
    format!("Create{}", model_name)
}

pub fn update_input_name(model_name: &str) -> String {
    format!("Update{}", model_name)
}

/// `Customer` → `customer`, `BranchCustomer` → `branchCustomer`
fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Object type for `model`: its attributes followed by its associations
pub fn model_object(
    model: &ModelRef,
    options: &AttributeFieldsOptions,
) -> Result<Object, FieldMapperError> {
    let mut fields = attribute_fields(model.as_ref(), options);
    fields.extend(association_fields(
        model,
        &AssociationFieldsOptions::new(|target| Some(TypeRef::named(target.name()))),
    )?);

    Ok(fields
        .into_iter()
        .fold(Object::new(model.name()), |object, (name, field)| {
            object.field(field.into_field(name))
        }))
}

fn input_object(name: String, fields: IndexMap<String, FieldConfig>) -> Option<InputObject> {
    if fields.is_empty() {
        return None;
    }
    Some(
        fields
            .into_iter()
            .fold(InputObject::new(name), |object, (name, field)| {
                object.field(field.into_input_value(name))
            }),
    )
}

/// `Create{Model}` input, or `None` when nothing can be supplied
pub fn create_input_object<M>(model: &M, options: &AttributeFieldsOptions) -> Option<InputObject>
where
    M: ModelDescriptor + ?Sized,
{
    input_object(
        create_input_name(model.name()),
        attribute_fields_for_create(model, options),
    )
}

/// `Update{Model}` input, or `None` when nothing can be supplied
pub fn update_input_object<M>(model: &M, options: &AttributeFieldsOptions) -> Option<InputObject>
where
    M: ModelDescriptor + ?Sized,
{
    input_object(
        update_input_name(model.name()),
        attribute_fields_for_update(model, options),
    )
}

/// `{model}` and `{models}` root query fields
///
/// The key argument of `{model}` follows `options.global_id`.
pub fn query_fields(
    model: &ModelRef,
    options: &AttributeFieldsOptions,
) -> IndexMap<String, FieldConfig> {
    let name = model.name();
    let mut fields = IndexMap::new();
    fields.insert(
        lower_first(name),
        FieldConfig::new(TypeRef::named(name))
            .arguments(default_args_with(model.as_ref(), options))
            .resolver(model_resolver(model.clone())),
    );
    fields.insert(
        lower_first(&Pluralizer::pluralize(name)),
        FieldConfig::new(list_of(TypeRef::named_nn(name)))
            .arguments(default_list_args())
            .resolver(model_list_resolver(model.clone())),
    );
    fields
}

/// Hook-less `create{Model}`, `update{Model}` and `destroy{Model}` fields
///
/// The create and update mutations are left out when the model has no
/// input fields for them.
pub fn crud_mutations(
    model: &ModelRef,
    options: &AttributeFieldsOptions,
) -> IndexMap<String, FieldConfig> {
    let name = model.name();
    let return_type = TypeRef::named(name);
    let mut fields = IndexMap::new();

    if !attribute_fields_for_create(model.as_ref(), options).is_empty() {
        fields.insert(
            format!("create{}", name),
            create_mutation(CreateMutationOptions::<()>::new(
                model.clone(),
                TypeRef::named(create_input_name(name)),
                return_type.clone(),
            )),
        );
    }
    if !attribute_fields_for_update(model.as_ref(), options).is_empty() {
        fields.insert(
            format!("update{}", name),
            update_one_mutation(
                UpdateOneMutationOptions::<()>::new(
                    model.clone(),
                    TypeRef::named(update_input_name(name)),
                    return_type,
                )
                .global_id(options.global_id),
            ),
        );
    }
    fields.insert(
        format!("destroy{}", name),
        destroy_mutation(
            DestroyMutationOptions::<()>::new(model.clone()).global_id(options.global_id),
        ),
    );
    fields
}

/// Builder for a schema exposing a set of models
pub struct ModelSchema {
    models: Vec<ModelRef>,
    attribute_options: AttributeFieldsOptions,
    mutations: IndexMap<String, FieldConfig>,
}

impl ModelSchema {
    pub fn new(models: impl IntoIterator<Item = ModelRef>) -> Self {
        Self {
            models: models.into_iter().collect(),
            attribute_options: AttributeFieldsOptions::default(),
            mutations: IndexMap::new(),
        }
    }

    /// Options applied to object and input fields of every model
    pub fn attribute_options(mut self, options: AttributeFieldsOptions) -> Self {
        self.attribute_options = options;
        self
    }

    /// Add a mutation, replacing a generated one of the same name
    pub fn mutation(mut self, name: impl Into<String>, field: FieldConfig) -> Self {
        self.mutations.insert(name.into(), field);
        self
    }

    /// Register every type and root field; the caller may add request data
    /// before finishing
    pub fn builder(self) -> Result<SchemaBuilder, SchemaBuildError> {
        tracing::debug!(models = self.models.len(), "building schema");

        let mut query = Object::new(QUERY_TYPE);
        let mut mutation_fields = IndexMap::new();
        let mut objects = Vec::new();
        let mut inputs = Vec::new();
        let mut enums = Vec::new();

        for model in &self.models {
            objects.push(model_object(model, &self.attribute_options)?);
            inputs.extend(create_input_object(model.as_ref(), &self.attribute_options));
            inputs.extend(update_input_object(model.as_ref(), &self.attribute_options));
            enums.extend(attribute_enum_types(model.as_ref()));

            for (name, field) in query_fields(model, &self.attribute_options) {
                query = query.field(field.into_field(name));
            }
            mutation_fields.extend(crud_mutations(model, &self.attribute_options));
        }
        mutation_fields.extend(self.mutations);

        let mutation_type = (!mutation_fields.is_empty()).then_some(MUTATION_TYPE);
        let mut builder = Schema::build(QUERY_TYPE, mutation_type, None)
            .register(json_scalar())
            .register(query);

        if mutation_type.is_some() {
            let mutation = mutation_fields
                .into_iter()
                .fold(Object::new(MUTATION_TYPE), |object, (name, field)| {
                    object.field(field.into_field(name))
                });
            builder = builder.register(mutation);
        }
        for object in objects {
            builder = builder.register(object);
        }
        for input in inputs {
            builder = builder.register(input);
        }
        for ty in enums {
            builder = builder.register(ty);
        }

        Ok(builder)
    }

    pub fn finish(self) -> Result<Schema, SchemaBuildError> {
        self.builder()?
            .finish()
            .map_err(|e| SchemaBuildError::Schema(e.to_string()))
    }
}
