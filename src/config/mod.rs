//! Model configuration loading for the in-memory database

use crate::core::error::ConfigError;
use crate::core::model::{Alias, AssociationKind, AttributeDescriptor};
use crate::core::pluralize::Pluralizer;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Configuration for one model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name (e.g., "Customer")
    pub name: String,

    /// Singular form, defaults to the model name
    #[serde(default)]
    pub singular: Option<String>,

    /// Plural form, defaults to the pluralized model name
    #[serde(default)]
    pub plural: Option<String>,

    /// Declared columns; an `id` primary key is added when none is declared
    #[serde(default)]
    pub attributes: Vec<AttributeDescriptor>,

    #[serde(default)]
    pub associations: Vec<AssociationConfig>,

    /// Maintain `createdAt` / `updatedAt` columns
    #[serde(default = "default_timestamps")]
    pub timestamps: bool,
}

fn default_timestamps() -> bool {
    true
}

impl ModelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            singular: None,
            plural: None,
            attributes: Vec::new(),
            associations: Vec::new(),
            timestamps: true,
        }
    }

    pub fn attribute(mut self, attribute: AttributeDescriptor) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn association(mut self, association: AssociationConfig) -> Self {
        self.associations.push(association);
        self
    }

    pub fn timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn singular_name(&self) -> String {
        self.singular.clone().unwrap_or_else(|| self.name.clone())
    }

    pub fn plural_name(&self) -> String {
        self.plural
            .clone()
            .unwrap_or_else(|| Pluralizer::pluralize(&self.name))
    }
}

/// A relationship declared on its source model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationConfig {
    pub kind: AssociationKind,

    /// Name of the target model
    pub target: String,

    /// Exposed name; defaults to the target's singular/plural names
    #[serde(default, rename = "as")]
    pub alias: Option<Alias>,

    /// Foreign key column, defaults to `{Target}Id` for `belongs_to` and
    /// `{Source}Id` otherwise
    #[serde(default)]
    pub foreign_key: Option<String>,

    /// Join model, required for `belongs_to_many`
    #[serde(default)]
    pub through: Option<String>,
}

impl AssociationConfig {
    pub fn new(kind: AssociationKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            alias: None,
            foreign_key: None,
            through: None,
        }
    }

    pub fn alias(mut self, alias: Alias) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn foreign_key(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = Some(foreign_key.into());
        self
    }

    pub fn through(mut self, through: impl Into<String>) -> Self {
        self.through = Some(through.into());
        self
    }
}

/// Complete configuration for an in-memory database
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub models: Vec<ModelConfig>,
}

impl DatabaseConfig {
    /// Load and validate configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load and validate configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.iter().find(|model| model.name == name)
    }

    /// Check names and references for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for model in &self.models {
            if !names.insert(model.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate model '{}'",
                    model.name
                )));
            }
        }

        for model in &self.models {
            let mut attributes = HashSet::new();
            for attribute in &model.attributes {
                if !attributes.insert(attribute.name.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "duplicate attribute '{}' on model '{}'",
                        attribute.name, model.name
                    )));
                }
            }
            if model.attributes.iter().filter(|a| a.primary_key).count() > 1 {
                return Err(ConfigError::Invalid(format!(
                    "model '{}' declares more than one primary key",
                    model.name
                )));
            }

            for association in &model.associations {
                if !names.contains(association.target.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "association on '{}' targets unknown model '{}'",
                        model.name, association.target
                    )));
                }

                match (association.kind, &association.through) {
                    (AssociationKind::BelongsToMany, None) => {
                        return Err(ConfigError::Invalid(format!(
                            "belongs_to_many from '{}' to '{}' needs a through model",
                            model.name, association.target
                        )));
                    }
                    (AssociationKind::BelongsToMany, Some(through))
                        if !names.contains(through.as_str()) =>
                    {
                        return Err(ConfigError::Invalid(format!(
                            "association on '{}' goes through unknown model '{}'",
                            model.name, through
                        )));
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }
}
