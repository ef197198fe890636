//! Typed errors for field mapping, mutation resolution and configuration
//!
//! # Error Categories
//!
//! - [`FieldMapperError`]: schema construction failed (bad mapper configuration)
//! - [`MutationError`]: a generated mutation resolver failed at runtime
//! - [`ConfigError`]: model configuration could not be loaded
//! - [`SchemaBuildError`]: a full schema could not be assembled
//!
//! Errors raised by hooks and by the ORM are carried unchanged inside
//! [`MutationError::Hook`] and [`MutationError::Model`], so their messages
//! reach the GraphQL client verbatim.

use async_graphql::ErrorExtensions;

// =============================================================================
// Field Mapper Errors
// =============================================================================

/// Configuration errors detected while building fields
#[derive(Debug, thiserror::Error)]
pub enum FieldMapperError {
    /// `get_type` returned nothing for an association target
    #[error("missing type for model: {model}")]
    MissingType { model: String },

    /// `get_resolver` returned nothing for an association
    #[error("missing resolver for model: {model}, association: {association}")]
    MissingResolver { model: String, association: String },
}

impl FieldMapperError {
    pub fn error_code(&self) -> &'static str {
        match self {
            FieldMapperError::MissingType { .. } => "MISSING_TYPE",
            FieldMapperError::MissingResolver { .. } => "MISSING_RESOLVER",
        }
    }
}

// =============================================================================
// Mutation Errors
// =============================================================================

/// Errors returned by the generated mutation resolvers
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    /// Neither a `where` argument nor the primary key was supplied
    #[error("You must provide where or the primary key via {primary_key} arg or {values_arg} arg")]
    MissingCriteria {
        primary_key: String,
        values_arg: String,
    },

    /// No `where` argument and no primary key to fall back on
    #[error("You must provide where or the primary key")]
    MissingWhere,

    /// The updated row could not be read back
    #[error("failed to find updated {type_name}")]
    NotFound { type_name: String },

    /// An argument had an unexpected shape
    #[error("invalid argument '{name}': {message}")]
    InvalidArgument { name: String, message: String },

    /// A `before` or `after` hook failed
    #[error(transparent)]
    Hook(anyhow::Error),

    /// The ORM rejected the operation
    #[error(transparent)]
    Model(anyhow::Error),
}

impl MutationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            MutationError::MissingCriteria { .. } | MutationError::MissingWhere => {
                "MISSING_CRITERIA"
            }
            MutationError::NotFound { .. } => "NOT_FOUND",
            MutationError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            MutationError::Hook(_) => "HOOK_FAILED",
            MutationError::Model(_) => "MODEL_ERROR",
        }
    }

    /// Whether the error originates in this crate rather than user code
    pub fn is_usage_error(&self) -> bool {
        !matches!(self, MutationError::Hook(_) | MutationError::Model(_))
    }

    /// Convert into a field-level GraphQL error
    ///
    /// Errors raised by this crate carry a `code` extension; hook and ORM
    /// failures keep their message and nothing else.
    pub fn into_graphql_error(self) -> async_graphql::Error {
        let code = self.error_code();
        if self.is_usage_error() {
            async_graphql::Error::new(self.to_string()).extend_with(|_, ext| ext.set("code", code))
        } else {
            async_graphql::Error::new(self.to_string())
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors loading a model configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The configuration parsed but is inconsistent
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::Io { .. } => "CONFIG_IO_ERROR",
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR",
            ConfigError::Invalid(_) => "CONFIG_INVALID",
        }
    }
}

// =============================================================================
// Schema Build Errors
// =============================================================================

/// Errors assembling a complete schema
#[derive(Debug, thiserror::Error)]
pub enum SchemaBuildError {
    #[error(transparent)]
    Mapper(#[from] FieldMapperError),

    /// async-graphql rejected the assembled types
    #[error("invalid schema: {0}")]
    Schema(String),
}

impl SchemaBuildError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SchemaBuildError::Mapper(err) => err.error_code(),
            SchemaBuildError::Schema(_) => "INVALID_SCHEMA",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
