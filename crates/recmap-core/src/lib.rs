//! # recmap-core
//!
//! Field declarations, schema collection, and the record runtime.
//!
//! A record type is described once as a [`Schema`]: a set of named
//! [`Field`]/[`KeyField`]/[`ChoiceKeyField`] declarations collected by
//! [`SchemaBuilder`] plus a registry of named extraction methods. A
//! [`Record`] then wraps one raw input payload and resolves each field
//! lazily on first access, boxing the result as a
//! [`recmap_value::Value`] so that per-field failures never abort the
//! rest of the record.

pub mod field;
pub mod record;
pub mod schema;

pub use field::{BoxError, ChoiceKeyField, Extractor, Field, FieldMap, KeyField, Mapped, Transform};
pub use record::{Detailed, Record, Seed};
pub use schema::{Method, Schema, SchemaBuilder};

use thiserror::Error;

/// Errors that can occur during field mapping and record access
#[derive(Error, Debug)]
pub enum Error {
    #[error("Record has no field named '{name}'")]
    UnknownField { name: String },

    #[error("Schema has no method named '{name}'")]
    UnknownMethod { name: String },

    #[error("Method '{name}' has the wrong signature: expected an {expected} method")]
    MethodKind { name: String, expected: String },

    #[error("Extraction function for field '{field}' failed: {source}")]
    Func {
        field: String,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    Value(#[from] recmap_value::Error),
}

impl Error {
    /// Build an unknown-field error naming the undeclared field.
    pub fn unknown_field(name: impl Into<String>) -> Self {
        Self::UnknownField { name: name.into() }
    }

    /// Build an unknown-method error naming the missing registry entry.
    pub fn unknown_method(name: impl Into<String>) -> Self {
        Self::UnknownMethod { name: name.into() }
    }

    /// Build a method-signature error with the expected method form.
    pub fn method_kind(name: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::MethodKind {
            name: name.into(),
            expected: expected.into(),
        }
    }

    /// Wrap a failure raised by a caller-supplied extraction function.
    pub fn func(field: impl Into<String>, source: BoxError) -> Self {
        Self::Func {
            field: field.into(),
            source,
        }
    }
}

/// Crate-local result type for mapping operations.
pub type Result<T> = std::result::Result<T, Error>;
