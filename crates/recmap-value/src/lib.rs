#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # recmap-value
//!
//! Boxed-value primitives for record normalization.
//!
//! This crate provides the loosely-typed [`Datum`] scalar, the immutable
//! [`Value`] box carrying a [`Status`] and diagnostic message, and the
//! [`Raw`] trait through which heterogeneous source records expose keyed
//! lookup to the mapping engine.

/// Loosely-typed scalar datum used for raw and normalized values.
pub mod datum;
/// Keyed-lookup seam for heterogeneous source records.
pub mod raw;
/// Immutable boxed value with status, message, and payload.
pub mod value;

/// Scalar datum enum.
pub use datum::Datum;
/// Source-record lookup trait.
pub use raw::Raw;
/// Boxed value primitives.
pub use value::{Patch, Payload, Status, Value};

use thiserror::Error;

/// Errors that can occur when working with boxed values
#[derive(Error, Debug)]
pub enum Error {
    #[error("Value has no payload attribute named '{name}'")]
    UnknownAttribute { name: String },
}

impl Error {
    /// Build an unknown-attribute error naming the missing payload entry.
    pub fn unknown_attribute(name: impl Into<String>) -> Self {
        Self::UnknownAttribute { name: name.into() }
    }
}

/// Crate-local result type for value operations.
pub type Result<T> = std::result::Result<T, Error>;
