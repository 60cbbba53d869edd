//! # recmap-convert
//!
//! Stateless scalar coercion helpers, meant to be called from field
//! transform functions. The string, number, and date helpers pass null
//! input through untouched, and the parsing helpers pass blank strings
//! through as well, so that the blank/null policy of the owning field
//! stays in charge of acceptability. The boolean helpers instead fold
//! null into `false` by truthiness.

use chrono::{NaiveDate, NaiveDateTime};
use recmap_value::Datum;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur during scalar coercion
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot convert '{input}' to a number")]
    Number { input: String },

    #[error("Cannot parse '{input}' as a date with format '{format}'")]
    Date { input: String, format: String },

    #[error("Cannot parse '{input}' as a date/time with format '{format}'")]
    DateTime { input: String, format: String },
}

impl Error {
    /// Build a number-conversion error for the given input.
    pub fn number(input: impl Into<String>) -> Self {
        Self::Number {
            input: input.into(),
        }
    }

    /// Build a date-parsing error for the given input and format.
    pub fn date(input: impl Into<String>, format: impl Into<String>) -> Self {
        Self::Date {
            input: input.into(),
            format: format.into(),
        }
    }

    /// Build a date/time-parsing error for the given input and format.
    pub fn datetime(input: impl Into<String>, format: impl Into<String>) -> Self {
        Self::DateTime {
            input: input.into(),
            format: format.into(),
        }
    }
}

/// Crate-local result type for coercion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coerce the datum to a trimmed string
///
/// # Errors
///
/// Infallible in practice; the `Result` keeps the helper signatures
/// uniform for use inside field transforms.
pub fn as_string(datum: &Datum) -> Result<Datum> {
    match datum.as_string() {
        Some(s) => Ok(Datum::String(s.trim().to_string())),
        None => Ok(Datum::Null),
    }
}

/// Coerce the datum to a trimmed, upper-cased factor string
///
/// # Errors
///
/// Infallible in practice, as [`as_string`].
pub fn as_factor(datum: &Datum) -> Result<Datum> {
    match as_string(datum)? {
        Datum::String(s) => Ok(Datum::String(s.to_uppercase())),
        other => Ok(other),
    }
}

/// Coerce the datum to a decimal number
///
/// Blank strings pass through unchanged; the surrounding whitespace of
/// a numeric string is ignored.
///
/// # Errors
///
/// Returns [`Error::Number`] when the trimmed string form does not
/// parse as a number.
pub fn as_number(datum: &Datum) -> Result<Datum> {
    if datum.is_null() || datum.is_blank() {
        return Ok(datum.clone());
    }
    match datum {
        Datum::Integer(i) => Ok(Datum::Decimal(*i as f64)),
        Datum::Decimal(_) => Ok(datum.clone()),
        other => {
            let text = match as_string(other)? {
                Datum::String(s) => s,
                _ => String::new(),
            };
            text.parse::<f64>()
                .map(Datum::Decimal)
                .map_err(|_| Error::number(text))
        }
    }
}

/// Coerce the datum to a boolean by truthiness
///
/// Null and blank are false; a non-empty string is true regardless of
/// its content; numbers are true unless zero.
///
/// # Errors
///
/// Infallible in practice, as [`as_string`].
pub fn as_boolean(datum: &Datum) -> Result<Datum> {
    let truthy = match datum {
        Datum::Null => false,
        Datum::String(s) => !s.is_empty(),
        Datum::Integer(i) => *i != 0,
        Datum::Decimal(d) => *d != 0.0,
        Datum::Boolean(b) => *b,
        Datum::Date(_) | Datum::Time(_) | Datum::DateTime(_) => true,
    };
    Ok(Datum::Boolean(truthy))
}

/// Coerce the datum to a boolean through a caller-supplied predicate
///
/// # Errors
///
/// Infallible in practice, as [`as_string`].
pub fn as_boolean_by(datum: &Datum, predicate: impl Fn(&Datum) -> bool) -> Result<Datum> {
    Ok(Datum::Boolean(predicate(datum)))
}

/// Parse the datum as a date in `%Y-%m-%d` form
///
/// # Errors
///
/// Returns [`Error::Date`] when the string form does not match.
pub fn as_date(datum: &Datum) -> Result<Datum> {
    as_date_fmt(datum, DATE_FORMAT)
}

/// Parse the datum as a date with an explicit format
///
/// Null and blank pass through; an already-parsed date passes through.
///
/// # Errors
///
/// Returns [`Error::Date`] when the string form does not match the
/// format.
pub fn as_date_fmt(datum: &Datum, format: &str) -> Result<Datum> {
    if datum.is_null() || datum.is_blank() {
        return Ok(datum.clone());
    }
    match datum {
        Datum::Date(_) => Ok(datum.clone()),
        Datum::String(s) => NaiveDate::parse_from_str(s, format)
            .map(Datum::Date)
            .map_err(|_| Error::date(s, format)),
        other => Err(Error::date(other.to_string(), format)),
    }
}

/// Parse the datum as a date/time in `%Y-%m-%d %H:%M:%S` form
///
/// # Errors
///
/// Returns [`Error::DateTime`] when the string form does not match.
pub fn as_datetime(datum: &Datum) -> Result<Datum> {
    as_datetime_fmt(datum, DATETIME_FORMAT)
}

/// Parse the datum as a date/time with an explicit format
///
/// Null and blank pass through; an already-parsed date/time passes
/// through.
///
/// # Errors
///
/// Returns [`Error::DateTime`] when the string form does not match the
/// format.
pub fn as_datetime_fmt(datum: &Datum, format: &str) -> Result<Datum> {
    if datum.is_null() || datum.is_blank() {
        return Ok(datum.clone());
    }
    match datum {
        Datum::DateTime(_) => Ok(datum.clone()),
        Datum::String(s) => NaiveDateTime::parse_from_str(s, format)
            .map(Datum::DateTime)
            .map_err(|_| Error::datetime(s, format)),
        other => Err(Error::datetime(other.to_string(), format)),
    }
}
