//! Loosely-typed scalar datum
//!
//! Raw input records and normalized field values are both expressed as
//! [`Datum`] instances, so extraction callables can stay agnostic about
//! where a value came from.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Scalar values that can flow through field mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Datum {
    /// String value
    String(String),

    /// Integer value
    Integer(i64),

    /// Decimal value
    Decimal(f64),

    /// Boolean value
    Boolean(bool),

    /// Calendar date
    Date(NaiveDate),

    /// Time of day
    Time(NaiveTime),

    /// Date and time
    DateTime(NaiveDateTime),

    /// Null/absent value
    Null,
}

impl Datum {
    /// Convert the datum to its string form
    #[must_use]
    pub fn as_string(&self) -> Option<String> {
        match self {
            Datum::String(s) => Some(s.clone()),
            Datum::Integer(i) => Some(i.to_string()),
            Datum::Decimal(d) => Some(d.to_string()),
            Datum::Boolean(b) => Some(b.to_string()),
            Datum::Date(d) => Some(d.to_string()),
            Datum::Time(t) => Some(t.to_string()),
            Datum::DateTime(dt) => Some(dt.to_string()),
            Datum::Null => None,
        }
    }

    /// Check if the datum is null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    /// Check if the datum is an empty string
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Datum::String(s) if s.is_empty())
    }
}

impl Default for Datum {
    fn default() -> Self {
        Datum::Null
    }
}

impl std::fmt::Display for Datum {
    /// Renders `Null` as the empty string; everything else through the
    /// underlying type's display form.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Datum::String(s) => write!(f, "{s}"),
            Datum::Integer(i) => write!(f, "{i}"),
            Datum::Decimal(d) => write!(f, "{d}"),
            Datum::Boolean(b) => write!(f, "{b}"),
            Datum::Date(d) => write!(f, "{d}"),
            Datum::Time(t) => write!(f, "{t}"),
            Datum::DateTime(dt) => write!(f, "{dt}"),
            Datum::Null => Ok(()),
        }
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::String(s.to_string())
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::String(s)
    }
}

impl From<i64> for Datum {
    fn from(i: i64) -> Self {
        Datum::Integer(i)
    }
}

impl From<f64> for Datum {
    fn from(d: f64) -> Self {
        Datum::Decimal(d)
    }
}

impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Datum::Boolean(b)
    }
}

impl From<NaiveDate> for Datum {
    fn from(d: NaiveDate) -> Self {
        Datum::Date(d)
    }
}

impl From<NaiveTime> for Datum {
    fn from(t: NaiveTime) -> Self {
        Datum::Time(t)
    }
}

impl From<NaiveDateTime> for Datum {
    fn from(dt: NaiveDateTime) -> Self {
        Datum::DateTime(dt)
    }
}

impl<T> From<Option<T>> for Datum
where
    T: Into<Datum>,
{
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Datum::Null, Into::into)
    }
}

impl From<serde_json::Value> for Datum {
    /// Ingest a JSON scalar. Integral numbers become `Integer`, other
    /// numbers `Decimal`; arrays and objects are kept as their JSON text.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Datum::Null,
            serde_json::Value::Bool(b) => Datum::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Datum::Integer(i)
                } else {
                    Datum::Decimal(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Datum::String(s),
            other => Datum::String(other.to_string()),
        }
    }
}
