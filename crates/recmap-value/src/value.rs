//! Immutable boxed value
//!
//! A [`Value`] is the result of extracting one field from a raw record:
//! the datum itself, a [`Status`] tag, an optional diagnostic message,
//! and an open payload of extra named attributes. Once constructed a
//! value never changes; overrides build a new value via [`Value::patched`].

use crate::Datum;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Outcome status of a field extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Value was mapped successfully
    #[default]
    Success,

    /// Value was mapped, but with warnings
    Warning,

    /// Value could not be mapped
    Error,
}

/// Insertion-ordered payload of extra named attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    entries: Vec<(String, Datum)>,
}

impl Payload {
    /// Create an empty payload
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any existing entry with the same name
    /// in place
    pub fn insert(&mut self, name: impl Into<String>, datum: impl Into<Datum>) {
        let name = name.into();
        let datum = datum.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = datum;
        } else {
            self.entries.push((name, datum));
        }
    }

    /// Get an entry by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Datum> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    /// Check if an entry exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Datum)> {
        self.entries.iter().map(|(n, d)| (n.as_str(), d))
    }

    /// Merge another payload in; the other payload's entries win
    pub fn merge(&mut self, other: &Payload) {
        for (name, datum) in other.iter() {
            self.insert(name, datum.clone());
        }
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the payload is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Payload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, datum) in &self.entries {
            map.serialize_entry(name, datum)?;
        }
        map.end()
    }
}

/// Overrides applied when deriving one value from another
///
/// Fields left unset fall back to the original value's status and
/// message; extras are merged on top of the original payload.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    status: Option<Status>,
    message: Option<String>,
    extras: Payload,
}

impl Patch {
    /// Create an empty patch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the status
    #[must_use]
    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Override the message
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Add a payload entry
    #[must_use]
    pub fn extra(mut self, name: impl Into<String>, datum: impl Into<Datum>) -> Self {
        self.extras.insert(name, datum);
        self
    }

    /// The status this patch resolves to, given a fallback
    #[must_use]
    pub fn status_or(&self, fallback: Status) -> Status {
        self.status.unwrap_or(fallback)
    }

    /// The message this patch resolves to, given a fallback
    #[must_use]
    pub fn message_or(&self, fallback: Option<&str>) -> Option<String> {
        self.message
            .clone()
            .or_else(|| fallback.map(ToString::to_string))
    }

    /// The extra payload entries carried by this patch
    #[must_use]
    pub fn extras(&self) -> &Payload {
        &self.extras
    }
}

/// An immutable boxed field value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Value {
    value: Datum,
    status: Status,
    message: Option<String>,
    payload: Payload,
}

impl Value {
    /// Construct a value with an explicit status
    ///
    /// The [`Value::success`], [`Value::warning`] and [`Value::error`]
    /// constructors should be preferred where the status is fixed.
    #[must_use]
    pub fn new(value: impl Into<Datum>, status: Status, message: Option<String>) -> Self {
        Self {
            value: value.into(),
            status,
            message,
            payload: Payload::new(),
        }
    }

    /// Construct a successful value
    #[must_use]
    pub fn success(value: impl Into<Datum>) -> Self {
        Self::new(value, Status::Success, None)
    }

    /// Construct a value carrying a warning
    #[must_use]
    pub fn warning(value: impl Into<Datum>, message: impl Into<String>) -> Self {
        Self::new(value, Status::Warning, Some(message.into()))
    }

    /// Construct a failed value
    #[must_use]
    pub fn error(value: impl Into<Datum>, message: impl Into<String>) -> Self {
        Self::new(value, Status::Error, Some(message.into()))
    }

    /// Attach a payload entry; construction-time only
    #[must_use]
    pub fn with_extra(mut self, name: impl Into<String>, datum: impl Into<Datum>) -> Self {
        self.payload.insert(name, datum);
        self
    }

    /// The boxed datum
    #[must_use]
    pub fn value(&self) -> &Datum {
        &self.value
    }

    /// The extraction status
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// The diagnostic message, if any
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The extra payload attached at construction
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Look up a payload attribute by name
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownAttribute`] when the name is not a
    /// payload entry.
    pub fn attr(&self, name: &str) -> crate::Result<&Datum> {
        self.payload
            .get(name)
            .ok_or_else(|| crate::Error::unknown_attribute(name))
    }

    /// Build a new value from this one with the given overrides applied
    ///
    /// Status and message come from the patch when present, else from
    /// this value; the payload is a copy of this value's payload with
    /// the patch extras merged on top. The datum itself is kept.
    #[must_use]
    pub fn patched(&self, patch: &Patch) -> Value {
        let mut payload = self.payload.clone();
        payload.merge(patch.extras());
        Value {
            value: self.value.clone(),
            status: patch.status_or(self.status),
            message: patch.message_or(self.message()),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_defaults_to_success() {
        assert_eq!(Status::default(), Status::Success);
        let value = Value::new(42, Status::default(), None);
        assert_eq!(value.status(), Status::Success);
    }

    #[test]
    fn test_convenience_constructors() {
        let ok = Value::success(42);
        assert_eq!(ok.value(), &Datum::Integer(42));
        assert_eq!(ok.status(), Status::Success);
        assert!(ok.message().is_none());

        let warn = Value::warning("fortytwo", "failed to convert to integer");
        assert_eq!(warn.status(), Status::Warning);
        assert_eq!(warn.message(), Some("failed to convert to integer"));

        let err = Value::error(Datum::Null, "failed to compute the value");
        assert_eq!(err.status(), Status::Error);
        assert!(err.value().is_null());
    }

    #[test]
    fn test_payload_attribute_access() {
        let value = Value::success(42).with_extra("date", "2015-01-01");
        assert_eq!(
            value.attr("date").unwrap(),
            &Datum::String("2015-01-01".to_string())
        );

        let result = value.attr("missing");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("missing"));
    }

    #[test]
    fn test_payload_insertion_order() {
        let mut payload = Payload::new();
        payload.insert("b", 1);
        payload.insert("a", 2);
        payload.insert("b", 3);

        let names: Vec<&str> = payload.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(payload.get("b"), Some(&Datum::Integer(3)));
    }

    #[test]
    fn test_patched_keeps_original_fields() {
        let original = Value::error(Datum::Null, "bad input").with_extra("source", "file");
        let patched = original.patched(&Patch::new().status(Status::Success));

        assert_eq!(patched.status(), Status::Success);
        assert_eq!(patched.message(), Some("bad input"));
        assert_eq!(patched.attr("source").unwrap(), &Datum::String("file".to_string()));

        // original untouched
        assert_eq!(original.status(), Status::Error);
    }

    #[test]
    fn test_patched_merges_extras() {
        let original = Value::success(1).with_extra("a", 1).with_extra("b", 2);
        let patched = original.patched(&Patch::new().extra("b", 20).extra("c", 30));

        assert_eq!(patched.attr("a").unwrap(), &Datum::Integer(1));
        assert_eq!(patched.attr("b").unwrap(), &Datum::Integer(20));
        assert_eq!(patched.attr("c").unwrap(), &Datum::Integer(30));
    }
}
