//! Record runtime
//!
//! A [`Record`] wraps one raw input payload together with its type's
//! [`Schema`] and resolves field values lazily: the first access to a
//! field runs its `map` against the raw source, boxes the result, and
//! caches it for the instance's lifetime until explicitly cleared or
//! overridden.

use crate::field::Mapped;
use crate::schema::Schema;
use recmap_value::{Datum, Patch, Raw, Status, Value};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// One record instance: raw payload plus lazily-resolved field values
///
/// The value cache is interior-mutable and exclusively owned by the
/// instance; sharing a record across threads requires external
/// synchronization by the caller. The schema itself is immutable and
/// freely shared.
pub struct Record {
    schema: Arc<Schema>,
    raw: Box<dyn Raw>,
    values: RefCell<HashMap<String, Value>>,
}

/// Detailed serialization of one resolved field value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detailed {
    /// The datum rendered as a string
    pub value: String,

    /// The extraction status
    pub status: Status,

    /// The diagnostic message, if any
    pub message: Option<String>,
}

/// Source a derived record is seeded from
///
/// Seeding from an existing record goes through its plain dictionary
/// representation: raw values only, statuses and messages are
/// deliberately not carried over.
pub trait Seed {
    /// Produce the flat name-to-datum map used as the new raw payload
    ///
    /// # Errors
    ///
    /// Returns an error when producing the map forces a field
    /// resolution that fails.
    fn seed(&self) -> crate::Result<BTreeMap<String, Datum>>;
}

impl Seed for Record {
    fn seed(&self) -> crate::Result<BTreeMap<String, Datum>> {
        self.as_dict()
    }
}

impl Seed for BTreeMap<String, Datum> {
    fn seed(&self) -> crate::Result<BTreeMap<String, Datum>> {
        Ok(self.clone())
    }
}

impl Record {
    /// Wrap a raw source record under the given schema
    pub fn new(schema: Arc<Schema>, raw: impl Raw + 'static) -> Self {
        Self {
            schema,
            raw: Box::new(raw),
            values: RefCell::new(HashMap::new()),
        }
    }

    /// Derive a new record of the given type from a seed source
    ///
    /// The seed's dictionary representation is copied, the overrides
    /// are applied on top, and the merged map becomes the new
    /// instance's raw payload.
    ///
    /// # Errors
    ///
    /// Returns an error when seeding from a record whose field
    /// resolution fails.
    pub fn renew<K, V>(
        schema: Arc<Schema>,
        source: &dyn Seed,
        overrides: impl IntoIterator<Item = (K, V)>,
    ) -> crate::Result<Self>
    where
        K: Into<String>,
        V: Into<Datum>,
    {
        let mut base = source.seed()?;
        for (name, datum) in overrides {
            base.insert(name.into(), datum.into());
        }
        Ok(Self::new(schema, base))
    }

    /// The record type's schema
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The raw source record this instance wraps
    #[must_use]
    pub fn raw(&self) -> &dyn Raw {
        self.raw.as_ref()
    }

    /// Check if a field is declared in the schema
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.schema.contains(name)
    }

    /// Read a field's unwrapped datum, resolving it if needed
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownField`] for undeclared names, or
    /// the failure of a caller-supplied extraction function.
    pub fn get(&self, name: &str) -> crate::Result<Datum> {
        Ok(self.getval(name)?.value().clone())
    }

    /// Read a field's boxed value, resolving and caching it if needed
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownField`] for undeclared names, or
    /// the failure of a caller-supplied extraction function.
    pub fn getval(&self, name: &str) -> crate::Result<Value> {
        if let Some(value) = self.values.borrow().get(name) {
            return Ok(value.clone());
        }

        let field = self
            .schema
            .field(name)
            .ok_or_else(|| crate::Error::unknown_field(name))?;

        tracing::debug!(schema = self.schema.name(), field = name, "resolving field");
        let value = field.map(self)?;
        self.values
            .borrow_mut()
            .insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Override a field's cached value
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownField`] for undeclared names.
    pub fn setval(&self, name: &str, value: impl Into<Mapped>) -> crate::Result<Value> {
        self.setval_with(name, value, Patch::new())
    }

    /// Override a field's cached value with explicit patches
    ///
    /// An already-boxed value keeps its own status, message, and a copy
    /// of its payload unless the patch overrides them; a plain datum is
    /// boxed fresh from the patch (status defaults to Success).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownField`] for undeclared names.
    pub fn setval_with(
        &self,
        name: &str,
        value: impl Into<Mapped>,
        patch: Patch,
    ) -> crate::Result<Value> {
        if !self.has(name) {
            return Err(crate::Error::unknown_field(name));
        }

        let value = match value.into() {
            Mapped::Boxed(boxed) => boxed.patched(&patch),
            Mapped::Raw(datum) => {
                let mut value = Value::new(
                    datum,
                    patch.status_or(Status::Success),
                    patch.message_or(None),
                );
                for (extra, datum) in patch.extras().iter() {
                    value = value.with_extra(extra, datum.clone());
                }
                value
            }
        };

        self.values
            .borrow_mut()
            .insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Clear a field's cached value; silently does nothing if the field
    /// was never resolved
    pub fn delval(&self, name: &str) {
        self.values.borrow_mut().remove(name);
    }

    /// Resolve and return every declared field's boxed value
    ///
    /// # Errors
    ///
    /// Returns the first resolution failure encountered.
    pub fn allvals(&self) -> crate::Result<BTreeMap<String, Value>> {
        let mut out = BTreeMap::new();
        for name in self.schema.field_names() {
            let value = self.getval(&name)?;
            out.insert(name, value);
        }
        Ok(out)
    }

    /// Check if the field's datum is null
    ///
    /// # Errors
    ///
    /// Fails as [`Record::getval`] does.
    pub fn val_none(&self, name: &str) -> crate::Result<bool> {
        Ok(self.getval(name)?.value().is_null())
    }

    /// Check if the field's datum is an empty string
    ///
    /// # Errors
    ///
    /// Fails as [`Record::getval`] does.
    pub fn val_blank(&self, name: &str) -> crate::Result<bool> {
        Ok(self.getval(name)?.value().is_blank())
    }

    /// Check if the field's datum is neither null nor blank
    ///
    /// # Errors
    ///
    /// Fails as [`Record::getval`] does.
    pub fn val_some(&self, name: &str) -> crate::Result<bool> {
        let value = self.getval(name)?;
        Ok(!value.value().is_null() && !value.value().is_blank())
    }

    /// Check if the field resolved successfully
    ///
    /// # Errors
    ///
    /// Fails as [`Record::getval`] does.
    pub fn val_success(&self, name: &str) -> crate::Result<bool> {
        Ok(self.getval(name)?.status() == Status::Success)
    }

    /// Check if the field resolved with a warning
    ///
    /// # Errors
    ///
    /// Fails as [`Record::getval`] does.
    pub fn val_warning(&self, name: &str) -> crate::Result<bool> {
        Ok(self.getval(name)?.status() == Status::Warning)
    }

    /// Check if the field failed to resolve
    ///
    /// # Errors
    ///
    /// Fails as [`Record::getval`] does.
    pub fn val_error(&self, name: &str) -> crate::Result<bool> {
        Ok(self.getval(name)?.status() == Status::Error)
    }

    /// Plain dictionary representation: field name to unwrapped datum,
    /// sorted by name, forcing resolution of every field
    ///
    /// # Errors
    ///
    /// Returns the first resolution failure encountered.
    pub fn as_dict(&self) -> crate::Result<BTreeMap<String, Datum>> {
        let mut out = BTreeMap::new();
        for name in self.schema.field_names() {
            let datum = self.get(&name)?;
            out.insert(name, datum);
        }
        Ok(out)
    }

    /// Detailed dictionary representation: field name to rendered
    /// value, status, and message, sorted by name
    ///
    /// # Errors
    ///
    /// Returns the first resolution failure encountered.
    pub fn as_dict_detailed(&self) -> crate::Result<BTreeMap<String, Detailed>> {
        let mut out = BTreeMap::new();
        for name in self.schema.field_names() {
            let value = self.getval(&name)?;
            out.insert(
                name,
                Detailed {
                    value: value.value().to_string(),
                    status: value.status(),
                    message: value.message().map(ToString::to_string),
                },
            );
        }
        Ok(out)
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("schema", &self.schema.name())
            .field("cached", &self.values.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}
