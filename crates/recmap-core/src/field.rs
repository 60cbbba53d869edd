//! Field declarations
//!
//! A field describes how one named slot of a record type obtains its
//! raw value and whether blank or null results are acceptable. Fields
//! are built once at schema-collection time and shared, immutable,
//! across every record instance of the owning type.

use crate::record::Record;
use crate::schema::Method;
use recmap_value::{Datum, Raw, Value};
use std::sync::Arc;

/// Opaque error raised by a caller-supplied extraction function
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Extraction function taking the owning record and the raw source
pub type ExtractFn =
    Arc<dyn Fn(&Record, &dyn Raw) -> std::result::Result<Mapped, BoxError> + Send + Sync>;

/// Transform function additionally given the resolved raw datum
pub type TransformFn =
    Arc<dyn Fn(&Record, &dyn Raw, Datum) -> std::result::Result<Mapped, BoxError> + Send + Sync>;

/// Result of a field callable: a plain datum still subject to the
/// blank/null policy, or an already-boxed value that passes through
/// untouched with its caller-supplied status and message.
#[derive(Debug, Clone)]
pub enum Mapped {
    /// A plain datum to be boxed by the field's policy
    Raw(Datum),

    /// An already-boxed value, returned as is
    Boxed(Value),
}

impl Mapped {
    /// Wrap a plain datum
    pub fn raw(datum: impl Into<Datum>) -> Self {
        Mapped::Raw(datum.into())
    }

    /// Wrap an already-boxed value
    #[must_use]
    pub fn boxed(value: Value) -> Self {
        Mapped::Boxed(value)
    }
}

impl From<Datum> for Mapped {
    fn from(datum: Datum) -> Self {
        Mapped::Raw(datum)
    }
}

impl From<Value> for Mapped {
    fn from(value: Value) -> Self {
        Mapped::Boxed(value)
    }
}

/// How a plain [`Field`] obtains its raw value
#[derive(Clone, Default)]
pub enum Extractor {
    /// No extraction; the raw value is null
    #[default]
    None,

    /// A caller-supplied function
    Direct(ExtractFn),

    /// The name of a method registered on the owning schema
    Method(String),
}

/// How a [`KeyField`] post-processes its resolved raw datum
#[derive(Clone, Default)]
pub enum Transform {
    /// No post-processing; the resolved datum is used as is
    #[default]
    None,

    /// A caller-supplied function
    Direct(TransformFn),

    /// The name of a method registered on the owning schema
    Method(String),
}

/// Blank/null acceptance policy shared by all field shapes
#[derive(Debug, Clone, Copy)]
struct Policy {
    blank: bool,
    null: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            blank: true,
            null: true,
        }
    }
}

impl Policy {
    /// Box a callable result, applying the blank/null policy.
    ///
    /// Policy violations surface as Error-status values, never as hard
    /// failures; the rest of the record stays resolvable.
    fn treat(self, mapped: Mapped) -> Value {
        match mapped {
            Mapped::Boxed(value) => value,
            Mapped::Raw(datum) => {
                if !self.blank && datum.is_blank() {
                    Value::error("", "Value is not allowed to be blank")
                } else if !self.null && datum.is_null() {
                    Value::error(Datum::Null, "Value is not allowed to be null")
                } else {
                    Value::success(datum)
                }
            }
        }
    }
}

/// Object-safe seam implemented by every field shape
///
/// The schema's field registry stores fields behind this trait, so a
/// record type can mix plain, keyed, and choice fields freely.
pub trait FieldMap: Send + Sync {
    /// The field's resolved name, once assigned
    fn name(&self) -> Option<&str>;

    /// Assign the declaration name; the first assignment wins
    fn rename(&mut self, name: &str);

    /// Resolve this field against the owning record's raw source
    ///
    /// # Errors
    ///
    /// Returns an error when a caller-supplied callable fails or a
    /// method name cannot be resolved on the owning schema. Blank/null
    /// policy violations are reported inside the returned value, not
    /// as errors.
    fn map(&self, owner: &Record) -> crate::Result<Value>;
}

fn dispatch_extract(
    func: &Extractor,
    owner: &Record,
    label: &str,
) -> crate::Result<Mapped> {
    match func {
        Extractor::None => Ok(Mapped::Raw(Datum::Null)),
        Extractor::Direct(f) => {
            f(owner, owner.raw()).map_err(|source| crate::Error::func(label, source))
        }
        Extractor::Method(name) => match owner.schema().method(name) {
            Some(Method::Extract(f)) => {
                f(owner, owner.raw()).map_err(|source| crate::Error::func(label, source))
            }
            Some(Method::Transform(_)) => Err(crate::Error::method_kind(name, "extraction")),
            None => Err(crate::Error::unknown_method(name)),
        },
    }
}

fn dispatch_transform(
    func: &Transform,
    owner: &Record,
    datum: Datum,
    label: &str,
) -> crate::Result<Mapped> {
    match func {
        Transform::None => Ok(Mapped::Raw(datum)),
        Transform::Direct(f) => {
            f(owner, owner.raw(), datum).map_err(|source| crate::Error::func(label, source))
        }
        Transform::Method(name) => match owner.schema().method(name) {
            Some(Method::Transform(f)) => {
                f(owner, owner.raw(), datum).map_err(|source| crate::Error::func(label, source))
            }
            Some(Method::Extract(_)) => Err(crate::Error::method_kind(name, "transform")),
            None => Err(crate::Error::unknown_method(name)),
        },
    }
}

/// A plain mapper field
///
/// Without a function the raw value is null; with one, the function is
/// called with the owning record and its raw source.
#[derive(Clone, Default)]
pub struct Field {
    name: Option<String>,
    func: Extractor,
    policy: Policy,
}

impl Field {
    /// Create a field accepting blank and null values, with no function
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field name explicitly, overriding the declaration name
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Supply the extraction function
    #[must_use]
    pub fn func(
        mut self,
        f: impl Fn(&Record, &dyn Raw) -> std::result::Result<Mapped, BoxError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.func = Extractor::Direct(Arc::new(f));
        self
    }

    /// Extract through a named method on the owning schema
    #[must_use]
    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.func = Extractor::Method(name.into());
        self
    }

    /// Whether an empty string is an acceptable final value
    #[must_use]
    pub fn blank(mut self, blank: bool) -> Self {
        self.policy.blank = blank;
        self
    }

    /// Whether a null final value is acceptable
    #[must_use]
    pub fn null(mut self, null: bool) -> Self {
        self.policy.null = null;
        self
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

impl FieldMap for Field {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn rename(&mut self, name: &str) {
        if self.name.is_none() {
            self.name = Some(name.to_string());
        }
    }

    fn map(&self, owner: &Record) -> crate::Result<Value> {
        let mapped = dispatch_extract(&self.func, owner, self.label())?;
        Ok(self.policy.treat(mapped))
    }
}

/// A mapper field resolving its raw value through a keyed lookup
///
/// The key defaults to the field's declaration name. The optional
/// function post-processes the resolved datum before boxing.
#[derive(Clone, Default)]
pub struct KeyField {
    name: Option<String>,
    key: Option<String>,
    func: Transform,
    policy: Policy,
}

impl KeyField {
    /// Create a key field with no explicit key or function
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field name explicitly, overriding the declaration name
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the lookup key explicitly
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Supply the transform function
    #[must_use]
    pub fn func(
        mut self,
        f: impl Fn(&Record, &dyn Raw, Datum) -> std::result::Result<Mapped, BoxError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.func = Transform::Direct(Arc::new(f));
        self
    }

    /// Transform through a named method on the owning schema
    #[must_use]
    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.func = Transform::Method(name.into());
        self
    }

    /// Whether an empty string is an acceptable final value
    #[must_use]
    pub fn blank(mut self, blank: bool) -> Self {
        self.policy.blank = blank;
        self
    }

    /// Whether a null final value is acceptable
    #[must_use]
    pub fn null(mut self, null: bool) -> Self {
        self.policy.null = null;
        self
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    /// Pull the raw datum out of the source; a missing key is null
    fn resolve(&self, raw: &dyn Raw) -> Datum {
        self.key
            .as_deref()
            .and_then(|key| raw.get(key))
            .unwrap_or(Datum::Null)
    }

    fn apply(&self, owner: &Record, datum: Datum) -> crate::Result<Mapped> {
        dispatch_transform(&self.func, owner, datum, self.label())
    }
}

impl FieldMap for KeyField {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn rename(&mut self, name: &str) {
        if self.name.is_none() {
            self.name = Some(name.to_string());
        }
        // Declaration names double as default lookup keys.
        if self.key.is_none() {
            self.key = Some(name.to_string());
        }
    }

    fn map(&self, owner: &Record) -> crate::Result<Value> {
        let datum = self.resolve(owner.raw());
        let mapped = self.apply(owner, datum)?;
        Ok(self.policy.treat(mapped))
    }
}

/// A key field translating the resolved datum through a fixed choice
/// table before any caller-supplied transform runs
///
/// Values absent from the table translate to null.
#[derive(Clone, Default)]
pub struct ChoiceKeyField {
    inner: KeyField,
    choices: Vec<(Datum, Datum)>,
}

impl ChoiceKeyField {
    /// Create a choice field with an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field name explicitly, overriding the declaration name
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.inner = self.inner.named(name);
        self
    }

    /// Set the lookup key explicitly
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.inner = self.inner.key(key);
        self
    }

    /// Supply the choice table
    #[must_use]
    pub fn choices<F, T>(mut self, pairs: impl IntoIterator<Item = (F, T)>) -> Self
    where
        F: Into<Datum>,
        T: Into<Datum>,
    {
        self.choices
            .extend(pairs.into_iter().map(|(f, t)| (f.into(), t.into())));
        self
    }

    /// Supply the transform applied to the translated datum
    #[must_use]
    pub fn func(
        mut self,
        f: impl Fn(&Record, &dyn Raw, Datum) -> std::result::Result<Mapped, BoxError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.inner = self.inner.func(f);
        self
    }

    /// Transform through a named method on the owning schema
    #[must_use]
    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.inner = self.inner.method(name);
        self
    }

    /// Whether an empty string is an acceptable final value
    #[must_use]
    pub fn blank(mut self, blank: bool) -> Self {
        self.inner = self.inner.blank(blank);
        self
    }

    /// Whether a null final value is acceptable
    #[must_use]
    pub fn null(mut self, null: bool) -> Self {
        self.inner = self.inner.null(null);
        self
    }

    fn translate(&self, datum: &Datum) -> Datum {
        self.choices
            .iter()
            .find(|(from, _)| from == datum)
            .map_or(Datum::Null, |(_, to)| to.clone())
    }
}

impl FieldMap for ChoiceKeyField {
    fn name(&self) -> Option<&str> {
        self.inner.name()
    }

    fn rename(&mut self, name: &str) {
        self.inner.rename(name);
    }

    fn map(&self, owner: &Record) -> crate::Result<Value> {
        let datum = self.inner.resolve(owner.raw());
        let translated = self.translate(&datum);
        let mapped = self.inner.apply(owner, translated)?;
        Ok(self.inner.policy.treat(mapped))
    }
}
