//! Schema collection and the field registry
//!
//! A record type is declared once through [`SchemaBuilder`]: every
//! `.field(name, ..)` call captures a field declaration under its
//! declaration name, assigning that name to the field if it was not
//! named explicitly. `build` freezes the registry into an immutable
//! [`Schema`] shared by every record instance of the type.

use crate::field::{BoxError, ExtractFn, FieldMap, Mapped, TransformFn};
use crate::record::Record;
use recmap_value::{Datum, Raw};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A named function registered on a record type
///
/// This is how a field refers to "a method of the owning record": the
/// schema carries a registry of named functions, and a field declared
/// with `.method("name")` dispatches through it at map time.
#[derive(Clone)]
pub enum Method {
    /// Extraction form, for plain [`crate::Field`] declarations
    Extract(ExtractFn),

    /// Transform form, for [`crate::KeyField`] declarations
    Transform(TransformFn),
}

/// Immutable field registry attached to a record type
pub struct Schema {
    name: String,
    fields: BTreeMap<String, Arc<dyn FieldMap>>,
    methods: HashMap<String, Method>,
}

impl Schema {
    /// Start declaring a record type
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: BTreeMap::new(),
            inherited: BTreeMap::new(),
            methods: HashMap::new(),
            inherited_methods: HashMap::new(),
        }
    }

    /// The record type name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Arc<dyn FieldMap>> {
        self.fields.get(name)
    }

    /// Check if a field is declared
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// All declared field names, sorted
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// Get a registered method by name
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Number of declared fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no fields are declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.field_names())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder collecting field declarations into a [`Schema`]
pub struct SchemaBuilder {
    name: String,
    fields: BTreeMap<String, Box<dyn FieldMap>>,
    inherited: BTreeMap<String, Arc<dyn FieldMap>>,
    methods: HashMap<String, Method>,
    inherited_methods: HashMap<String, Method>,
}

impl SchemaBuilder {
    /// Declare a field under its declaration name
    ///
    /// The declaration name is assigned to the field here, exactly
    /// once; a field named explicitly keeps its own name. Re-declaring
    /// a name replaces the earlier declaration.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: impl FieldMap + 'static) -> Self {
        let name = name.into();
        let mut boxed: Box<dyn FieldMap> = Box::new(field);
        boxed.rename(&name);
        self.fields.insert(name, boxed);
        self
    }

    /// Register an extraction method under a name
    #[must_use]
    pub fn extract_method(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&Record, &dyn Raw) -> std::result::Result<Mapped, BoxError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.methods
            .insert(name.into(), Method::Extract(Arc::new(f)));
        self
    }

    /// Register a transform method under a name
    #[must_use]
    pub fn transform_method(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&Record, &dyn Raw, Datum) -> std::result::Result<Mapped, BoxError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.methods
            .insert(name.into(), Method::Transform(Arc::new(f)));
        self
    }

    /// Inherit the fields and methods of a base record type
    ///
    /// Inherited fields fill the gaps; declarations on this builder win
    /// on name collisions. Inherited field instances are shared with
    /// the parent type, which is safe since they are immutable after
    /// collection.
    #[must_use]
    pub fn extends(mut self, parent: &Schema) -> Self {
        for (name, field) in &parent.fields {
            self.inherited.insert(name.clone(), field.clone());
        }
        for (name, method) in &parent.methods {
            self.inherited_methods.insert(name.clone(), method.clone());
        }
        self
    }

    /// Freeze the collected declarations into an immutable schema
    #[must_use]
    pub fn build(self) -> Arc<Schema> {
        let mut fields = self.inherited;
        for (name, field) in self.fields {
            fields.insert(name, Arc::from(field));
        }

        let mut methods = self.inherited_methods;
        methods.extend(self.methods);

        tracing::debug!(
            schema = %self.name,
            fields = fields.len(),
            "collected record schema"
        );

        Arc::new(Schema {
            name: self.name,
            fields,
            methods,
        })
    }
}
