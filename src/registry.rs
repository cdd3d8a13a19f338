use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::catalog;
use crate::{DxfError, DxfResult, RecordSchema};

/// The process-wide catalog of record kinds.  Built once, frozen before any decode or encode
/// begins; lookups after that point are lock-free shared reads.
pub struct SchemaRegistry {
    schemas: IndexMap<&'static str, Arc<RecordSchema>>,
    frozen: bool,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        SchemaRegistry::new()
    }
}

impl SchemaRegistry {
    pub fn new() -> Self {
        SchemaRegistry {
            schemas: IndexMap::new(),
            frozen: false,
        }
    }
    /// A registry pre-loaded with the built-in record kinds, not yet frozen so callers may
    /// add their own kinds before freezing.
    pub fn with_builtin_catalog() -> DxfResult<Self> {
        let mut registry = SchemaRegistry::new();
        for schema in catalog::builtin_schemas() {
            registry.register(schema)?;
        }
        Ok(registry)
    }
    /// The shared, frozen built-in registry.
    pub fn builtin() -> &'static SchemaRegistry {
        static BUILTIN: Lazy<SchemaRegistry> = Lazy::new(|| {
            let mut registry = SchemaRegistry::with_builtin_catalog()
                .expect("the built-in catalog must validate");
            registry.freeze();
            registry
        });
        &BUILTIN
    }
    pub fn register(&mut self, schema: RecordSchema) -> DxfResult<()> {
        if self.frozen {
            return Err(DxfError::RegistryFrozen(String::from(schema.name)));
        }
        schema.validate()?;
        if self.schemas.contains_key(schema.name) {
            return Err(DxfError::InvalidSchema(format!(
                "the record kind '{}' is already registered",
                schema.name
            )));
        }
        self.schemas.insert(schema.name, Arc::new(schema));
        Ok(())
    }
    /// Marks the registry immutable.  Decoding and encoding expect a frozen registry; this is
    /// the serialization point for dynamic kind registration.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
    pub fn lookup(&self, kind_name: &str) -> Option<Arc<RecordSchema>> {
        self.schemas.get(kind_name).cloned()
    }
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().copied()
    }
}
