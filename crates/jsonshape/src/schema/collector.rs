// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema dictionary for one generation pass.
//!
//! Named kinds (objects and polymorphic wrappers) are extracted into the
//! dictionary and referenced by `$ref`. The name is reserved before the body is
//! generated, so a type that reaches itself again finds the reservation and
//! gets a reference back instead of recursing.
//!
//! A collector is single-threaded; create one per pass with
//! [`CodecRegistry::schema_collector`](crate::CodecRegistry::schema_collector).

use super::JsonSchema;
use crate::error::SchemaError;
use crate::registry::CodecRegistry;
use crate::types::TypeKey;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug)]
enum Slot {
    Reserved,
    Filled(JsonSchema),
}

#[derive(Debug)]
pub struct SchemaCollector<'r> {
    registry: &'r CodecRegistry,
    prefix: String,
    schemas: BTreeMap<String, Slot>,
    names: HashMap<TypeKey, String>,
    taken: HashSet<String>,
}

impl<'r> SchemaCollector<'r> {
    /// Collector using the registry's configured `$ref` prefix.
    pub fn new(registry: &'r CodecRegistry) -> Self {
        Self {
            registry,
            prefix: registry.config().schema_ref_prefix.clone(),
            schemas: BTreeMap::new(),
            names: HashMap::new(),
            taken: HashSet::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn registry(&self) -> &'r CodecRegistry {
        self.registry
    }

    /// Schema fragment for `key`: inline for unnamed kinds, `$ref` otherwise.
    pub fn schema_for(&mut self, key: &TypeKey) -> Result<JsonSchema, SchemaError> {
        let handle = self.registry.get_codec(key)?;
        let codec = handle
            .codec()
            .cloned()
            .ok_or_else(|| SchemaError::Unresolved(handle.key().clone()))?;
        if !codec.kind().is_standalone_named() {
            return codec.schema(self);
        }

        let key = handle.key();
        if let Some(name) = self.names.get(key) {
            return Ok(self.reference(name));
        }

        let name = self.allocate_name(key);
        self.names.insert(key.clone(), name.clone());
        self.schemas.insert(name.clone(), Slot::Reserved);
        log::debug!("[schema] reserved {} for {}", name, key);

        let body = codec.schema(self)?;
        self.schemas.insert(name.clone(), Slot::Filled(body));
        Ok(self.reference(&name))
    }

    /// Alias of [`schema_for`](Self::schema_for).
    pub fn generate(&mut self, key: &TypeKey) -> Result<JsonSchema, SchemaError> {
        self.schema_for(key)
    }

    fn reference(&self, name: &str) -> JsonSchema {
        JsonSchema::reference(format!("{}{}", self.prefix, name))
    }

    /// `Page<List<Person>>` becomes `Page_List_Person`; clashes get `_2`, `_3`...
    fn allocate_name(&mut self, key: &TypeKey) -> String {
        let base = self.base_name(key);
        let mut name = base.clone();
        let mut suffix = 2;
        while !self.taken.insert(name.clone()) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        name
    }

    fn base_name(&self, key: &TypeKey) -> String {
        let mut name = self.registry.display_name(key.raw());
        for arg in key.args() {
            name.push('_');
            name.push_str(&self.base_name(arg));
        }
        name
    }

    /// Name assigned to `key` in this pass, if it was extracted.
    pub fn schema_name(&self, key: &TypeKey) -> Option<&str> {
        self.names
            .get(&self.registry.canonical_key(key))
            .map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&JsonSchema> {
        match self.schemas.get(name) {
            Some(Slot::Filled(schema)) => Some(schema),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// The completed dictionary. Fails if a reservation was never filled,
    /// which only happens when an earlier `schema_for` returned an error.
    pub fn into_schemas(self) -> Result<BTreeMap<String, JsonSchema>, SchemaError> {
        self.schemas
            .into_iter()
            .map(|(name, slot)| match slot {
                Slot::Filled(schema) => Ok((name, schema)),
                Slot::Reserved => Err(SchemaError::Incomplete(name)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{CatalogIntrospector, PropertySpec, RecordBuilder};
    use serde_json::json;
    use std::sync::Arc;

    fn catalog() -> CatalogIntrospector {
        let mut catalog = CatalogIntrospector::new();
        catalog
            .define(
                RecordBuilder::new("acme.Person")
                    .property(PropertySpec::slot("name", "string").mandatory())
                    .build()
                    .expect("person"),
            )
            .expect("define");
        catalog
            .define(
                RecordBuilder::new("other.Person")
                    .property(PropertySpec::slot("id", "long"))
                    .build()
                    .expect("person"),
            )
            .expect("define");
        catalog
            .define(
                RecordBuilder::new("Page")
                    .params(["T"])
                    .property(PropertySpec::slot("items", "List<T>").mandatory())
                    .build()
                    .expect("page"),
            )
            .expect("define");
        catalog
    }

    #[test]
    fn test_generic_schema_name() {
        let registry = CodecRegistry::new(Arc::new(catalog()));
        let mut collector = registry.schema_collector();
        let key = TypeKey::parse("Page<acme.Person>").expect("parse");
        let root = collector.schema_for(&key).expect("schema");

        assert_eq!(root.to_json(), json!({"$ref": "#/components/schemas/Page_Person"}));
        assert_eq!(collector.schema_name(&key), Some("Page_Person"));
        let page = collector.get("Page_Person").expect("page");
        assert_eq!(
            page.to_json(),
            json!({
                "type": "object",
                "properties": {
                    "items": {"type": "array", "items": {"$ref": "#/components/schemas/Person"}}
                },
                "required": ["items"]
            })
        );
    }

    #[test]
    fn test_name_collisions_are_suffixed() {
        let registry = CodecRegistry::new(Arc::new(catalog()));
        let mut collector = registry.schema_collector().with_prefix("#/definitions/");
        let a = collector.schema_for(&"acme.Person".into()).expect("a");
        let b = collector.schema_for(&"other.Person".into()).expect("b");
        let again = collector.schema_for(&"acme.Person".into()).expect("again");

        assert_eq!(a.reference.as_deref(), Some("#/definitions/Person"));
        assert_eq!(b.reference.as_deref(), Some("#/definitions/Person_2"));
        assert_eq!(again, a);
        let schemas = collector.into_schemas().expect("complete");
        assert_eq!(schemas.keys().collect::<Vec<_>>(), vec!["Person", "Person_2"]);
    }

    #[test]
    fn test_inline_kinds_not_extracted() {
        let registry = CodecRegistry::new(Arc::new(catalog()));
        let mut collector = registry.schema_collector();
        let schema = collector
            .schema_for(&TypeKey::parse("Map<string, List<long>>").expect("parse"))
            .expect("schema");
        assert_eq!(
            schema.to_json(),
            json!({
                "type": "object",
                "additionalProperties": {"type": "array", "items": {"type": "integer", "format": "int64"}}
            })
        );
        assert!(collector.is_empty());
    }
}
