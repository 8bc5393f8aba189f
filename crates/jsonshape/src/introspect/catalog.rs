// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process descriptor catalog.

use super::{CatalogError, CatalogFile, Introspector, TypeDefinition};
use crate::error::IntrospectError;
use crate::types::{AtomicKind, RawTypeId, TypeDescriptor, TypeExpr, TypeKey};
use crate::value::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// [`HashMap`]-backed [`Introspector`].
///
/// Comes preloaded with the atomic types (`string`, `int`, `long`, `double`,
/// `bool`), `List<T>`, `Array<T>`, `Map<K, V>` and the opaque `Class<T>` handle.
/// Populate it with [`define`](Self::define) before handing it to a registry.
#[derive(Debug, Clone)]
pub struct CatalogIntrospector {
    types: HashMap<RawTypeId, TypeDefinition>,
    /// Direct supertypes per raw type.
    supertypes: HashMap<RawTypeId, Vec<RawTypeId>>,
    builtins: HashSet<RawTypeId>,
}

impl Default for CatalogIntrospector {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogIntrospector {
    pub fn new() -> Self {
        let mut catalog = Self {
            types: HashMap::new(),
            supertypes: HashMap::new(),
            builtins: HashSet::new(),
        };
        for kind in AtomicKind::all() {
            catalog.insert_builtin(TypeDefinition::new(kind.name(), TypeDescriptor::Atomic(kind)));
        }
        let element = TypeExpr::param(0);
        catalog.insert_builtin(TypeDefinition::new(
            "List",
            TypeDescriptor::Collection(element.clone()),
        ));
        catalog.insert_builtin(TypeDefinition::new("Array", TypeDescriptor::Array(element)));
        catalog.insert_builtin(TypeDefinition::new(
            "Map",
            TypeDescriptor::Map {
                key: TypeExpr::param(0),
                value: TypeExpr::param(1),
            },
        ));
        catalog.insert_builtin(TypeDefinition::new("Class", TypeDescriptor::Opaque));
        catalog
    }

    /// Catalog with builtins plus every type declared in the file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = CatalogFile::from_path(path)?;
        let mut catalog = Self::new();
        file.register_into(&mut catalog)?;
        Ok(catalog)
    }

    fn insert_builtin(&mut self, definition: TypeDefinition) {
        self.builtins.insert(definition.raw.clone());
        self.types.insert(definition.raw.clone(), definition);
    }

    /// Add a type. Redefining an existing name (builtins included) is an error.
    pub fn define(&mut self, definition: TypeDefinition) -> Result<&mut Self, CatalogError> {
        if self.types.contains_key(&definition.raw) {
            return Err(CatalogError::Duplicate(definition.raw));
        }
        log::debug!("[catalog] defined {} ({})", definition.raw, definition.descriptor.kind());
        self.types.insert(definition.raw.clone(), definition);
        Ok(self)
    }

    /// Record that values of `sub` are also instances of `sup`.
    pub fn declare_subtype(
        &mut self,
        sub: impl Into<RawTypeId>,
        sup: impl Into<RawTypeId>,
    ) -> &mut Self {
        self.supertypes.entry(sub.into()).or_default().push(sup.into());
        self
    }

    pub fn contains(&self, raw: &RawTypeId) -> bool {
        self.types.contains_key(raw)
    }

    pub fn definition(&self, raw: &RawTypeId) -> Option<&TypeDefinition> {
        self.types.get(raw)
    }

    /// Number of non-builtin types.
    pub fn len(&self) -> usize {
        self.types.len() - self.builtins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-builtin type names, sorted.
    pub fn user_types(&self) -> Vec<RawTypeId> {
        let mut names: Vec<RawTypeId> = self
            .types
            .keys()
            .filter(|raw| !self.builtins.contains(*raw))
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Walk declared supertypes depth-first.
    fn is_subtype(&self, sub: &RawTypeId, sup: &RawTypeId) -> bool {
        let mut stack = vec![sub];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == sup {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(parents) = self.supertypes.get(current) {
                stack.extend(parents.iter());
            }
        }
        false
    }
}

impl Introspector for CatalogIntrospector {
    fn describe(&self, raw: &RawTypeId) -> Result<TypeDescriptor, IntrospectError> {
        self.types
            .get(raw)
            .map(|def| def.descriptor.clone())
            .ok_or_else(|| IntrospectError::UnknownType(raw.clone()))
    }

    fn is_instance(&self, value: &Value, key: &TypeKey) -> bool {
        value
            .runtime_type()
            .map(|runtime| self.is_subtype(runtime, key.raw()))
            .unwrap_or(false)
    }
}
