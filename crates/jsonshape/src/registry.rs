// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec registry.
//!
//! Derives, caches and hands out one codec per [`TypeKey`].
//!
//! # Derivation discipline
//!
//! Derivation runs under a re-entrant lock. The first miss for a key stages a
//! pending [`CodecHandle`] before descending into nested types, so a type that
//! refers to itself (directly or through other types) receives the pending
//! handle instead of recursing forever. Staged handles are published to the
//! shared cache only once the outermost derivation succeeds. When the outermost
//! derivation fails, everything it staged is discarded.
//!
//! Concurrent first-time callers for the same key block on the lock, then find
//! the published handle. Cache hits never take the lock.

use crate::codec::{
    AtomicCodec, Codec, CodecHandle, CollectionCodec, ContainerKind, EnumCodec, MapCodec,
    ObjectCodec, PolymorphicCodec,
};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, UnsupportedTypeError};
use crate::introspect::Introspector;
use crate::schema::SchemaCollector;
use crate::types::{RawTypeId, TypeDescriptor, TypeKey};
use dashmap::DashMap;
use parking_lot::ReentrantMutex;
use std::cell::{RefCell, RefMut};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Builds codecs for every instantiation of one raw type, bypassing derivation.
pub trait CodecFactory: Send + Sync {
    fn create(
        &self,
        key: &TypeKey,
        registry: &CodecRegistry,
    ) -> Result<Arc<dyn Codec>, RegistryError>;
}

impl<F> CodecFactory for F
where
    F: Fn(&TypeKey, &CodecRegistry) -> Result<Arc<dyn Codec>, RegistryError> + Send + Sync,
{
    fn create(
        &self,
        key: &TypeKey,
        registry: &CodecRegistry,
    ) -> Result<Arc<dyn Codec>, RegistryError> {
        self(key, registry)
    }
}

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Lookups served from the cache (or a pending handle during recursion).
    pub hits: u64,
    /// Lookups that started a derivation.
    pub misses: u64,
    /// Codecs successfully built.
    pub derivations: u64,
    /// Descriptors fetched from the introspector.
    pub descriptors: u64,
}

#[derive(Default)]
struct DerivationState {
    depth: usize,
    staged: HashMap<TypeKey, CodecHandle>,
}

impl DerivationState {
    /// Drop the placeholder of a failed derivation. At the outermost level
    /// everything staged goes with it.
    fn discard(&mut self, key: &TypeKey) {
        if self.depth == 0 {
            self.staged.clear();
        } else {
            self.staged.remove(key);
        }
    }
}

/// One level of staged derivation. If the derivation unwinds before
/// [`finish`](Self::finish), dropping the guard restores the depth and
/// discards the placeholder, so a panicking introspector or factory cannot
/// leave a pending handle behind.
struct StagedDerivation<'a> {
    state: &'a RefCell<DerivationState>,
    key: TypeKey,
    finished: bool,
}

impl<'a> StagedDerivation<'a> {
    fn enter(state: &'a RefCell<DerivationState>, key: &TypeKey, handle: &CodecHandle) -> Self {
        {
            let mut state = state.borrow_mut();
            state.depth += 1;
            state.staged.insert(key.clone(), handle.clone());
        }
        Self {
            state,
            key: key.clone(),
            finished: false,
        }
    }

    /// Leave this level normally; the caller decides what happens to the placeholder.
    fn finish(&mut self) -> RefMut<'a, DerivationState> {
        self.finished = true;
        let mut state = self.state.borrow_mut();
        state.depth -= 1;
        state
    }
}

impl Drop for StagedDerivation<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.depth = state.depth.saturating_sub(1);
            state.discard(&self.key);
            log::warn!("[registry] derivation of {} unwound", self.key);
        }
    }
}

pub struct CodecRegistry {
    introspector: Arc<dyn Introspector>,
    config: RegistryConfig,
    always_raw: HashSet<RawTypeId>,
    codecs: DashMap<TypeKey, CodecHandle>,
    descriptors: DashMap<RawTypeId, Arc<TypeDescriptor>>,
    factories: DashMap<RawTypeId, Arc<dyn CodecFactory>>,
    derivation: ReentrantMutex<RefCell<DerivationState>>,
    hits: AtomicU64,
    misses: AtomicU64,
    derivations: AtomicU64,
    descriptor_loads: AtomicU64,
}

impl CodecRegistry {
    pub fn new(introspector: Arc<dyn Introspector>) -> Self {
        Self::with_config(introspector, RegistryConfig::default())
    }

    pub fn with_config(introspector: Arc<dyn Introspector>, config: RegistryConfig) -> Self {
        let always_raw = config
            .always_raw
            .iter()
            .map(|raw| RawTypeId::from(raw.as_str()))
            .collect();
        Self {
            introspector,
            config,
            always_raw,
            codecs: DashMap::new(),
            descriptors: DashMap::new(),
            factories: DashMap::new(),
            derivation: ReentrantMutex::new(RefCell::new(DerivationState::default())),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            derivations: AtomicU64::new(0),
            descriptor_loads: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn introspector(&self) -> &Arc<dyn Introspector> {
        &self.introspector
    }

    pub fn display_name(&self, raw: &RawTypeId) -> String {
        self.introspector.display_name(raw)
    }

    /// Key under which `key` is cached: always-raw types lose their arguments.
    pub fn canonical_key(&self, key: &TypeKey) -> TypeKey {
        if key.is_generic() && self.always_raw.contains(key.raw()) {
            key.erased()
        } else {
            key.clone()
        }
    }

    /// Codec for `key`, deriving it (and everything it references) on first use.
    pub fn get_codec(&self, key: &TypeKey) -> Result<CodecHandle, RegistryError> {
        let key = self.canonical_key(key);
        if let Some(handle) = self.published(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::trace!("[registry] hit {}", key);
            return Ok(handle);
        }

        let guard = self.derivation.lock();
        // Another thread may have published it while we waited; this thread
        // may also be deriving it further up the stack.
        let pending = guard.borrow().staged.get(&key).cloned();
        if let Some(handle) = pending.or_else(|| self.published(&key)) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(handle);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let handle = CodecHandle::pending(key.clone());
        let mut staged = StagedDerivation::enter(&guard, &key, &handle);

        let result = self.derive(&key);

        let mut state = staged.finish();
        match result {
            Ok(codec) => {
                handle.complete(codec);
                self.derivations.fetch_add(1, Ordering::Relaxed);
                log::debug!("[registry] derived {} ({:?})", key, handle.kind());
                if state.depth == 0 {
                    for (staged_key, staged) in state.staged.drain() {
                        if staged.is_resolved() {
                            self.codecs.insert(staged_key, staged);
                        } else {
                            log::warn!("[registry] dropping unresolved placeholder {}", staged_key);
                        }
                    }
                }
                Ok(handle)
            }
            Err(e) => {
                state.discard(&key);
                log::warn!("[registry] cannot derive {}: {}", key, e);
                Err(e)
            }
        }
    }

    fn published(&self, key: &TypeKey) -> Option<CodecHandle> {
        self.codecs.get(key).map(|entry| entry.value().clone())
    }

    /// Resolve `key` eagerly so unsupported shapes fail at startup.
    pub fn validate(&self, key: &TypeKey) -> Result<(), RegistryError> {
        self.get_codec(key).map(|_| ())
    }

    /// Resolve every key, stopping at the first failure.
    pub fn preload<'k, I>(&self, keys: I) -> Result<usize, RegistryError>
    where
        I: IntoIterator<Item = &'k TypeKey>,
    {
        let mut count = 0;
        for key in keys {
            self.validate(key)?;
            count += 1;
        }
        log::info!("[registry] preloaded {} type(s)", count);
        Ok(count)
    }

    /// Override derivation for exactly `key`. Must precede the first lookup of `key`.
    pub fn register_custom<C>(&self, key: TypeKey, codec: C) -> Result<(), RegistryError>
    where
        C: Codec + 'static,
    {
        self.register_custom_arc(key, Arc::new(codec))
    }

    pub fn register_custom_arc(
        &self,
        key: TypeKey,
        codec: Arc<dyn Codec>,
    ) -> Result<(), RegistryError> {
        let key = self.canonical_key(&key);
        let guard = self.derivation.lock();
        if guard.borrow().staged.contains_key(&key) || self.codecs.contains_key(&key) {
            return Err(RegistryError::AlreadyResolved(key));
        }
        log::debug!("[registry] custom codec for {} ({:?})", key, codec.kind());
        self.codecs
            .insert(key.clone(), CodecHandle::resolved(key, codec));
        Ok(())
    }

    /// Override derivation for every instantiation of `raw`.
    ///
    /// Fails if a factory is already registered or any key of `raw` was resolved.
    pub fn register_factory<F>(
        &self,
        raw: impl Into<RawTypeId>,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: CodecFactory + 'static,
    {
        let raw = raw.into();
        let guard = self.derivation.lock();
        let in_use = guard.borrow().staged.keys().any(|k| k.raw() == &raw)
            || self.codecs.iter().any(|entry| entry.key().raw() == &raw);
        if in_use || self.factories.contains_key(&raw) {
            return Err(RegistryError::FactoryConflict(raw));
        }
        log::debug!("[registry] codec factory for {}", raw);
        self.factories.insert(raw, Arc::new(factory));
        Ok(())
    }

    /// Descriptor of `raw`, fetched from the introspector once.
    pub fn descriptor(&self, raw: &RawTypeId) -> Result<Arc<TypeDescriptor>, RegistryError> {
        if let Some(desc) = self.descriptors.get(raw) {
            return Ok(desc.value().clone());
        }
        let desc = Arc::new(self.introspector.describe(raw)?);
        self.descriptor_loads.fetch_add(1, Ordering::Relaxed);
        log::debug!("[registry] described {} as {}", raw, desc.kind());
        Ok(self
            .descriptors
            .entry(raw.clone())
            .or_insert(desc)
            .value()
            .clone())
    }

    fn derive(&self, key: &TypeKey) -> Result<Arc<dyn Codec>, RegistryError> {
        let factory = self.factories.get(key.raw()).map(|f| f.value().clone());
        if let Some(factory) = factory {
            return factory.create(key, self);
        }

        let descriptor = self.descriptor(key.raw())?;
        let codec: Arc<dyn Codec> = match descriptor.as_ref() {
            TypeDescriptor::Atomic(kind) => Arc::new(AtomicCodec::new(*kind)),
            TypeDescriptor::Composable(desc) => Arc::new(ObjectCodec::build(key, desc, self)?),
            TypeDescriptor::Collection(element) => {
                let element = self.get_codec(&element.instantiate(key.args())?)?;
                Arc::new(CollectionCodec::new(ContainerKind::List, element))
            }
            TypeDescriptor::Array(element) => {
                let element = self.get_codec(&element.instantiate(key.args())?)?;
                Arc::new(CollectionCodec::new(ContainerKind::Array, element))
            }
            TypeDescriptor::Map {
                key: map_key,
                value,
            } => {
                let key_codec = self.get_codec(&map_key.instantiate(key.args())?)?;
                let value_codec = self.get_codec(&value.instantiate(key.args())?)?;
                Arc::new(MapCodec::new(key.clone(), key_codec, value_codec))
            }
            TypeDescriptor::Enum(desc) => Arc::new(EnumCodec::build(key, desc)?),
            TypeDescriptor::Polymorphic(desc) => {
                Arc::new(PolymorphicCodec::build(key, desc, self)?)
            }
            TypeDescriptor::Opaque => {
                return Err(UnsupportedTypeError::new(
                    key.clone(),
                    "opaque type needs a custom codec or factory",
                )
                .into())
            }
        };
        Ok(codec)
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            derivations: self.derivations.load(Ordering::Relaxed),
            descriptors: self.descriptor_loads.load(Ordering::Relaxed),
        }
    }

    /// Number of published codecs.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Fresh collector for one schema-generation pass.
    pub fn schema_collector(&self) -> SchemaCollector<'_> {
        SchemaCollector::new(self)
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("config", &self.config)
            .field("codecs", &self.codecs.len())
            .field("descriptors", &self.descriptors.len())
            .field("factories", &self.factories.len())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecKind, FormattedStringCodec};
    use crate::error::IntrospectError;
    use crate::introspect::{CatalogIntrospector, EnumBuilder, PropertySpec, RecordBuilder};
    use crate::value::{Object, Value};
    use serde_json::json;

    fn registry(catalog: CatalogIntrospector) -> CodecRegistry {
        CodecRegistry::new(Arc::new(catalog))
    }

    fn person_catalog() -> CatalogIntrospector {
        let mut catalog = CatalogIntrospector::new();
        catalog
            .define(
                RecordBuilder::new("Person")
                    .property(PropertySpec::slot("name", "string").mandatory())
                    .property(PropertySpec::slot("age", "int"))
                    .build()
                    .expect("person"),
            )
            .expect("define");
        catalog
    }

    #[test]
    fn test_cache_identity() {
        let registry = registry(person_catalog());
        let a = registry.get_codec(&"Person".into()).expect("person");
        let b = registry.get_codec(&TypeKey::parse("Person").expect("parse")).expect("person");
        assert!(a.same_slot(&b));

        let stats = registry.stats();
        // Person, string, int
        assert_eq!(stats.derivations, 3);
        assert_eq!(stats.misses, 3);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.descriptors, 3);
    }

    #[test]
    fn test_generic_instantiations_are_distinct() {
        let registry = registry(person_catalog());
        let strings = registry.get_codec(&TypeKey::parse("List<string>").expect("parse")).expect("list");
        let people = registry.get_codec(&TypeKey::parse("List<Person>").expect("parse")).expect("list");
        assert!(!strings.same_slot(&people));
        // List described once for both instantiations.
        assert_eq!(registry.stats().descriptors, 4);
    }

    #[test]
    fn test_always_raw_canonicalisation() {
        let registry = registry(person_catalog());
        registry
            .register_custom(TypeKey::simple("Class"), FormattedStringCodec::new("class-name"))
            .expect("register");
        let a = registry.get_codec(&TypeKey::parse("Class<Person>").expect("parse")).expect("class");
        let b = registry.get_codec(&TypeKey::parse("Class<string>").expect("parse")).expect("class");
        assert!(a.same_slot(&b));
        assert_eq!(a.key(), &TypeKey::simple("Class"));
    }

    #[test]
    fn test_opaque_without_custom_is_unsupported() {
        let registry = registry(person_catalog());
        let err = registry.get_codec(&"Class".into()).unwrap_err();
        assert!(matches!(err, RegistryError::Unsupported(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_type() {
        let registry = registry(person_catalog());
        assert!(matches!(
            registry.get_codec(&"Ghost".into()),
            Err(RegistryError::Introspection(IntrospectError::UnknownType(_)))
        ));
    }

    #[test]
    fn test_register_custom_after_use_fails() {
        let registry = registry(person_catalog());
        registry.validate(&"string".into()).expect("string");
        assert!(matches!(
            registry.register_custom("string".into(), FormattedStringCodec::new("x")),
            Err(RegistryError::AlreadyResolved(_))
        ));
    }

    #[test]
    fn test_custom_codec_overrides_derivation() {
        let registry = registry(person_catalog());
        registry
            .register_custom("Person".into(), FormattedStringCodec::new("person-ref"))
            .expect("register");
        let codec = registry.get_codec(&"Person".into()).expect("person");
        assert_eq!(codec.kind(), Some(CodecKind::Custom));
        assert_eq!(codec.encode(&Value::from("ann")).expect("encode"), json!("ann"));
        assert_eq!(registry.stats().derivations, 0);
    }

    #[test]
    fn test_factory_applies_to_every_instantiation() {
        let mut catalog = person_catalog();
        catalog
            .define(
                RecordBuilder::new("Ref")
                    .params(["T"])
                    .property(PropertySpec::slot("id", "string"))
                    .build()
                    .expect("ref"),
            )
            .expect("define");
        let registry = registry(catalog);
        registry
            .register_factory(
                "Ref",
                |key: &TypeKey, _: &CodecRegistry| -> Result<Arc<dyn Codec>, RegistryError> {
                    log::debug!("building ref codec for {}", key);
                    Ok(Arc::new(FormattedStringCodec::new("ref")))
                },
            )
            .expect("factory");

        let a = registry.get_codec(&TypeKey::parse("Ref<Person>").expect("parse")).expect("ref");
        let b = registry.get_codec(&TypeKey::parse("Ref<string>").expect("parse")).expect("ref");
        assert_eq!(a.kind(), Some(CodecKind::Custom));
        assert!(!a.same_slot(&b));

        assert!(matches!(
            registry.register_factory(
                "Ref",
                |_: &TypeKey, _: &CodecRegistry| -> Result<Arc<dyn Codec>, RegistryError> {
                    Err(RegistryError::FactoryConflict("Ref".into()))
                },
            ),
            Err(RegistryError::FactoryConflict(_))
        ));
    }

    #[test]
    fn test_failed_derivation_leaves_no_placeholders() {
        let mut catalog = CatalogIntrospector::new();
        catalog
            .define(
                RecordBuilder::new("Holder")
                    .property(PropertySpec::slot("inner", "Inner"))
                    .build()
                    .expect("holder"),
            )
            .expect("define");
        catalog
            .define(
                RecordBuilder::new("Inner")
                    .property(PropertySpec::slot("back", "Holder"))
                    .property(PropertySpec::slot("handle", "Class"))
                    .build()
                    .expect("inner"),
            )
            .expect("define");
        let registry = registry(catalog);

        assert!(registry.get_codec(&"Holder".into()).is_err());
        assert!(registry.codecs.get(&"Holder".into()).is_none());
        assert!(registry.codecs.get(&"Inner".into()).is_none());
        assert!(registry.derivation.lock().borrow().staged.is_empty());

        // Registering the missing piece afterwards makes the graph derivable.
        registry
            .register_custom("Class".into(), FormattedStringCodec::new("class-name"))
            .expect("register");
        let holder = registry.get_codec(&"Holder".into()).expect("holder");
        let json = json!({"inner": {"handle": "x", "back": {}}});
        let value = holder.decode(&json).expect("decode");
        let inner = value.as_object().expect("object").get("inner");
        assert_eq!(
            inner.as_object().map(|o| o.get("handle").clone()),
            Some(Value::from("x"))
        );
    }

    /// Panics the first time it is asked to describe `int`.
    struct PanicOnce {
        inner: CatalogIntrospector,
        tripped: std::sync::atomic::AtomicBool,
    }

    impl Introspector for PanicOnce {
        fn describe(&self, raw: &RawTypeId) -> Result<TypeDescriptor, IntrospectError> {
            if raw.as_str() == "int" && !self.tripped.swap(true, Ordering::SeqCst) {
                panic!("introspector failure for {}", raw);
            }
            self.inner.describe(raw)
        }
    }

    #[test]
    fn test_panicking_derivation_is_rolled_back() {
        let registry = CodecRegistry::new(Arc::new(PanicOnce {
            inner: person_catalog(),
            tripped: std::sync::atomic::AtomicBool::new(false),
        }));

        let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            registry.get_codec(&"Person".into())
        }));
        assert!(unwound.is_err());
        {
            let state = registry.derivation.lock();
            let state = state.borrow();
            assert_eq!(state.depth, 0);
            assert!(state.staged.is_empty());
        }
        assert!(registry.is_empty());

        let person = registry.get_codec(&"Person".into()).expect("person");
        assert!(person.is_resolved());
        let ann = Value::Object(Object::new("Person").with("name", "Ann").with("age", 7));
        assert_eq!(person.encode(&ann).expect("encode"), json!({"name": "Ann", "age": 7}));
        // Person, string and int are all published once derivation succeeds.
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_self_reference_resolves() {
        let mut catalog = CatalogIntrospector::new();
        catalog
            .define(
                RecordBuilder::new("Node")
                    .property(PropertySpec::slot("value", "int").mandatory())
                    .property(PropertySpec::slot("next", "Node"))
                    .build()
                    .expect("node"),
            )
            .expect("define");
        let registry = registry(catalog);
        let node = registry.get_codec(&"Node".into()).expect("node");

        let list = Value::Object(
            Object::new("Node")
                .with("value", 1)
                .with("next", Object::new("Node").with("value", 2)),
        );
        let encoded = node.encode(&list).expect("encode");
        assert_eq!(encoded, json!({"value": 1, "next": {"value": 2}}));
        assert_eq!(node.decode(&encoded).expect("decode"), list);
        assert_eq!(registry.stats().derivations, 2);
    }

    #[test]
    fn test_preload() {
        let mut catalog = person_catalog();
        catalog
            .define(EnumBuilder::new("Color").member("RED").build())
            .expect("define");
        let registry = registry(catalog);
        let keys = [TypeKey::simple("Person"), TypeKey::simple("Color")];
        assert_eq!(registry.preload(keys.iter()).expect("preload"), 2);
        let bad = [TypeKey::simple("Color"), TypeKey::simple("Class")];
        assert!(registry.preload(bad.iter()).is_err());
    }
}
