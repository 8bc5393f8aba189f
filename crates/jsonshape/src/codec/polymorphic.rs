// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec for polymorphic types.
//!
//! The wire form is a single-key wrapper object: `{"circle": {"radius": 2}}`.
//! Encode picks the first registered variant whose runtime-type check accepts
//! the value, so registration order matters when subtypes overlap.

use super::{Codec, CodecHandle, CodecKind};
use crate::error::{DecodeError, EncodeError, RegistryError, SchemaError};
use crate::introspect::Introspector;
use crate::registry::CodecRegistry;
use crate::schema::{JsonSchema, SchemaCollector};
use crate::types::{PolymorphicDescriptor, TypeKey};
use crate::value::Value;
use serde_json::Value as Json;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Variant {
    discriminator: String,
    target: TypeKey,
    codec: CodecHandle,
}

#[derive(Clone)]
pub struct PolymorphicCodec {
    key: TypeKey,
    variants: Vec<Variant>,
    introspector: Arc<dyn Introspector>,
}

impl PolymorphicCodec {
    pub fn build(
        key: &TypeKey,
        descriptor: &PolymorphicDescriptor,
        registry: &CodecRegistry,
    ) -> Result<Self, RegistryError> {
        if descriptor.variants.is_empty() {
            return Err(RegistryError::invalid(key, "polymorphic type without variants"));
        }
        let mut seen = HashSet::new();
        let mut variants = Vec::with_capacity(descriptor.variants.len());
        for variant in &descriptor.variants {
            if !seen.insert(variant.discriminator.as_str()) {
                return Err(RegistryError::invalid(
                    key,
                    format!("duplicate discriminator {:?}", variant.discriminator),
                ));
            }
            let target = variant.target.instantiate(key.args())?;
            let codec = registry.get_codec(&target)?;
            variants.push(Variant {
                discriminator: variant.discriminator.clone(),
                target,
                codec,
            });
        }
        Ok(Self {
            key: key.clone(),
            variants,
            introspector: registry.introspector().clone(),
        })
    }

    pub fn discriminators(&self) -> Vec<String> {
        self.variants
            .iter()
            .map(|v| v.discriminator.clone())
            .collect()
    }
}

impl fmt::Debug for PolymorphicCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolymorphicCodec")
            .field("key", &self.key.to_string())
            .field("variants", &self.variants)
            .finish_non_exhaustive()
    }
}

impl Codec for PolymorphicCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Polymorphic
    }

    fn encode(&self, value: &Value) -> Result<Json, EncodeError> {
        let variant = self
            .variants
            .iter()
            .find(|v| self.introspector.is_instance(value, &v.target))
            .ok_or_else(|| EncodeError::NoPolymorphicMapping {
                type_name: self.key.to_string(),
                runtime: value.describe(),
            })?;
        let inner = variant
            .codec
            .encode(value)
            .map_err(|e| e.at_field(&variant.discriminator))?;
        let mut out = serde_json::Map::new();
        out.insert(variant.discriminator.clone(), inner);
        Ok(Json::Object(out))
    }

    fn decode(&self, json: &Json) -> Result<Value, DecodeError> {
        let object = json
            .as_object()
            .ok_or_else(|| DecodeError::unexpected("object", json))?;
        let matches: Vec<&Variant> = self
            .variants
            .iter()
            .filter(|v| object.contains_key(&v.discriminator))
            .collect();
        let [variant] = matches.as_slice() else {
            return Err(DecodeError::Discriminator {
                found: matches.iter().map(|v| v.discriminator.clone()).collect(),
                expected: self.discriminators(),
            });
        };
        let inner = &object[&variant.discriminator];
        variant
            .codec
            .decode(inner)
            .map_err(|e| e.at_field(&variant.discriminator))
    }

    fn schema(&self, collector: &mut SchemaCollector<'_>) -> Result<JsonSchema, SchemaError> {
        let mut properties = BTreeMap::new();
        for variant in &self.variants {
            let fragment = collector.schema_for(&variant.target)?;
            properties.insert(variant.discriminator.clone(), fragment);
        }
        Ok(JsonSchema::object(properties, Vec::new()))
    }
}
