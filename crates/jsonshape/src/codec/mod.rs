// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON codecs derived from type descriptors.
//!
//! # Features
//!
//! - **AtomicCodec**: strings, 32/64-bit integers, doubles and booleans
//! - **ObjectCodec**: constructor slots plus getter/setter properties
//! - **CollectionCodec** / **MapCodec**: lists, arrays and string-keyed maps
//! - **EnumCodec**: members mapped to external labels
//! - **PolymorphicCodec**: single-key discriminated wrappers
//! - **Custom codecs**: [`FormattedStringCodec`], [`FnCodec`] or any [`Codec`] impl
//!
//! Codecs never hold each other directly; nested references go through
//! [`CodecHandle`], a slot that the registry completes once derivation of the
//! referenced key finishes. That indirection is what lets a type refer to itself.

mod atomic;
mod collection;
mod custom;
mod enumeration;
mod map;
mod object;
mod polymorphic;

pub use atomic::AtomicCodec;
pub use collection::{CollectionCodec, ContainerKind};
pub use custom::{FnCodec, FormattedStringCodec};
pub use enumeration::EnumCodec;
pub use map::MapCodec;
pub use object::ObjectCodec;
pub use polymorphic::PolymorphicCodec;

use crate::error::{DecodeError, EncodeError, SchemaError};
use crate::schema::{JsonSchema, SchemaCollector};
use crate::types::TypeKey;
use crate::value::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Which builder produced a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecKind {
    Atomic,
    Object,
    Collection,
    Map,
    Enum,
    Polymorphic,
    Custom,
}

impl CodecKind {
    /// Whether schemas of this kind are extracted into the shared dictionary.
    pub fn is_standalone_named(&self) -> bool {
        matches!(self, Self::Object | Self::Polymorphic)
    }
}

/// Bidirectional JSON codec plus schema generator for one type key.
///
/// Implementations are immutable once built and shared across threads.
pub trait Codec: Send + Sync + fmt::Debug {
    fn kind(&self) -> CodecKind;

    fn encode(&self, value: &Value) -> Result<serde_json::Value, EncodeError>;

    fn decode(&self, json: &serde_json::Value) -> Result<Value, DecodeError>;

    /// Schema body. Nested types must be resolved through the collector so that
    /// named schemas are extracted and cycles broken.
    fn schema(&self, collector: &mut SchemaCollector<'_>) -> Result<JsonSchema, SchemaError>;

    /// Whether values encode to JSON strings and can therefore key a JSON object.
    fn is_string_backed(&self) -> bool {
        false
    }
}

/// Shared, lazily-completed reference to the codec of a type key.
///
/// Handles for equal keys obtained from one registry share the same slot.
#[derive(Clone)]
pub struct CodecHandle {
    key: TypeKey,
    slot: Arc<OnceLock<Arc<dyn Codec>>>,
}

impl CodecHandle {
    pub(crate) fn pending(key: TypeKey) -> Self {
        Self {
            key,
            slot: Arc::new(OnceLock::new()),
        }
    }

    pub(crate) fn resolved(key: TypeKey, codec: Arc<dyn Codec>) -> Self {
        let handle = Self::pending(key);
        let _ = handle.slot.set(codec);
        handle
    }

    /// Fill the slot; returns `false` if it was already filled.
    pub(crate) fn complete(&self, codec: Arc<dyn Codec>) -> bool {
        self.slot.set(codec).is_ok()
    }

    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn codec(&self) -> Option<&Arc<dyn Codec>> {
        self.slot.get()
    }

    /// Whether both handles point at the same slot.
    pub fn same_slot(&self, other: &CodecHandle) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    pub fn kind(&self) -> Option<CodecKind> {
        self.codec().map(|c| c.kind())
    }

    pub fn encode(&self, value: &Value) -> Result<serde_json::Value, EncodeError> {
        self.codec()
            .ok_or_else(|| EncodeError::Unresolved(self.key.clone()))?
            .encode(value)
    }

    pub fn decode(&self, json: &serde_json::Value) -> Result<Value, DecodeError> {
        self.codec()
            .ok_or_else(|| DecodeError::Unresolved(self.key.clone()))?
            .decode(json)
    }

    /// Encode and serialize to a JSON string.
    pub fn encode_to_string(&self, value: &Value) -> Result<String, EncodeError> {
        let json = self.encode(value)?;
        Ok(json.to_string())
    }

    /// Parse a JSON document and decode it.
    pub fn decode_str(&self, input: &str) -> Result<Value, DecodeError> {
        let json: serde_json::Value = serde_json::from_str(input)
            .map_err(|e| DecodeError::custom(format!("malformed JSON: {}", e)))?;
        self.decode(&json)
    }

    pub fn is_string_backed(&self) -> bool {
        self.codec().map(|c| c.is_string_backed()).unwrap_or(false)
    }
}

impl fmt::Debug for CodecHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecHandle")
            .field("key", &self.key.to_string())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[cfg(test)]
mod tests;
