// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # jsonshape - descriptor-driven JSON codecs and schemas
//!
//! Derives bidirectional JSON codecs and JSON-Schema fragments from type
//! descriptors supplied by an [`Introspector`]. Codecs are derived lazily, once
//! per [`TypeKey`], and cached for the lifetime of the [`CodecRegistry`].
//!
//! ## Quick Start
//!
//! ```rust
//! use jsonshape::introspect::{CatalogIntrospector, PropertySpec, RecordBuilder};
//! use jsonshape::{CodecRegistry, Object, TypeKey, Value};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut catalog = CatalogIntrospector::new();
//! catalog.define(
//!     RecordBuilder::new("Person")
//!         .property(PropertySpec::slot("name", "string").mandatory())
//!         .property(PropertySpec::slot("age", "int"))
//!         .build()?,
//! )?;
//!
//! let registry = CodecRegistry::new(Arc::new(catalog));
//! let codec = registry.get_codec(&TypeKey::simple("Person"))?;
//!
//! let ann = Value::Object(Object::new("Person").with("name", "Ann"));
//! assert_eq!(codec.encode_to_string(&ann)?, r#"{"name":"Ann"}"#);
//! assert_eq!(codec.decode_str(r#"{"name":"Ann"}"#)?, ann);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------------------------------+
//! |  SchemaCollector  (named schemas, $ref substitution, cycles)     |
//! +------------------------------------------------------------------+
//! |  Codec family     Object | Collection | Map | Enum | Polymorphic |
//! |                   Atomic | custom overrides                      |
//! +------------------------------------------------------------------+
//! |  CodecRegistry    per-TypeKey cache, forward-reference handles   |
//! +------------------------------------------------------------------+
//! |  Introspector     raw type -> TypeDescriptor (external)          |
//! +------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`types`] - type keys, descriptors, constructors and accessors
//! - [`introspect`] - the introspector contract and an in-process catalog
//! - [`codec`] - codec trait, handles and the built-in codecs
//! - [`schema`] - JSON-Schema fragments and the schema collector
//! - [`value`] - the host value model codecs operate on

/// Codec trait, forward-reference handles and built-in codecs.
pub mod codec;
/// Registry configuration (TOML).
pub mod config;
/// Error types.
pub mod error;
/// Introspector contract, catalog introspector and catalog files.
pub mod introspect;
/// Codec derivation and caching.
pub mod registry;
/// JSON-Schema fragments and schema collection.
pub mod schema;
/// Type identity and descriptors.
pub mod types;
/// Host value model.
pub mod value;

pub use codec::{Codec, CodecHandle, CodecKind, FnCodec, FormattedStringCodec};
pub use config::{ConfigError, RegistryConfig};
pub use error::{
    ConstructionError, DecodeError, EncodeError, IntrospectError, RegistryError, SchemaError,
    UnsupportedTypeError,
};
pub use introspect::{CatalogIntrospector, Introspector};
pub use registry::{CodecFactory, CodecRegistry, RegistryStats};
pub use schema::{JsonSchema, SchemaCollector, SchemaType};
pub use types::{RawTypeId, TypeDescriptor, TypeExpr, TypeKey};
pub use value::{EnumValue, Object, OpaqueValue, Value};
