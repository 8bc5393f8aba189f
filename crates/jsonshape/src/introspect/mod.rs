// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type introspection.
//!
//! The registry never inspects host types itself. It asks an [`Introspector`]
//! for the [`TypeDescriptor`] of a raw type and for runtime-type checks during
//! polymorphic encoding.
//!
//! # Example
//!
//! ```rust
//! use jsonshape::introspect::{CatalogIntrospector, PropertySpec, RecordBuilder};
//!
//! let mut catalog = CatalogIntrospector::new();
//! catalog
//!     .define(
//!         RecordBuilder::new("Person")
//!             .property(PropertySpec::slot("name", "string").mandatory())
//!             .property(PropertySpec::slot("age", "int"))
//!             .build()?,
//!     )?;
//! assert!(catalog.contains(&"Person".into()));
//! # Ok::<(), jsonshape::introspect::CatalogError>(())
//! ```

mod builder;
mod catalog;
mod file;

pub use builder::{EnumBuilder, PolymorphicBuilder, PropertySpec, RecordBuilder, TypeDefinition};
pub use catalog::CatalogIntrospector;
pub use file::{BindingSpec, CatalogFile, EnumSpec, MemberEntry, PropertyEntry, RecordSpec, UnionSpec, VariantEntry};

use crate::error::IntrospectError;
use crate::types::{ParseTypeKeyError, RawTypeId, TypeDescriptor, TypeKey};
use crate::value::Value;
use thiserror::Error;

/// Source of type shapes for the registry.
///
/// Implementations must be deterministic: the registry caches the first
/// descriptor returned for a raw type for the rest of the process.
pub trait Introspector: Send + Sync {
    /// Shape of `raw`, with nested types expressed over its type parameters.
    fn describe(&self, raw: &RawTypeId) -> Result<TypeDescriptor, IntrospectError>;

    /// Whether `value`'s concrete type is `key` or one of its subtypes.
    fn is_instance(&self, value: &Value, key: &TypeKey) -> bool {
        value.runtime_type() == Some(key.raw())
    }

    /// Human-facing name used for schema names.
    fn display_name(&self, raw: &RawTypeId) -> String {
        raw.simple_name().to_string()
    }
}

/// Catalog definition and loading errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("type {0} is already defined")]
    Duplicate(RawTypeId),

    #[error("bad type {ty:?} in {owner}: {source}")]
    TypeSyntax {
        owner: String,
        ty: String,
        #[source]
        source: ParseTypeKeyError,
    },

    #[error("{owner}: {reason}")]
    Invalid { owner: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported catalog format {0:?} (expected .json or .toml)")]
    UnsupportedFormat(String),
}
