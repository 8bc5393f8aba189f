// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for the codec layer.
//!
//! Each failure kind has its own enum so callers can map them to transport
//! responses without string matching:
//!
//! - [`DecodeError`] - the JSON input does not fit the type
//! - [`EncodeError`] - the object graph breaks a registry invariant
//! - [`ConstructionError`] - a constructor or setter failed during decode
//! - [`UnsupportedTypeError`] - no codec can be built for a shape
//! - [`RegistryError`] / [`SchemaError`] - derivation and schema generation failures

use crate::types::{RawTypeId, TypeKey};
use thiserror::Error;

/// Boxed error returned by host constructors and accessors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure to construct (or finish populating) an instance during decode.
#[derive(Debug, Error)]
#[error("failed to construct {type_name}{}: {cause}", member_suffix(.member))]
pub struct ConstructionError {
    /// Type being constructed.
    pub type_name: String,
    /// Setter that failed, when the constructor itself succeeded.
    pub member: Option<String>,
    /// Original failure.
    #[source]
    pub cause: BoxError,
}

fn member_suffix(member: &Option<String>) -> String {
    member
        .as_ref()
        .map(|m| format!(" (setting `{}`)", m))
        .unwrap_or_default()
}

impl ConstructionError {
    pub fn new(key: &TypeKey, cause: BoxError) -> Self {
        Self {
            type_name: key.to_string(),
            member: None,
            cause,
        }
    }

    pub fn in_setter(key: &TypeKey, member: impl Into<String>, cause: BoxError) -> Self {
        Self {
            type_name: key.to_string(),
            member: Some(member.into()),
            cause,
        }
    }
}

/// A type shape the registry cannot build a codec for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported type {key}: {reason}")]
pub struct UnsupportedTypeError {
    pub key: TypeKey,
    pub reason: String,
}

impl UnsupportedTypeError {
    pub fn new(key: TypeKey, reason: impl Into<String>) -> Self {
        Self {
            key,
            reason: reason.into(),
        }
    }
}

/// JSON input that does not match the expected type.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("missing mandatory field {field} of {type_name}")]
    MissingField { type_name: String, field: String },

    #[error("unknown field {field} for {type_name}")]
    UnknownField { type_name: String, field: String },

    #[error("expected {expected}, found {found}")]
    UnexpectedKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("number {value} out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    #[error("unknown label {label:?}, expected one of {valid:?}")]
    UnknownEnumLabel { label: String, valid: Vec<String> },

    #[error("ambiguous or missing discriminator: found {found:?}, expected exactly one of {expected:?}")]
    Discriminator {
        found: Vec<String>,
        expected: Vec<String>,
    },

    #[error("value {value:?} is not a valid {format}")]
    InvalidFormat { format: String, value: String },

    #[error("map key type {key_type} is not string-backed")]
    UnsupportedKeyType { key_type: String },

    #[error("codec for {0} used before its derivation completed")]
    Unresolved(TypeKey),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error("{message}")]
    Custom { message: String },

    #[error("in field `{field}`: {source}")]
    AtField {
        field: String,
        #[source]
        source: Box<DecodeError>,
    },

    #[error("at index {index}: {source}")]
    AtIndex {
        index: usize,
        #[source]
        source: Box<DecodeError>,
    },

    #[error("at key {key:?}: {source}")]
    AtKey {
        key: String,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }

    pub fn unexpected(expected: &'static str, found: &serde_json::Value) -> Self {
        Self::UnexpectedKind {
            expected,
            found: json_kind(found),
        }
    }

    pub(crate) fn at_field(self, field: &str) -> Self {
        Self::AtField {
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn at_index(self, index: usize) -> Self {
        Self::AtIndex {
            index,
            source: Box::new(self),
        }
    }

    pub(crate) fn at_key(self, key: &str) -> Self {
        Self::AtKey {
            key: key.to_string(),
            source: Box::new(self),
        }
    }

    /// The error without its field/index/key context.
    pub fn root_cause(&self) -> &DecodeError {
        match self {
            Self::AtField { source, .. }
            | Self::AtIndex { source, .. }
            | Self::AtKey { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Dotted location of the failure, e.g. `items[2].name`.
    pub fn path(&self) -> String {
        let mut path = String::new();
        let mut current = self;
        loop {
            match current {
                Self::AtField { field, source } => {
                    if !path.is_empty() {
                        path.push('.');
                    }
                    path.push_str(field);
                    current = source;
                }
                Self::AtIndex { index, source } => {
                    path.push_str(&format!("[{}]", index));
                    current = source;
                }
                Self::AtKey { key, source } => {
                    path.push_str(&format!("[{:?}]", key));
                    current = source;
                }
                _ => return path,
            }
        }
    }
}

/// Object graph that cannot be encoded.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("null in mandatory property {field} of {type_name}")]
    NullMandatory { type_name: String, field: String },

    #[error("unsupported key type: {found}")]
    UnsupportedKeyType { found: String },

    #[error("duplicate map key {0:?}")]
    DuplicateKey(String),

    #[error("no mapping for concrete type {runtime} in {type_name}")]
    NoPolymorphicMapping { type_name: String, runtime: String },

    #[error("expected {expected}, found {found}")]
    UnexpectedValue { expected: String, found: String },

    #[error("{member} is not a member of {type_name}")]
    UnknownEnumMember { type_name: String, member: String },

    #[error("non-finite number {0} has no JSON representation")]
    NonFiniteNumber(f64),

    #[error("value {value:?} is not a valid {format}")]
    InvalidFormat { format: String, value: String },

    #[error("failed to read property {field}: {cause}")]
    Accessor {
        field: String,
        #[source]
        cause: BoxError,
    },

    #[error("codec for {0} used before its derivation completed")]
    Unresolved(TypeKey),

    #[error("{message}")]
    Custom { message: String },

    #[error("in field `{field}`: {source}")]
    AtField {
        field: String,
        #[source]
        source: Box<EncodeError>,
    },

    #[error("at index {index}: {source}")]
    AtIndex {
        index: usize,
        #[source]
        source: Box<EncodeError>,
    },
}

impl EncodeError {
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }

    pub fn unexpected(expected: impl Into<String>, found: &crate::value::Value) -> Self {
        Self::UnexpectedValue {
            expected: expected.into(),
            found: found.describe(),
        }
    }

    pub(crate) fn at_field(self, field: &str) -> Self {
        Self::AtField {
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn at_index(self, index: usize) -> Self {
        Self::AtIndex {
            index,
            source: Box::new(self),
        }
    }

    /// The error without its field/index context.
    pub fn root_cause(&self) -> &EncodeError {
        match self {
            Self::AtField { source, .. } | Self::AtIndex { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Failures while deriving codecs.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Unsupported(#[from] UnsupportedTypeError),

    #[error(transparent)]
    Introspection(#[from] IntrospectError),

    #[error("invalid descriptor for {key}: {reason}")]
    InvalidDescriptor { key: TypeKey, reason: String },

    #[error("type parameter #{index} is unbound ({arity} argument(s) supplied)")]
    UnboundParameter { index: usize, arity: usize },

    #[error("{0} was already resolved; custom codecs must be registered before first use")]
    AlreadyResolved(TypeKey),

    #[error("a codec factory for {0} is already registered or the type is in use")]
    FactoryConflict(RawTypeId),
}

impl RegistryError {
    pub(crate) fn invalid(key: &TypeKey, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            key: key.clone(),
            reason: reason.into(),
        }
    }
}

/// Failures reported by an [`Introspector`](crate::introspect::Introspector).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntrospectError {
    #[error("unknown type {0}")]
    UnknownType(RawTypeId),

    #[error("cannot describe {raw}: {reason}")]
    Invalid { raw: RawTypeId, reason: String },
}

/// Failures during schema generation.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error(transparent)]
    Unsupported(#[from] UnsupportedTypeError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("schema {0} was reserved but never completed")]
    Incomplete(String),

    #[error("codec for {0} is still being derived")]
    Unresolved(TypeKey),
}

/// Kind name of a JSON value, for error messages.
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
