// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Ready-made custom codecs for overriding derivation.
//!
//! Register them with [`CodecRegistry::register_custom`](crate::CodecRegistry::register_custom)
//! before the key is first resolved.

use super::{Codec, CodecKind};
use crate::error::{DecodeError, EncodeError, SchemaError};
use crate::schema::{JsonSchema, SchemaCollector, SchemaType};
use crate::value::Value;
use serde_json::Value as Json;
use std::fmt;
use std::sync::Arc;

/// String-backed scalar with a JSON-Schema `format` (identifiers, date-time, uuid...).
#[derive(Clone)]
pub struct FormattedStringCodec {
    format: String,
    validate: Option<fn(&str) -> bool>,
}

impl FormattedStringCodec {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            validate: None,
        }
    }

    /// Reject strings for which `validate` returns `false`, in both directions.
    pub fn with_validator(mut self, validate: fn(&str) -> bool) -> Self {
        self.validate = Some(validate);
        self
    }

    /// RFC 4122 textual UUID (8-4-4-4-12 hex digits).
    pub fn uuid() -> Self {
        Self::new("uuid").with_validator(is_uuid)
    }

    fn accepts(&self, s: &str) -> bool {
        self.validate.map(|v| v(s)).unwrap_or(true)
    }
}

fn is_uuid(s: &str) -> bool {
    let groups: Vec<&str> = s.split('-').collect();
    let lengths = [8, 4, 4, 4, 12];
    groups.len() == lengths.len()
        && groups
            .iter()
            .zip(lengths)
            .all(|(g, len)| g.len() == len && g.chars().all(|c| c.is_ascii_hexdigit()))
}

impl fmt::Debug for FormattedStringCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormattedStringCodec")
            .field("format", &self.format)
            .field("validated", &self.validate.is_some())
            .finish()
    }
}

impl Codec for FormattedStringCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Custom
    }

    fn encode(&self, value: &Value) -> Result<Json, EncodeError> {
        let s = value
            .as_str()
            .ok_or_else(|| EncodeError::unexpected(format!("{} string", self.format), value))?;
        if !self.accepts(s) {
            return Err(EncodeError::InvalidFormat {
                format: self.format.clone(),
                value: s.to_string(),
            });
        }
        Ok(Json::String(s.to_string()))
    }

    fn decode(&self, json: &Json) -> Result<Value, DecodeError> {
        let s = json
            .as_str()
            .ok_or_else(|| DecodeError::unexpected("string", json))?;
        if !self.accepts(s) {
            return Err(DecodeError::InvalidFormat {
                format: self.format.clone(),
                value: s.to_string(),
            });
        }
        Ok(Value::String(s.to_string()))
    }

    fn schema(&self, _collector: &mut SchemaCollector<'_>) -> Result<JsonSchema, SchemaError> {
        Ok(JsonSchema::formatted(SchemaType::String, self.format.clone()))
    }

    fn is_string_backed(&self) -> bool {
        true
    }
}

type EncodeFn = dyn Fn(&Value) -> Result<Json, EncodeError> + Send + Sync;
type DecodeFn = dyn Fn(&Json) -> Result<Value, DecodeError> + Send + Sync;

/// Closure-backed codec with a fixed schema fragment.
#[derive(Clone)]
pub struct FnCodec {
    encode: Arc<EncodeFn>,
    decode: Arc<DecodeFn>,
    schema: JsonSchema,
    string_backed: bool,
}

impl FnCodec {
    pub fn new<E, D>(schema: JsonSchema, encode: E, decode: D) -> Self
    where
        E: Fn(&Value) -> Result<Json, EncodeError> + Send + Sync + 'static,
        D: Fn(&Json) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        Self {
            encode: Arc::new(encode),
            decode: Arc::new(decode),
            schema,
            string_backed: false,
        }
    }

    /// Declare that every encoded value is a JSON string (usable as a map key).
    pub fn string_backed(mut self) -> Self {
        self.string_backed = true;
        self
    }
}

impl fmt::Debug for FnCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl Codec for FnCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Custom
    }

    fn encode(&self, value: &Value) -> Result<Json, EncodeError> {
        (self.encode)(value)
    }

    fn decode(&self, json: &Json) -> Result<Value, DecodeError> {
        (self.decode)(json)
    }

    fn schema(&self, _collector: &mut SchemaCollector<'_>) -> Result<JsonSchema, SchemaError> {
        Ok(self.schema.clone())
    }

    fn is_string_backed(&self) -> bool {
        self.string_backed
    }
}
