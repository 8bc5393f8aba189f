// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec for primitive scalars.

use super::{Codec, CodecKind};
use crate::error::{DecodeError, EncodeError, SchemaError};
use crate::schema::{JsonSchema, SchemaCollector, SchemaType};
use crate::types::AtomicKind;
use crate::value::Value;
use serde_json::Value as Json;

#[derive(Debug, Clone, Copy)]
pub struct AtomicCodec {
    kind: AtomicKind,
}

impl AtomicCodec {
    pub fn new(kind: AtomicKind) -> Self {
        Self { kind }
    }

    pub fn atomic_kind(&self) -> AtomicKind {
        self.kind
    }
}

impl Codec for AtomicCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Atomic
    }

    fn encode(&self, value: &Value) -> Result<Json, EncodeError> {
        match (self.kind, value) {
            (AtomicKind::String, Value::String(s)) => Ok(Json::String(s.clone())),
            (AtomicKind::Bool, Value::Bool(b)) => Ok(Json::Bool(*b)),
            (AtomicKind::Int, Value::Int(i)) => Ok(Json::from(*i)),
            (AtomicKind::Long, Value::Int(i)) => Ok(Json::from(i64::from(*i))),
            (AtomicKind::Long, Value::Long(l)) => Ok(Json::from(*l)),
            (AtomicKind::Double, Value::Double(d)) => serde_json::Number::from_f64(*d)
                .map(Json::Number)
                .ok_or(EncodeError::NonFiniteNumber(*d)),
            (AtomicKind::Double, Value::Int(i)) => Ok(Json::from(f64::from(*i))),
            (AtomicKind::Double, Value::Long(l)) => Ok(Json::from(*l as f64)),
            (kind, other) => Err(EncodeError::unexpected(kind.name(), other)),
        }
    }

    fn decode(&self, json: &Json) -> Result<Value, DecodeError> {
        match self.kind {
            AtomicKind::String => json
                .as_str()
                .map(|s| Value::String(s.to_string()))
                .ok_or_else(|| DecodeError::unexpected("string", json)),
            AtomicKind::Bool => json
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| DecodeError::unexpected("boolean", json)),
            AtomicKind::Int => {
                let wide = integer(json)?;
                i32::try_from(wide)
                    .map(Value::Int)
                    .map_err(|_| DecodeError::OutOfRange {
                        value: wide.to_string(),
                        target: "int",
                    })
            }
            AtomicKind::Long => integer(json).map(Value::Long),
            AtomicKind::Double => json
                .as_f64()
                .map(Value::Double)
                .ok_or_else(|| DecodeError::unexpected("number", json)),
        }
    }

    fn schema(&self, _collector: &mut SchemaCollector<'_>) -> Result<JsonSchema, SchemaError> {
        Ok(match self.kind {
            AtomicKind::String => JsonSchema::of_type(SchemaType::String),
            AtomicKind::Bool => JsonSchema::of_type(SchemaType::Boolean),
            AtomicKind::Int => JsonSchema::formatted(SchemaType::Integer, "int32"),
            AtomicKind::Long => JsonSchema::formatted(SchemaType::Integer, "int64"),
            AtomicKind::Double => JsonSchema::formatted(SchemaType::Number, "double"),
        })
    }

    fn is_string_backed(&self) -> bool {
        self.kind == AtomicKind::String
    }
}

fn integer(json: &Json) -> Result<i64, DecodeError> {
    let Json::Number(n) = json else {
        return Err(DecodeError::unexpected("integer", json));
    };
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    if n.as_u64().is_some() {
        return Err(DecodeError::OutOfRange {
            value: n.to_string(),
            target: "long",
        });
    }
    // Integral floats such as `2.0` are accepted.
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(DecodeError::UnexpectedKind {
            expected: "integer",
            found: "fractional number",
        }),
    }
}
