// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec for string-keyed maps.
//!
//! Keys must be strings or string-backed enums. Other key types still get a
//! codec, but encoding fails per value and schema generation fails outright.

use super::{Codec, CodecHandle, CodecKind};
use crate::error::{DecodeError, EncodeError, SchemaError, UnsupportedTypeError};
use crate::schema::{JsonSchema, SchemaCollector};
use crate::types::TypeKey;
use crate::value::Value;
use serde_json::Value as Json;

#[derive(Debug, Clone)]
pub struct MapCodec {
    map_key: TypeKey,
    key: CodecHandle,
    value: CodecHandle,
}

impl MapCodec {
    pub fn new(map_key: TypeKey, key: CodecHandle, value: CodecHandle) -> Self {
        Self {
            map_key,
            key,
            value,
        }
    }

    fn encode_key(&self, key: &Value) -> Result<String, EncodeError> {
        if key.is_null() || !self.key.is_string_backed() {
            return Err(EncodeError::UnsupportedKeyType {
                found: format!("{} (declared {})", key.describe(), self.key.key()),
            });
        }
        match self.key.encode(key)? {
            Json::String(label) => Ok(label),
            other => Err(EncodeError::UnsupportedKeyType {
                found: format!("{} encoding to {}", self.key.key(), other),
            }),
        }
    }
}

impl Codec for MapCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Map
    }

    fn encode(&self, value: &Value) -> Result<Json, EncodeError> {
        let Value::Map(entries) = value else {
            return Err(EncodeError::unexpected("map", value));
        };
        let mut out = serde_json::Map::new();
        for (key, item) in entries {
            let label = self.encode_key(key)?;
            let encoded = if item.is_null() {
                Json::Null
            } else {
                self.value.encode(item).map_err(|e| e.at_field(&label))?
            };
            if out.insert(label.clone(), encoded).is_some() {
                return Err(EncodeError::DuplicateKey(label));
            }
        }
        Ok(Json::Object(out))
    }

    fn decode(&self, json: &Json) -> Result<Value, DecodeError> {
        let object = json
            .as_object()
            .ok_or_else(|| DecodeError::unexpected("object", json))?;
        if !self.key.is_string_backed() {
            return Err(DecodeError::UnsupportedKeyType {
                key_type: self.key.key().to_string(),
            });
        }
        let mut entries = Vec::with_capacity(object.len());
        for (label, item) in object {
            let key = self
                .key
                .decode(&Json::String(label.clone()))
                .map_err(|e| e.at_key(label))?;
            let value = if item.is_null() {
                Value::Null
            } else {
                self.value.decode(item).map_err(|e| e.at_key(label))?
            };
            entries.push((key, value));
        }
        Ok(Value::Map(entries))
    }

    fn schema(&self, collector: &mut SchemaCollector<'_>) -> Result<JsonSchema, SchemaError> {
        if !self.key.is_string_backed() {
            return Err(UnsupportedTypeError::new(
                self.map_key.clone(),
                format!(
                    "map key type {} is neither a string nor a string-backed enum",
                    self.key.key()
                ),
            )
            .into());
        }
        let values = collector.schema_for(self.value.key())?;
        Ok(JsonSchema::map(values))
    }
}
