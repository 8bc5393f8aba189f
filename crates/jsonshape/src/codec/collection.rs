// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec for lists and fixed-size arrays.

use super::{Codec, CodecHandle, CodecKind};
use crate::error::{DecodeError, EncodeError, SchemaError};
use crate::schema::{JsonSchema, SchemaCollector};
use crate::value::Value;
use serde_json::Value as Json;

/// Container produced by decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    List,
    Array,
}

#[derive(Debug, Clone)]
pub struct CollectionCodec {
    container: ContainerKind,
    element: CodecHandle,
}

impl CollectionCodec {
    pub fn new(container: ContainerKind, element: CodecHandle) -> Self {
        Self { container, element }
    }

    pub fn container(&self) -> ContainerKind {
        self.container
    }
}

impl Codec for CollectionCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Collection
    }

    fn encode(&self, value: &Value) -> Result<Json, EncodeError> {
        let items = value
            .as_slice()
            .ok_or_else(|| EncodeError::unexpected("list or array", value))?;
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if item.is_null() {
                out.push(Json::Null);
                continue;
            }
            out.push(
                self.element
                    .encode(item)
                    .map_err(|e| e.at_index(index))?,
            );
        }
        Ok(Json::Array(out))
    }

    fn decode(&self, json: &Json) -> Result<Value, DecodeError> {
        let items = json
            .as_array()
            .ok_or_else(|| DecodeError::unexpected("array", json))?;
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if item.is_null() {
                out.push(Value::Null);
                continue;
            }
            out.push(
                self.element
                    .decode(item)
                    .map_err(|e| e.at_index(index))?,
            );
        }
        Ok(match self.container {
            ContainerKind::List => Value::List(out),
            ContainerKind::Array => Value::Array(out),
        })
    }

    fn schema(&self, collector: &mut SchemaCollector<'_>) -> Result<JsonSchema, SchemaError> {
        let items = collector.schema_for(self.element.key())?;
        Ok(JsonSchema::array(items))
    }
}
