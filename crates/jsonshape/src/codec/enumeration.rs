// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec mapping enum members to external string labels.

use super::{Codec, CodecKind};
use crate::error::{DecodeError, EncodeError, RegistryError, SchemaError};
use crate::schema::{JsonSchema, SchemaCollector};
use crate::types::{EnumDescriptor, RawTypeId, TypeKey};
use crate::value::{EnumValue, Value};
use serde_json::Value as Json;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct EnumCodec {
    type_id: RawTypeId,
    /// `(identifier, label)` in declaration order.
    members: Vec<(Arc<str>, String)>,
}

impl EnumCodec {
    pub fn build(key: &TypeKey, descriptor: &EnumDescriptor) -> Result<Self, RegistryError> {
        let mut idents = HashSet::new();
        let mut labels = HashSet::new();
        for member in &descriptor.members {
            if !idents.insert(member.ident.as_str()) {
                return Err(RegistryError::invalid(
                    key,
                    format!("duplicate enum member {}", member.ident),
                ));
            }
            if !labels.insert(member.label()) {
                return Err(RegistryError::invalid(
                    key,
                    format!("duplicate enum label {:?}", member.label()),
                ));
            }
        }
        Ok(Self {
            type_id: key.raw().clone(),
            members: descriptor
                .members
                .iter()
                .map(|m| (Arc::from(m.ident.as_str()), m.label().to_string()))
                .collect(),
        })
    }

    pub fn labels(&self) -> Vec<String> {
        self.members.iter().map(|(_, label)| label.clone()).collect()
    }
}

impl Codec for EnumCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Enum
    }

    fn encode(&self, value: &Value) -> Result<Json, EncodeError> {
        let member = match value {
            Value::Enum(e) if e.type_id == self.type_id => e,
            other => return Err(EncodeError::unexpected(format!("enum {}", self.type_id), other)),
        };
        self.members
            .iter()
            .find(|(ident, _)| *ident == member.member)
            .map(|(_, label)| Json::String(label.clone()))
            .ok_or_else(|| EncodeError::UnknownEnumMember {
                type_name: self.type_id.to_string(),
                member: member.member.to_string(),
            })
    }

    fn decode(&self, json: &Json) -> Result<Value, DecodeError> {
        let label = json
            .as_str()
            .ok_or_else(|| DecodeError::unexpected("string", json))?;
        self.members
            .iter()
            .find(|(_, l)| l == label)
            .map(|(ident, _)| {
                Value::Enum(EnumValue {
                    type_id: self.type_id.clone(),
                    member: ident.clone(),
                })
            })
            .ok_or_else(|| DecodeError::UnknownEnumLabel {
                label: label.to_string(),
                valid: self.labels(),
            })
    }

    fn schema(&self, _collector: &mut SchemaCollector<'_>) -> Result<JsonSchema, SchemaError> {
        Ok(JsonSchema::enumeration(self.labels()))
    }

    fn is_string_backed(&self) -> bool {
        true
    }
}
