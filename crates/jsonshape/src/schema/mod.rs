// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON-Schema fragments and the cycle-safe schema collector.
//!
//! Only the subset needed for API documentation is modelled: `type`,
//! `properties`, `required`, `items`, `additionalProperties`, `enum`, `$ref`,
//! `readOnly`, `writeOnly` and `format`.

mod collector;

pub use collector::SchemaCollector;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value of the `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

/// A JSON-Schema fragment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSchema {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, JsonSchema>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<JsonSchema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<JsonSchema>>,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub read_only: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub write_only: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl JsonSchema {
    /// `{"$ref": path}`.
    pub fn reference(path: impl Into<String>) -> Self {
        Self {
            reference: Some(path.into()),
            ..Default::default()
        }
    }

    /// `{"type": ty}`.
    pub fn of_type(ty: SchemaType) -> Self {
        Self {
            schema_type: Some(ty),
            ..Default::default()
        }
    }

    /// `{"type": ty, "format": format}`.
    pub fn formatted(ty: SchemaType, format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            ..Self::of_type(ty)
        }
    }

    pub fn object(properties: BTreeMap<String, JsonSchema>, required: Vec<String>) -> Self {
        Self {
            properties: Some(properties),
            required,
            ..Self::of_type(SchemaType::Object)
        }
    }

    pub fn array(items: JsonSchema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of_type(SchemaType::Array)
        }
    }

    /// Map as an object with a uniform value schema.
    pub fn map(values: JsonSchema) -> Self {
        Self {
            additional_properties: Some(Box::new(values)),
            ..Self::of_type(SchemaType::Object)
        }
    }

    pub fn enumeration(labels: Vec<String>) -> Self {
        Self {
            enum_values: Some(labels),
            ..Self::of_type(SchemaType::String)
        }
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    pub fn to_json(&self) -> serde_json::Value {
        // Serializing this struct cannot fail: all keys are strings.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
