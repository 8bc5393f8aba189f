// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec for composable types.
//!
//! Decode collects constructor-slot values positionally, invokes the
//! constructor, then applies getter/setter properties in a second pass.
//! Encode reads every serializable property through its accessor and omits
//! optional nulls.

use super::{Codec, CodecHandle, CodecKind};
use crate::error::{ConstructionError, DecodeError, EncodeError, RegistryError, SchemaError};
use crate::registry::CodecRegistry;
use crate::schema::{JsonSchema, SchemaCollector};
use crate::types::{Binding, ComposableDescriptor, Constructor, PropertyDescriptor, TypeKey};
use crate::value::Value;
use serde_json::Value as Json;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct PropertyCodec {
    descriptor: PropertyDescriptor,
    codec: CodecHandle,
}

#[derive(Debug, Clone)]
pub struct ObjectCodec {
    key: TypeKey,
    constructor: Arc<dyn Constructor>,
    properties: Vec<PropertyCodec>,
    deny_unknown_fields: bool,
}

impl ObjectCodec {
    /// Validate the descriptor and resolve a codec for every property type.
    pub fn build(
        key: &TypeKey,
        descriptor: &ComposableDescriptor,
        registry: &CodecRegistry,
    ) -> Result<Self, RegistryError> {
        validate(key, descriptor)?;

        let mut properties = Vec::with_capacity(descriptor.properties.len());
        for property in &descriptor.properties {
            let value_key = property.value_type.instantiate(key.args())?;
            let codec = registry.get_codec(&value_key)?;
            properties.push(PropertyCodec {
                descriptor: property.clone(),
                codec,
            });
        }

        Ok(Self {
            key: key.clone(),
            constructor: descriptor.constructor.clone(),
            properties,
            deny_unknown_fields: registry.config().deny_unknown_fields,
        })
    }

    pub fn type_key(&self) -> &TypeKey {
        &self.key
    }

    /// Property names in declaration order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.descriptor.name.as_str())
    }

    fn type_name(&self) -> String {
        self.key.to_string()
    }
}

/// Slot arity/contiguity and binding/direction coherence.
fn validate(key: &TypeKey, descriptor: &ComposableDescriptor) -> Result<(), RegistryError> {
    let mut names = HashSet::new();
    for property in &descriptor.properties {
        if !names.insert(property.name.as_str()) {
            return Err(RegistryError::invalid(
                key,
                format!("duplicate property {}", property.name),
            ));
        }
        if property.deserializable && !property.binding.is_writable() {
            return Err(RegistryError::invalid(
                key,
                format!(
                    "property {} is {:?} but marked deserializable",
                    property.name, property.binding
                ),
            ));
        }
        if !property.serializable && !property.deserializable {
            return Err(RegistryError::invalid(
                key,
                format!(
                    "property {} is neither serializable nor deserializable",
                    property.name
                ),
            ));
        }
    }

    let arity = descriptor.constructor.arity();
    let mut seen = vec![false; arity];
    for (index, property) in descriptor.slots() {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => {
                return Err(RegistryError::invalid(
                    key,
                    format!("constructor slot {} bound twice ({})", index, property.name),
                ))
            }
            None => {
                return Err(RegistryError::invalid(
                    key,
                    format!(
                        "constructor slot {} of {} exceeds arity {}",
                        index, property.name, arity
                    ),
                ))
            }
        }
    }
    if let Some(missing) = seen.iter().position(|s| !*s) {
        return Err(RegistryError::invalid(
            key,
            format!("constructor slot {} has no property (arity {})", missing, arity),
        ));
    }
    Ok(())
}

impl Codec for ObjectCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Object
    }

    fn encode(&self, value: &Value) -> Result<Json, EncodeError> {
        let mut out = serde_json::Map::new();
        for property in self.properties.iter().filter(|p| p.descriptor.serializable) {
            let name = property.descriptor.name.as_str();
            let field = property
                .descriptor
                .accessor
                .get(value)
                .map_err(|cause| EncodeError::Accessor {
                    field: name.to_string(),
                    cause,
                })?;
            if field.is_null() {
                if property.descriptor.mandatory {
                    return Err(EncodeError::NullMandatory {
                        type_name: self.type_name(),
                        field: name.to_string(),
                    });
                }
                continue;
            }
            let encoded = property
                .codec
                .encode(&field)
                .map_err(|e| e.at_field(name))?;
            out.insert(name.to_string(), encoded);
        }
        Ok(Json::Object(out))
    }

    fn decode(&self, json: &Json) -> Result<Value, DecodeError> {
        let object = json
            .as_object()
            .ok_or_else(|| DecodeError::unexpected("object", json))?;

        if self.deny_unknown_fields {
            if let Some(unknown) = object.keys().find(|k| {
                !self
                    .properties
                    .iter()
                    .any(|p| p.descriptor.deserializable && p.descriptor.name == **k)
            }) {
                return Err(DecodeError::UnknownField {
                    type_name: self.type_name(),
                    field: unknown.clone(),
                });
            }
        }

        let mut args = vec![Value::Null; self.constructor.arity()];
        let mut deferred = Vec::new();
        for property in self.properties.iter().filter(|p| p.descriptor.deserializable) {
            let name = property.descriptor.name.as_str();
            let Some(raw) = object.get(name).filter(|v| !v.is_null()) else {
                if property.descriptor.mandatory {
                    return Err(DecodeError::MissingField {
                        type_name: self.type_name(),
                        field: name.to_string(),
                    });
                }
                continue;
            };
            let decoded = property.codec.decode(raw).map_err(|e| e.at_field(name))?;
            match property.descriptor.binding {
                Binding::ConstructorSlot(index) => args[index] = decoded,
                Binding::GetterSetterPair => deferred.push((property, decoded)),
                // Rejected by `validate`.
                Binding::ReadOnly | Binding::Calculated => {}
            }
        }

        let mut instance = self
            .constructor
            .construct(args)
            .map_err(|cause| ConstructionError::new(&self.key, cause))?;

        for (property, decoded) in deferred {
            property
                .descriptor
                .accessor
                .set(&mut instance, decoded)
                .map_err(|cause| {
                    ConstructionError::in_setter(&self.key, property.descriptor.name.clone(), cause)
                })?;
        }
        Ok(instance)
    }

    fn schema(&self, collector: &mut SchemaCollector<'_>) -> Result<JsonSchema, SchemaError> {
        let mut properties = BTreeMap::new();
        let mut required = Vec::new();
        for property in &self.properties {
            let descriptor = &property.descriptor;
            let mut fragment = collector.schema_for(property.codec.key())?;
            fragment.read_only = descriptor.serializable && !descriptor.deserializable;
            fragment.write_only = descriptor.deserializable && !descriptor.serializable;
            if descriptor.mandatory {
                required.push(descriptor.name.clone());
            }
            properties.insert(descriptor.name.clone(), fragment);
        }
        Ok(JsonSchema::object(properties, required))
    }
}
