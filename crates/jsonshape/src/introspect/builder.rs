// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builders for catalog type definitions.

use super::CatalogError;
use crate::error::BoxError;
use crate::types::{
    Accessor, Binding, ComposableDescriptor, ComputedAccessor, Constructor, EnumDescriptor,
    EnumMember, FieldAccessor, PolymorphicDescriptor, PolymorphicVariant, PropertyDescriptor,
    RawTypeId, RecordConstructor, TypeDescriptor, TypeExpr,
};
use crate::value::Value;
use std::sync::Arc;

/// A named descriptor ready to be added to a catalog.
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub raw: RawTypeId,
    pub params: Vec<String>,
    pub descriptor: TypeDescriptor,
}

impl TypeDefinition {
    pub fn new(raw: impl Into<RawTypeId>, descriptor: TypeDescriptor) -> Self {
        Self {
            raw: raw.into(),
            params: Vec::new(),
            descriptor,
        }
    }
}

#[derive(Clone)]
enum SpecBinding {
    Slot,
    GetterSetter,
    ReadOnly,
    Calculated(Arc<ComputedAccessor>),
}

/// One property of a [`RecordBuilder`].
#[derive(Clone)]
pub struct PropertySpec {
    name: String,
    ty: String,
    binding: SpecBinding,
    mandatory: bool,
    write_only: bool,
}

impl PropertySpec {
    fn new(name: impl Into<String>, ty: impl Into<String>, binding: SpecBinding) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            binding,
            mandatory: false,
            write_only: false,
        }
    }

    /// Constructor parameter; slots are numbered in declaration order.
    pub fn slot(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(name, ty, SpecBinding::Slot)
    }

    /// Field populated through its setter after construction.
    pub fn getter_setter(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(name, ty, SpecBinding::GetterSetter)
    }

    /// Field that is only ever serialized.
    pub fn read_only(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(name, ty, SpecBinding::ReadOnly)
    }

    /// Derived value computed from the instance on encode.
    pub fn calculated<F>(name: impl Into<String>, ty: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self::new(
            name,
            ty,
            SpecBinding::Calculated(Arc::new(ComputedAccessor::new(compute))),
        )
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Accepted on decode but never written on encode.
    pub fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for PropertySpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertySpec")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("mandatory", &self.mandatory)
            .field("write_only", &self.write_only)
            .finish_non_exhaustive()
    }
}

fn parse_type(owner: &RawTypeId, ty: &str, params: &[String]) -> Result<TypeExpr, CatalogError> {
    TypeExpr::parse_with_params(ty, params).map_err(|source| CatalogError::TypeSyntax {
        owner: owner.to_string(),
        ty: ty.to_string(),
        source,
    })
}

/// Builder for composable (record-like) types.
///
/// Instances decode into [`Value::Object`]s whose fields carry the property
/// names; constructor slots become [`RecordConstructor`] parameters.
#[derive(Debug)]
pub struct RecordBuilder {
    raw: RawTypeId,
    params: Vec<String>,
    properties: Vec<PropertySpec>,
    constructor: Option<Arc<dyn Constructor>>,
}

impl RecordBuilder {
    pub fn new(raw: impl Into<RawTypeId>) -> Self {
        Self {
            raw: raw.into(),
            params: Vec::new(),
            properties: Vec::new(),
            constructor: None,
        }
    }

    /// Declare type parameters (`T`, `K`...), usable in property types.
    pub fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn property(mut self, spec: PropertySpec) -> Self {
        self.properties.push(spec);
        self
    }

    /// Replace the default record constructor. Its arity must match the slot count.
    pub fn constructor(mut self, constructor: Arc<dyn Constructor>) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn build(self) -> Result<TypeDefinition, CatalogError> {
        let mut slot_names = Vec::new();
        let mut properties = Vec::with_capacity(self.properties.len());
        for spec in self.properties {
            let value_type = parse_type(&self.raw, &spec.ty, &self.params)?;
            let (binding, accessor): (Binding, Arc<dyn Accessor>) = match spec.binding {
                SpecBinding::Slot => {
                    slot_names.push(spec.name.clone());
                    (
                        Binding::ConstructorSlot(slot_names.len() - 1),
                        Arc::new(FieldAccessor::new(spec.name.clone())),
                    )
                }
                SpecBinding::GetterSetter => (
                    Binding::GetterSetterPair,
                    Arc::new(FieldAccessor::new(spec.name.clone())),
                ),
                SpecBinding::ReadOnly => (
                    Binding::ReadOnly,
                    Arc::new(FieldAccessor::read_only(spec.name.clone())),
                ),
                SpecBinding::Calculated(accessor) => (Binding::Calculated, accessor),
            };
            let mut property = PropertyDescriptor::new(spec.name, value_type, binding, accessor);
            if spec.mandatory {
                property = property.mandatory();
            }
            if spec.write_only {
                property = property.serializable(false);
            }
            properties.push(property);
        }

        let constructor = self
            .constructor
            .unwrap_or_else(|| Arc::new(RecordConstructor::new(self.raw.clone(), slot_names)));
        Ok(TypeDefinition {
            raw: self.raw,
            params: self.params,
            descriptor: TypeDescriptor::Composable(ComposableDescriptor::new(
                constructor,
                properties,
            )),
        })
    }
}

/// Builder for enum types.
#[derive(Debug)]
pub struct EnumBuilder {
    raw: RawTypeId,
    members: Vec<EnumMember>,
}

impl EnumBuilder {
    pub fn new(raw: impl Into<RawTypeId>) -> Self {
        Self {
            raw: raw.into(),
            members: Vec::new(),
        }
    }

    /// Member whose label is its identifier.
    pub fn member(mut self, ident: impl Into<String>) -> Self {
        self.members.push(EnumMember::new(ident));
        self
    }

    /// Member with an external label.
    pub fn labeled(mut self, ident: impl Into<String>, label: impl Into<String>) -> Self {
        self.members.push(EnumMember::labeled(ident, label));
        self
    }

    pub fn build(self) -> TypeDefinition {
        TypeDefinition::new(self.raw, TypeDescriptor::Enum(EnumDescriptor::new(self.members)))
    }
}

/// Builder for polymorphic types. Variant order is encode priority.
#[derive(Debug)]
pub struct PolymorphicBuilder {
    raw: RawTypeId,
    params: Vec<String>,
    variants: Vec<(String, String)>,
}

impl PolymorphicBuilder {
    pub fn new(raw: impl Into<RawTypeId>) -> Self {
        Self {
            raw: raw.into(),
            params: Vec::new(),
            variants: Vec::new(),
        }
    }

    pub fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn variant(mut self, discriminator: impl Into<String>, ty: impl Into<String>) -> Self {
        self.variants.push((discriminator.into(), ty.into()));
        self
    }

    pub fn build(self) -> Result<TypeDefinition, CatalogError> {
        let variants = self
            .variants
            .iter()
            .map(|(discriminator, ty)| {
                parse_type(&self.raw, ty, &self.params)
                    .map(|target| PolymorphicVariant::new(discriminator.clone(), target))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TypeDefinition {
            raw: self.raw,
            params: self.params,
            descriptor: TypeDescriptor::Polymorphic(PolymorphicDescriptor::new(variants)),
        })
    }
}
