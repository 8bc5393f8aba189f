// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors: the introspected shape of a raw type.

use crate::types::{Accessor, Constructor, TypeExpr};
use std::fmt;
use std::sync::Arc;

/// Primitive scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomicKind {
    String,
    Int,
    Long,
    Double,
    Bool,
}

impl AtomicKind {
    /// Canonical raw type name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::Bool => "bool",
        }
    }

    pub fn all() -> [AtomicKind; 5] {
        [
            Self::String,
            Self::Int,
            Self::Long,
            Self::Double,
            Self::Bool,
        ]
    }
}

/// Shape of a raw type.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// Primitive scalar.
    Atomic(AtomicKind),
    /// Constructor plus properties.
    Composable(ComposableDescriptor),
    /// Growable list of elements.
    Collection(TypeExpr),
    /// Fixed-size array of elements.
    Array(TypeExpr),
    /// String-keyed map.
    Map { key: TypeExpr, value: TypeExpr },
    /// Closed set of members.
    Enum(EnumDescriptor),
    /// Discriminated set of concrete types.
    Polymorphic(PolymorphicDescriptor),
    /// Unknown shape; only a custom codec can handle it.
    Opaque,
}

/// Discriminant of [`TypeDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Atomic,
    Composable,
    Collection,
    Array,
    Map,
    Enum,
    Polymorphic,
    Opaque,
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Atomic => "atomic",
            Self::Composable => "composable",
            Self::Collection => "collection",
            Self::Array => "array",
            Self::Map => "map",
            Self::Enum => "enum",
            Self::Polymorphic => "polymorphic",
            Self::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

impl TypeDescriptor {
    pub fn kind(&self) -> DescriptorKind {
        match self {
            Self::Atomic(_) => DescriptorKind::Atomic,
            Self::Composable(_) => DescriptorKind::Composable,
            Self::Collection(_) => DescriptorKind::Collection,
            Self::Array(_) => DescriptorKind::Array,
            Self::Map { .. } => DescriptorKind::Map,
            Self::Enum(_) => DescriptorKind::Enum,
            Self::Polymorphic(_) => DescriptorKind::Polymorphic,
            Self::Opaque => DescriptorKind::Opaque,
        }
    }

    /// Composable and polymorphic shapes are extracted into named schemas.
    pub fn is_standalone_named(&self) -> bool {
        matches!(
            self.kind(),
            DescriptorKind::Composable | DescriptorKind::Polymorphic
        )
    }

    pub fn as_composable(&self) -> Option<&ComposableDescriptor> {
        match self {
            Self::Composable(c) => Some(c),
            _ => None,
        }
    }
}

/// How a property is populated and read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// Positional constructor parameter; read through the getter.
    ConstructorSlot(usize),
    /// Written by a setter after construction.
    GetterSetterPair,
    /// Stored, but only readable.
    ReadOnly,
    /// Derived from other state.
    Calculated,
}

impl Binding {
    /// Whether decode can write this property at all.
    pub fn is_writable(&self) -> bool {
        matches!(self, Self::ConstructorSlot(_) | Self::GetterSetterPair)
    }
}

/// One property of a composable type.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub name: String,
    pub value_type: TypeExpr,
    pub mandatory: bool,
    pub serializable: bool,
    pub deserializable: bool,
    pub binding: Binding,
    pub accessor: Arc<dyn Accessor>,
}

impl PropertyDescriptor {
    /// Serializable and deserializable, optional.
    pub fn new(
        name: impl Into<String>,
        value_type: impl Into<TypeExpr>,
        binding: Binding,
        accessor: Arc<dyn Accessor>,
    ) -> Self {
        Self {
            name: name.into(),
            value_type: value_type.into(),
            mandatory: false,
            serializable: true,
            deserializable: binding.is_writable(),
            binding,
            accessor,
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn serializable(mut self, enabled: bool) -> Self {
        self.serializable = enabled;
        self
    }

    pub fn deserializable(mut self, enabled: bool) -> Self {
        self.deserializable = enabled;
        self
    }
}

/// Constructor and properties of a composable type.
#[derive(Debug, Clone)]
pub struct ComposableDescriptor {
    pub constructor: Arc<dyn Constructor>,
    pub properties: Vec<PropertyDescriptor>,
}

impl ComposableDescriptor {
    pub fn new(constructor: Arc<dyn Constructor>, properties: Vec<PropertyDescriptor>) -> Self {
        Self {
            constructor,
            properties,
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Constructor-slot properties with their slot index.
    pub fn slots(&self) -> impl Iterator<Item = (usize, &PropertyDescriptor)> {
        self.properties.iter().filter_map(|p| match p.binding {
            Binding::ConstructorSlot(index) => Some((index, p)),
            _ => None,
        })
    }
}

/// One enum member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub ident: String,
    /// External label override; `None` uses the identifier.
    pub label: Option<String>,
}

impl EnumMember {
    pub fn new(ident: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            label: None,
        }
    }

    pub fn labeled(ident: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            label: Some(label.into()),
        }
    }

    /// External string label.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.ident)
    }
}

/// Ordered enum members.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumDescriptor {
    pub members: Vec<EnumMember>,
}

impl EnumDescriptor {
    pub fn new(members: Vec<EnumMember>) -> Self {
        Self { members }
    }

    pub fn member(&self, ident: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.ident == ident)
    }

    pub fn by_label(&self, label: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.label() == label)
    }

    pub fn labels(&self) -> Vec<String> {
        self.members.iter().map(|m| m.label().to_string()).collect()
    }
}

/// One concrete subtype of a polymorphic type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolymorphicVariant {
    pub discriminator: String,
    pub target: TypeExpr,
}

impl PolymorphicVariant {
    pub fn new(discriminator: impl Into<String>, target: impl Into<TypeExpr>) -> Self {
        Self {
            discriminator: discriminator.into(),
            target: target.into(),
        }
    }
}

/// Discriminator to concrete type mapping, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolymorphicDescriptor {
    pub variants: Vec<PolymorphicVariant>,
}

impl PolymorphicDescriptor {
    pub fn new(variants: Vec<PolymorphicVariant>) -> Self {
        Self { variants }
    }

    pub fn discriminators(&self) -> Vec<String> {
        self.variants
            .iter()
            .map(|v| v.discriminator.clone())
            .collect()
    }
}
