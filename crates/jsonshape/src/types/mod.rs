// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type identities and shapes.
//!
//! `TypeKey` names a concrete instantiation, `TypeDescriptor` describes the shape
//! of a raw type, and the `Constructor`/`Accessor` capabilities let codecs build
//! and read host instances without knowing their Rust representation.

mod access;
mod descriptor;
mod key;

pub use access::{
    Accessor, ComputedAccessor, Constructor, FieldAccessor, FnConstructor, RecordConstructor,
};
pub use descriptor::{
    AtomicKind, Binding, ComposableDescriptor, DescriptorKind, EnumDescriptor, EnumMember,
    PolymorphicDescriptor, PolymorphicVariant, PropertyDescriptor, TypeDescriptor,
};
pub use key::{ParseTypeKeyError, RawTypeId, TypeExpr, TypeKey, MAX_NESTING};
