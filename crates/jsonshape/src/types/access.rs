// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Constructor and accessor capabilities attached to composable descriptors.

use crate::error::BoxError;
use crate::types::RawTypeId;
use crate::value::{Object, Value};
use std::fmt;
use std::sync::Arc;

/// Builds an instance from positional constructor arguments.
pub trait Constructor: Send + Sync + fmt::Debug {
    /// Number of positional parameters.
    fn arity(&self) -> usize;

    /// Invoke the constructor. `args.len()` always equals [`arity`](Self::arity).
    fn construct(&self, args: Vec<Value>) -> Result<Value, BoxError>;
}

/// Reads (and optionally writes) one property of an instance.
pub trait Accessor: Send + Sync + fmt::Debug {
    fn get(&self, target: &Value) -> Result<Value, BoxError>;

    fn set(&self, _target: &mut Value, _value: Value) -> Result<(), BoxError> {
        Err("property has no setter".into())
    }
}

/// Constructor producing an [`Object`] whose fields are named after the parameters.
#[derive(Debug, Clone)]
pub struct RecordConstructor {
    type_id: RawTypeId,
    params: Vec<String>,
}

impl RecordConstructor {
    pub fn new(type_id: impl Into<RawTypeId>, params: Vec<String>) -> Self {
        Self {
            type_id: type_id.into(),
            params,
        }
    }
}

impl Constructor for RecordConstructor {
    fn arity(&self) -> usize {
        self.params.len()
    }

    fn construct(&self, args: Vec<Value>) -> Result<Value, BoxError> {
        if args.len() != self.params.len() {
            return Err(format!(
                "{} expects {} argument(s), got {}",
                self.type_id,
                self.params.len(),
                args.len()
            )
            .into());
        }
        let mut object = Object::new(self.type_id.clone());
        for (name, value) in self.params.iter().zip(args) {
            object.set(name.clone(), value);
        }
        Ok(Value::Object(object))
    }
}

type ConstructFn = dyn Fn(Vec<Value>) -> Result<Value, BoxError> + Send + Sync;

/// Closure-backed constructor.
#[derive(Clone)]
pub struct FnConstructor {
    arity: usize,
    construct: Arc<ConstructFn>,
}

impl FnConstructor {
    pub fn new<F>(arity: usize, construct: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            arity,
            construct: Arc::new(construct),
        }
    }
}

impl fmt::Debug for FnConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnConstructor")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl Constructor for FnConstructor {
    fn arity(&self) -> usize {
        self.arity
    }

    fn construct(&self, args: Vec<Value>) -> Result<Value, BoxError> {
        (self.construct)(args)
    }
}

/// Reads and writes a named [`Object`] field.
#[derive(Debug, Clone)]
pub struct FieldAccessor {
    field: String,
    writable: bool,
}

impl FieldAccessor {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            writable: true,
        }
    }

    pub fn read_only(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            writable: false,
        }
    }
}

impl Accessor for FieldAccessor {
    fn get(&self, target: &Value) -> Result<Value, BoxError> {
        target
            .as_object()
            .map(|obj| obj.get(&self.field).clone())
            .ok_or_else(|| format!("expected an object, found {}", target.describe()).into())
    }

    fn set(&self, target: &mut Value, value: Value) -> Result<(), BoxError> {
        if !self.writable {
            return Err(format!("field `{}` is read-only", self.field).into());
        }
        let found = target.describe();
        let obj = target
            .as_object_mut()
            .ok_or_else(|| format!("expected an object, found {}", found))?;
        obj.set(self.field.clone(), value);
        Ok(())
    }
}

type ComputeFn = dyn Fn(&Value) -> Result<Value, BoxError> + Send + Sync;

/// Read-only property computed from the whole instance.
#[derive(Clone)]
pub struct ComputedAccessor {
    compute: Arc<ComputeFn>,
}

impl ComputedAccessor {
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            compute: Arc::new(compute),
        }
    }
}

impl fmt::Debug for ComputedAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ComputedAccessor(..)")
    }
}

impl Accessor for ComputedAccessor {
    fn get(&self, target: &Value) -> Result<Value, BoxError> {
        (self.compute)(target)
    }
}
