// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural type identities.
//!
//! A [`TypeKey`] is a raw type plus its (recursive) type arguments. Equality and
//! hashing are structural, so `Page<List<Person>>` built twice from scratch maps
//! to the same cache slot. [`TypeExpr`] is the same shape with holes: it is what
//! descriptors use to refer to their own type parameters.

use crate::error::RegistryError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Opaque identity of an unparameterized host type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawTypeId(Arc<str>);

impl RawTypeId {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment (`com.acme.Person` and `acme::Person` both give `Person`).
    pub fn simple_name(&self) -> &str {
        let name = self.as_str();
        let after_colons = name.rsplit("::").next().unwrap_or(name);
        after_colons.rsplit('.').next().unwrap_or(after_colons)
    }
}

impl fmt::Display for RawTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RawTypeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for RawTypeId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Canonical identity of a (possibly generic) type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeKey {
    raw: RawTypeId,
    args: Arc<[TypeKey]>,
}

impl TypeKey {
    pub fn new(raw: impl Into<RawTypeId>, args: Vec<TypeKey>) -> Self {
        Self {
            raw: raw.into(),
            args: args.into(),
        }
    }

    /// Key without type arguments.
    pub fn simple(raw: impl Into<RawTypeId>) -> Self {
        Self::new(raw, Vec::new())
    }

    /// Parse `Raw<Arg, ...>` syntax.
    pub fn parse(input: &str) -> Result<Self, ParseTypeKeyError> {
        input.parse()
    }

    pub fn raw(&self) -> &RawTypeId {
        &self.raw
    }

    pub fn args(&self) -> &[TypeKey] {
        &self.args
    }

    pub fn is_generic(&self) -> bool {
        !self.args.is_empty()
    }

    /// The same raw type with its arguments dropped.
    pub fn erased(&self) -> TypeKey {
        TypeKey::simple(self.raw.clone())
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl From<&str> for TypeKey {
    fn from(raw: &str) -> Self {
        TypeKey::simple(raw)
    }
}

impl From<RawTypeId> for TypeKey {
    fn from(raw: RawTypeId) -> Self {
        TypeKey::simple(raw)
    }
}

/// Malformed type key syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseTypeKeyError {
    #[error("empty type name at offset {0}")]
    EmptyName(usize),

    #[error("unexpected {found:?} at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("type arguments nested deeper than {limit} levels at offset {offset}")]
    TooDeep { offset: usize, limit: usize },
}

impl FromStr for TypeKey {
    type Err = ParseTypeKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = KeyParser::new(s);
        let key = parser.key()?;
        parser.skip_ws();
        match parser.peek() {
            None => Ok(key),
            Some((offset, found)) => Err(ParseTypeKeyError::Unexpected { found, offset }),
        }
    }
}

/// Maximum `<...>` nesting accepted by the parser.
pub const MAX_NESTING: usize = 128;

struct KeyParser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> KeyParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<(usize, char)> {
        self.input[self.pos..]
            .chars()
            .next()
            .map(|c| (self.pos, c))
    }

    fn bump(&mut self) {
        if let Some((_, c)) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_ws(&mut self) {
        while let Some((_, c)) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    fn name(&mut self) -> Result<&'a str, ParseTypeKeyError> {
        self.skip_ws();
        let start = self.pos;
        while let Some((_, c)) = self.peek() {
            if c == '<' || c == '>' || c == ',' || c.is_whitespace() {
                break;
            }
            self.bump();
        }
        if self.pos == start {
            return Err(ParseTypeKeyError::EmptyName(start));
        }
        Ok(&self.input[start..self.pos])
    }

    fn key(&mut self) -> Result<TypeKey, ParseTypeKeyError> {
        let raw = self.name()?;
        self.skip_ws();
        let mut args = Vec::new();
        if let Some((offset, '<')) = self.peek() {
            if self.depth == MAX_NESTING {
                return Err(ParseTypeKeyError::TooDeep {
                    offset,
                    limit: MAX_NESTING,
                });
            }
            self.bump();
            self.depth += 1;
            loop {
                args.push(self.key()?);
                self.skip_ws();
                match self.peek() {
                    Some((_, ',')) => self.bump(),
                    Some((_, '>')) => {
                        self.bump();
                        self.depth -= 1;
                        break;
                    }
                    Some((offset, found)) => {
                        return Err(ParseTypeKeyError::Unexpected { found, offset })
                    }
                    None => {
                        return Err(ParseTypeKeyError::UnexpectedEnd {
                            expected: "`,` or `>`",
                        })
                    }
                }
            }
        }
        Ok(TypeKey::new(raw, args))
    }
}

/// A type reference inside a descriptor, possibly mentioning type parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// The n-th type argument of the key being derived.
    Param(usize),
    /// A raw type applied to arguments.
    Apply { raw: RawTypeId, args: Vec<TypeExpr> },
}

impl TypeExpr {
    pub fn param(index: usize) -> Self {
        Self::Param(index)
    }

    pub fn of(raw: impl Into<RawTypeId>) -> Self {
        Self::Apply {
            raw: raw.into(),
            args: Vec::new(),
        }
    }

    pub fn apply(raw: impl Into<RawTypeId>, args: Vec<TypeExpr>) -> Self {
        Self::Apply {
            raw: raw.into(),
            args,
        }
    }

    /// Parse key syntax, turning names listed in `params` into parameters.
    pub fn parse_with_params(input: &str, params: &[String]) -> Result<Self, ParseTypeKeyError> {
        let key = TypeKey::parse(input)?;
        Ok(Self::from_key_with_params(&key, params))
    }

    fn from_key_with_params(key: &TypeKey, params: &[String]) -> Self {
        if !key.is_generic() {
            if let Some(index) = params.iter().position(|p| p == key.raw().as_str()) {
                return Self::Param(index);
            }
        }
        Self::Apply {
            raw: key.raw().clone(),
            args: key
                .args()
                .iter()
                .map(|arg| Self::from_key_with_params(arg, params))
                .collect(),
        }
    }

    /// Substitute parameters with the owning key's arguments.
    pub fn instantiate(&self, args: &[TypeKey]) -> Result<TypeKey, RegistryError> {
        match self {
            Self::Param(index) => {
                args.get(*index)
                    .cloned()
                    .ok_or(RegistryError::UnboundParameter {
                        index: *index,
                        arity: args.len(),
                    })
            }
            Self::Apply { raw, args: inner } => {
                let resolved = inner
                    .iter()
                    .map(|expr| expr.instantiate(args))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TypeKey::new(raw.clone(), resolved))
            }
        }
    }

    /// Highest parameter index referenced, if any.
    pub fn max_param(&self) -> Option<usize> {
        match self {
            Self::Param(index) => Some(*index),
            Self::Apply { args, .. } => args.iter().filter_map(TypeExpr::max_param).max(),
        }
    }
}

impl From<TypeKey> for TypeExpr {
    fn from(key: TypeKey) -> Self {
        Self::from_key_with_params(&key, &[])
    }
}

impl From<&str> for TypeExpr {
    fn from(raw: &str) -> Self {
        Self::of(raw)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Param(index) => write!(f, "${}", index),
            Self::Apply { raw, args } => {
                write!(f, "{}", raw)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
        }
    }
}
