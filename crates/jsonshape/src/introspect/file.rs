// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! File-based type catalogs (JSON or TOML).
//!
//! ```toml
//! [[records]]
//! name = "Person"
//! properties = [
//!     { name = "name", type = "string", mandatory = true },
//!     { name = "age", type = "int" },
//!     { name = "nickname", type = "string", binding = "property" },
//! ]
//!
//! [[enums]]
//! name = "Color"
//! members = [{ name = "RED", label = "red" }, "GREEN"]
//!
//! [[unions]]
//! name = "Shape"
//! variants = [{ key = "circle", type = "Circle" }]
//! ```

use super::{
    CatalogError, CatalogIntrospector, EnumBuilder, PolymorphicBuilder, PropertySpec,
    RecordBuilder,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a record property is bound on decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingSpec {
    /// Constructor parameter (in declaration order).
    #[default]
    Slot,
    /// Set after construction.
    Property,
    /// Serialized only.
    ReadOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub binding: BindingSpec,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub write_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    /// Supertypes used for polymorphic runtime-type checks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertyEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberEntry {
    Plain(String),
    Labeled { name: String, label: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumSpec {
    pub name: String,
    pub members: Vec<MemberEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantEntry {
    pub key: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnionSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    pub variants: Vec<VariantEntry>,
}

/// Serialized catalog of records, enums and unions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    #[serde(default)]
    pub records: Vec<RecordSpec>,
    #[serde(default)]
    pub enums: Vec<EnumSpec>,
    #[serde(default)]
    pub unions: Vec<UnionSpec>,
}

impl CatalogFile {
    /// Load from disk; `.json` and `.toml` are supported.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            other => Err(CatalogError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        Ok(toml::from_str(content)?)
    }

    /// Names of every declared type, in file order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .map(|r| r.name.as_str())
            .chain(self.enums.iter().map(|e| e.name.as_str()))
            .chain(self.unions.iter().map(|u| u.name.as_str()))
    }

    /// Define every declared type in `catalog`.
    pub fn register_into(&self, catalog: &mut CatalogIntrospector) -> Result<(), CatalogError> {
        for record in &self.records {
            let mut builder = RecordBuilder::new(record.name.as_str()).params(record.params.clone());
            for entry in &record.properties {
                let mut spec = match entry.binding {
                    BindingSpec::Slot => PropertySpec::slot(&entry.name, &entry.ty),
                    BindingSpec::Property => PropertySpec::getter_setter(&entry.name, &entry.ty),
                    BindingSpec::ReadOnly => {
                        if entry.write_only {
                            return Err(CatalogError::Invalid {
                                owner: record.name.clone(),
                                reason: format!("read-only property {} cannot be write-only", entry.name),
                            });
                        }
                        PropertySpec::read_only(&entry.name, &entry.ty)
                    }
                };
                if entry.mandatory {
                    spec = spec.mandatory();
                }
                if entry.write_only {
                    spec = spec.write_only();
                }
                builder = builder.property(spec);
            }
            catalog.define(builder.build()?)?;
            for sup in &record.extends {
                catalog.declare_subtype(record.name.as_str(), sup.as_str());
            }
        }

        for spec in &self.enums {
            let mut builder = EnumBuilder::new(spec.name.as_str());
            for member in &spec.members {
                builder = match member {
                    MemberEntry::Plain(ident) => builder.member(ident),
                    MemberEntry::Labeled { name, label } => builder.labeled(name, label),
                };
            }
            catalog.define(builder.build())?;
        }

        for spec in &self.unions {
            let mut builder = PolymorphicBuilder::new(spec.name.as_str()).params(spec.params.clone());
            for variant in &spec.variants {
                builder = builder.variant(&variant.key, &variant.ty);
            }
            catalog.define(builder.build()?)?;
        }
        log::info!(
            "[catalog] loaded {} record(s), {} enum(s), {} union(s)",
            self.records.len(),
            self.enums.len(),
            self.unions.len()
        );
        Ok(())
    }
}
