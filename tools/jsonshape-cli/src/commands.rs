// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Subcommand bodies, kept free of stdin/stdout so they can be tested.

use anyhow::{Context, Result};
use jsonshape::{CatalogIntrospector, CodecRegistry, RegistryConfig, TypeKey};
use std::path::Path;
use std::sync::Arc;

const CONFIG_HEADER: &str = "\
# jsonshape registry configuration
#
# schema_ref_prefix    prefix of $ref values for named schemas
# always_raw           raw types whose type arguments are ignored
# deny_unknown_fields  reject JSON fields no property claims
# log_level            default filter when RUST_LOG is unset

";

/// Outcome of `check`.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub lines: Vec<String>,
    pub resolved: usize,
    pub skipped: usize,
    pub failures: usize,
}

/// Registry over the catalog at `path`, plus its user types flagged generic or not.
fn open_registry(path: &Path, config: RegistryConfig) -> Result<(CodecRegistry, Vec<(String, bool)>)> {
    let catalog = CatalogIntrospector::load(path)
        .with_context(|| format!("Failed to load catalog {}", path.display()))?;
    let types: Vec<(String, bool)> = catalog
        .user_types()
        .into_iter()
        .map(|raw| {
            let generic = catalog
                .definition(&raw)
                .is_some_and(|def| !def.params.is_empty());
            (raw.as_str().to_string(), generic)
        })
        .collect();
    log::debug!("[cli] loaded {} type(s) from {}", types.len(), path.display());
    Ok((CodecRegistry::with_config(Arc::new(catalog), config), types))
}

fn parse_key(type_key: &str) -> Result<TypeKey> {
    TypeKey::parse(type_key).with_context(|| format!("Invalid type '{}'", type_key))
}

/// Root schema fragment plus every named schema it references, pretty-printed.
pub fn schema(catalog: &Path, type_key: &str, config: RegistryConfig) -> Result<String> {
    let (registry, _) = open_registry(catalog, config)?;
    let key = parse_key(type_key)?;

    let mut collector = registry.schema_collector();
    let root = collector
        .schema_for(&key)
        .with_context(|| format!("Failed to generate schema for {}", key))?;
    let schemas: serde_json::Map<String, serde_json::Value> = collector
        .into_schemas()?
        .into_iter()
        .map(|(name, schema)| (name, schema.to_json()))
        .collect();

    let document = serde_json::json!({
        "root": root.to_json(),
        "schemas": schemas,
    });
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Decode `input` as `type_key` and re-encode it.
pub fn normalize(
    catalog: &Path,
    type_key: &str,
    input: &str,
    config: RegistryConfig,
) -> Result<String> {
    let (registry, _) = open_registry(catalog, config)?;
    let key = parse_key(type_key)?;
    let codec = registry
        .get_codec(&key)
        .with_context(|| format!("Failed to resolve codec for {}", key))?;

    let json: serde_json::Value = serde_json::from_str(input).context("Input is not valid JSON")?;
    let value = codec
        .decode(&json)
        .with_context(|| format!("Input does not decode as {}", key))?;
    let normalized = codec
        .encode(&value)
        .with_context(|| format!("Failed to re-encode {}", key))?;
    Ok(serde_json::to_string_pretty(&normalized)?)
}

/// Resolve codec and schema for every non-generic catalog type.
pub fn check(catalog: &Path, config: RegistryConfig) -> Result<CheckReport> {
    let (registry, types) = open_registry(catalog, config)?;
    let mut report = CheckReport::default();

    for (name, generic) in types {
        if generic {
            report.lines.push(format!("[SKIP] {} (generic)", name));
            report.skipped += 1;
            continue;
        }
        let key = TypeKey::simple(name.as_str());
        let outcome = registry.validate(&key).map_err(anyhow::Error::from).and_then(|()| {
            let mut collector = registry.schema_collector();
            collector.schema_for(&key)?;
            collector.into_schemas()?;
            Ok(())
        });
        match outcome {
            Ok(()) => {
                report.lines.push(format!("[OK] {}", name));
                report.resolved += 1;
            }
            Err(e) => {
                log::warn!("[cli] {} failed: {:#}", name, e);
                report.lines.push(format!("[FAIL] {}: {:#}", name, e));
                report.failures += 1;
            }
        }
    }

    Ok(report)
}

/// Write the default configuration, with a commented header, to `output`.
pub fn gen_config(output: &Path) -> Result<()> {
    let body = toml::to_string_pretty(&RegistryConfig::default())
        .context("Failed to serialize configuration")?;
    std::fs::write(output, format!("{}{}", CONFIG_HEADER, body))
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CATALOG: &str = r#"{
        "records": [
            {"name": "Person", "properties": [
                {"name": "name", "type": "string", "mandatory": true},
                {"name": "age", "type": "int"},
                {"name": "color", "type": "Color"}
            ]},
            {"name": "Page", "params": ["T"], "properties": [
                {"name": "items", "type": "List<T>", "mandatory": true}
            ]},
            {"name": "Lookup", "properties": [
                {"name": "byPerson", "type": "Map<Person, string>"}
            ]}
        ],
        "enums": [
            {"name": "Color", "members": [{"name": "RED", "label": "red"}, "GREEN"]}
        ]
    }"#;

    fn catalog_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .expect("tempfile");
        file.write_all(CATALOG.as_bytes()).expect("write");
        file
    }

    #[test]
    fn test_schema_document() {
        let file = catalog_file();
        let out = schema(file.path(), "Page<Person>", RegistryConfig::default()).expect("schema");
        let doc: serde_json::Value = serde_json::from_str(&out).expect("json");

        assert_eq!(doc["root"]["$ref"], "#/components/schemas/Page_Person");
        let schemas = doc["schemas"].as_object().expect("schemas");
        assert!(schemas.contains_key("Page_Person"));
        assert!(schemas.contains_key("Person"));
        assert_eq!(
            schemas["Person"]["properties"]["color"]["enum"],
            serde_json::json!(["red", "GREEN"])
        );
    }

    #[test]
    fn test_schema_unknown_type() {
        let file = catalog_file();
        assert!(schema(file.path(), "Nope", RegistryConfig::default()).is_err());
        assert!(schema(file.path(), "List<", RegistryConfig::default()).is_err());
    }

    #[test]
    fn test_normalize_drops_unknown_fields() {
        let file = catalog_file();
        let out = normalize(
            file.path(),
            "List<Person>",
            r#"[{"name": "Ann", "extra": 1, "color": "red"}]"#,
            RegistryConfig::default(),
        )
        .expect("normalize");
        let json: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(json, serde_json::json!([{"name": "Ann", "color": "red"}]));
    }

    #[test]
    fn test_normalize_rejects_invalid_input() {
        let file = catalog_file();
        let config = RegistryConfig::default();
        assert!(normalize(file.path(), "Person", "{", config.clone()).is_err());
        assert!(normalize(file.path(), "Person", r#"{"age": 3}"#, config.clone()).is_err());

        let strict = config.deny_unknown_fields(true);
        assert!(normalize(file.path(), "Person", r#"{"name": "A", "x": 1}"#, strict).is_err());
    }

    #[test]
    fn test_check_reports_each_type() {
        let file = catalog_file();
        let report = check(file.path(), RegistryConfig::default()).expect("check");

        assert_eq!(report.skipped, 1);
        assert_eq!(report.resolved, 2);
        assert_eq!(report.failures, 1);
        assert!(report.lines.iter().any(|l| l.starts_with("[FAIL] Lookup")));
        assert!(report.lines.iter().any(|l| l == "[SKIP] Page (generic)"));
    }

    #[test]
    fn test_gen_config_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("jsonshape.toml");
        gen_config(&path).expect("gen");

        let loaded = RegistryConfig::from_file(&path).expect("load");
        assert_eq!(loaded, RegistryConfig::default());
    }
}
