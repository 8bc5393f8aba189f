// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cross-codec tests driven through a registry.

use super::*;
use crate::config::RegistryConfig;
use crate::error::{BoxError, ConstructionError, DecodeError, EncodeError, SchemaError};
use crate::introspect::{
    CatalogIntrospector, EnumBuilder, PolymorphicBuilder, PropertySpec, RecordBuilder,
};
use crate::registry::CodecRegistry;
use crate::types::{FnConstructor, TypeKey};
use crate::value::{EnumValue, Object, OpaqueValue, Value};
use serde_json::json;
use std::sync::Arc;

fn catalog() -> CatalogIntrospector {
    let mut catalog = CatalogIntrospector::new();
    catalog
        .define(
            RecordBuilder::new("Account")
                .property(PropertySpec::slot("owner", "string").mandatory())
                .property(PropertySpec::getter_setter("balance", "long"))
                .property(PropertySpec::read_only("id", "string"))
                .property(PropertySpec::calculated("label", "string", |v: &Value| {
                    let owner = v
                        .as_object()
                        .and_then(|o| o.get("owner").as_str())
                        .unwrap_or("?");
                    Ok(Value::from(format!("account of {}", owner)))
                }))
                .property(PropertySpec::getter_setter("pin", "string").write_only())
                .build()
                .expect("account"),
        )
        .expect("define");
    catalog
        .define(
            EnumBuilder::new("Color")
                .labeled("RED", "red")
                .labeled("GREEN", "green")
                .build(),
        )
        .expect("define");
    for (name, field) in [("Circle", "radius"), ("Square", "side")] {
        catalog
            .define(
                RecordBuilder::new(name)
                    .property(PropertySpec::slot(field, "double").mandatory())
                    .build()
                    .expect("shape"),
            )
            .expect("define");
    }
    catalog
        .define(
            PolymorphicBuilder::new("Shape")
                .variant("circle", "Circle")
                .variant("square", "Square")
                .build()
                .expect("shape"),
        )
        .expect("define");
    catalog
}

fn registry() -> CodecRegistry {
    CodecRegistry::new(Arc::new(catalog()))
}

fn key(s: &str) -> TypeKey {
    TypeKey::parse(s).expect("type key")
}

fn account() -> Value {
    Value::Object(
        Object::new("Account")
            .with("owner", "ann")
            .with("balance", 10_i64)
            .with("id", "a-1")
            .with("pin", "1234"),
    )
}

#[test]
fn test_object_binding_directions() {
    let registry = registry();
    let codec = registry.get_codec(&key("Account")).expect("account");

    let encoded = codec.encode(&account()).expect("encode");
    assert_eq!(
        encoded,
        json!({"owner": "ann", "balance": 10, "id": "a-1", "label": "account of ann"})
    );

    let decoded = codec
        .decode(&json!({"owner": "bob", "balance": 3, "id": "ignored", "label": "x", "pin": "9"}))
        .expect("decode");
    let obj = decoded.as_object().expect("object");
    assert_eq!(obj.get("owner"), &Value::from("bob"));
    assert_eq!(obj.get("balance"), &Value::Long(3));
    assert_eq!(obj.get("pin"), &Value::from("9"));
    assert!(obj.get("id").is_null());
    assert!(obj.get("label").is_null());
}

#[test]
fn test_object_schema_marks_asymmetric_properties() {
    let registry = registry();
    let mut collector = registry.schema_collector();
    collector.schema_for(&key("Account")).expect("schema");
    let schema = collector.get("Account").expect("account").to_json();
    assert_eq!(schema["required"], json!(["owner"]));
    assert_eq!(schema["properties"]["id"]["readOnly"], json!(true));
    assert_eq!(schema["properties"]["label"]["readOnly"], json!(true));
    assert_eq!(schema["properties"]["pin"]["writeOnly"], json!(true));
    assert!(schema["properties"]["balance"].get("readOnly").is_none());
}

#[test]
fn test_missing_and_null_mandatory_fields() {
    let registry = registry();
    let codec = registry.get_codec(&key("Account")).expect("account");
    for input in [json!({"balance": 1}), json!({"owner": null})] {
        let err = codec.decode(&input).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingField { ref field, .. } if field == "owner"
        ));
    }

    let mut broken = account();
    if let Some(obj) = broken.as_object_mut() {
        obj.set("owner", Value::Null);
    }
    assert!(matches!(
        codec.encode(&broken),
        Err(EncodeError::NullMandatory { ref field, .. }) if field == "owner"
    ));
}

#[test]
fn test_unknown_fields_policy() {
    let lenient = registry();
    let codec = lenient.get_codec(&key("Circle")).expect("circle");
    assert!(codec.decode(&json!({"radius": 1.0, "colour": "red"})).is_ok());

    let strict = CodecRegistry::with_config(
        Arc::new(catalog()),
        RegistryConfig::default().deny_unknown_fields(true),
    );
    let codec = strict.get_codec(&key("Circle")).expect("circle");
    assert!(matches!(
        codec.decode(&json!({"radius": 1.0, "colour": "red"})),
        Err(DecodeError::UnknownField { ref field, .. }) if field == "colour"
    ));
}

#[test]
fn test_constructor_failure_is_wrapped() {
    let mut catalog = CatalogIntrospector::new();
    let ctor = FnConstructor::new(1, |args: Vec<Value>| -> Result<Value, BoxError> {
        match args[0].as_i32() {
            Some(age) if age >= 0 => Ok(Value::Object(Object::new("Adult").with("age", age))),
            _ => Err("age must not be negative".into()),
        }
    });
    catalog
        .define(
            RecordBuilder::new("Adult")
                .property(PropertySpec::slot("age", "int").mandatory())
                .constructor(Arc::new(ctor))
                .build()
                .expect("adult"),
        )
        .expect("define");
    let registry = CodecRegistry::new(Arc::new(catalog));
    let codec = registry.get_codec(&key("Adult")).expect("adult");

    assert!(codec.decode(&json!({"age": 3})).is_ok());
    let err = codec.decode(&json!({"age": -1})).unwrap_err();
    match err {
        DecodeError::Construction(ConstructionError {
            type_name,
            member,
            cause,
        }) => {
            assert_eq!(type_name, "Adult");
            assert!(member.is_none());
            assert_eq!(cause.to_string(), "age must not be negative");
        }
        other => panic!("expected construction error, got {other}"),
    }
}

#[test]
fn test_setter_failure_is_construction_error() {
    let mut catalog = CatalogIntrospector::new();
    // Builds a plain string, so the deferred setter has no object to write into.
    let ctor = FnConstructor::new(0, |_: Vec<Value>| -> Result<Value, BoxError> {
        Ok(Value::from("frozen"))
    });
    catalog
        .define(
            RecordBuilder::new("Frozen")
                .property(PropertySpec::getter_setter("note", "string"))
                .constructor(Arc::new(ctor))
                .build()
                .expect("frozen"),
        )
        .expect("define");
    let registry = CodecRegistry::new(Arc::new(catalog));
    let codec = registry.get_codec(&key("Frozen")).expect("frozen");
    assert!(matches!(
        codec.decode(&json!({"note": "hi"})),
        Err(DecodeError::Construction(ConstructionError { member: Some(ref m), .. })) if m == "note"
    ));
}

#[test]
fn test_nested_error_path() {
    let registry = registry();
    let codec = registry.get_codec(&key("List<Circle>")).expect("list");
    let err = codec
        .decode(&json!([{"radius": 1.0}, {"radius": "big"}]))
        .unwrap_err();
    assert_eq!(err.path(), "[1].radius");
    assert!(matches!(err.root_cause(), DecodeError::UnexpectedKind { .. }));
}

#[test]
fn test_collection_containers() {
    let registry = registry();
    let list = registry.get_codec(&key("List<int>")).expect("list");
    let array = registry.get_codec(&key("Array<int>")).expect("array");
    let json = json!([1, null, 3]);
    assert_eq!(
        list.decode(&json).expect("list"),
        Value::List(vec![Value::Int(1), Value::Null, Value::Int(3)])
    );
    assert_eq!(
        array.decode(&json).expect("array"),
        Value::Array(vec![Value::Int(1), Value::Null, Value::Int(3)])
    );
    assert_eq!(
        list.encode(&Value::Array(vec![Value::Int(7)])).expect("encode"),
        json!([7])
    );
}

#[test]
fn test_map_with_string_and_enum_keys() {
    let registry = registry();
    let by_name = registry.get_codec(&key("Map<string, int>")).expect("map");
    let value = Value::Map(vec![
        (Value::from("a"), Value::Int(1)),
        (Value::from("b"), Value::Null),
    ]);
    let encoded = by_name.encode(&value).expect("encode");
    assert_eq!(encoded, json!({"a": 1, "b": null}));
    assert_eq!(by_name.decode(&encoded).expect("decode").map_get("a"), Some(&Value::Int(1)));

    let by_color = registry.get_codec(&key("Map<Color, long>")).expect("map");
    let value = Value::Map(vec![(
        Value::Enum(EnumValue::new("Color", "RED")),
        Value::Long(5),
    )]);
    assert_eq!(by_color.encode(&value).expect("encode"), json!({"red": 5}));
    assert!(matches!(
        by_color.decode(&json!({"blue": 1})),
        Err(DecodeError::AtKey { .. })
    ));
}

#[test]
fn test_map_duplicate_labels() {
    let registry = registry();
    let codec = registry.get_codec(&key("Map<string, int>")).expect("map");
    let value = Value::Map(vec![
        (Value::from("a"), Value::Int(1)),
        (Value::from("a"), Value::Int(2)),
    ]);
    assert!(matches!(codec.encode(&value), Err(EncodeError::DuplicateKey(k)) if k == "a"));
}

#[test]
fn test_map_with_unsupported_key() {
    let registry = registry();
    let codec = registry.get_codec(&key("Map<int, string>")).expect("derivation succeeds");
    let value = Value::Map(vec![(Value::Int(1), Value::from("one"))]);
    assert!(matches!(
        codec.encode(&value),
        Err(EncodeError::UnsupportedKeyType { .. })
    ));

    let mut collector = registry.schema_collector();
    assert!(matches!(
        collector.schema_for(&key("Map<int, string>")),
        Err(SchemaError::Unsupported(_))
    ));
}

#[test]
fn test_enum_rejects_foreign_values() {
    let registry = registry();
    let codec = registry.get_codec(&key("Color")).expect("color");
    assert!(matches!(
        codec.encode(&Value::Enum(EnumValue::new("Size", "RED"))),
        Err(EncodeError::UnexpectedValue { .. })
    ));
    assert!(matches!(
        codec.encode(&Value::Enum(EnumValue::new("Color", "BLUE"))),
        Err(EncodeError::UnknownEnumMember { .. })
    ));
    assert!(matches!(
        codec.decode(&json!(1)),
        Err(DecodeError::UnexpectedKind { expected: "string", found: "number" })
    ));
}

#[test]
fn test_polymorphic_dispatch() {
    let registry = registry();
    let codec = registry.get_codec(&key("Shape")).expect("shape");

    let square = Value::Object(Object::new("Square").with("side", 2.0));
    assert_eq!(codec.encode(&square).expect("encode"), json!({"square": {"side": 2.0}}));

    let triangle = Value::Object(Object::new("Triangle"));
    assert!(matches!(
        codec.encode(&triangle),
        Err(EncodeError::NoPolymorphicMapping { .. })
    ));

    let err = codec.decode(&json!({"triangle": {}})).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Discriminator { ref found, .. } if found.is_empty()
    ));

    // Extra non-discriminator keys are tolerated.
    let decoded = codec
        .decode(&json!({"circle": {"radius": 1.5}, "note": "x"}))
        .expect("decode");
    assert_eq!(decoded.runtime_type().map(|t| t.as_str()), Some("Circle"));
}

#[test]
fn test_polymorphic_first_match_wins() {
    let mut catalog = catalog();
    catalog.declare_subtype("Square", "Rectangle");
    catalog
        .define(
            RecordBuilder::new("Rectangle")
                .property(PropertySpec::slot("side", "double"))
                .build()
                .expect("rectangle"),
        )
        .expect("define");
    catalog
        .define(
            PolymorphicBuilder::new("Quad")
                .variant("rectangle", "Rectangle")
                .variant("square", "Square")
                .build()
                .expect("quad"),
        )
        .expect("define");
    let registry = CodecRegistry::new(Arc::new(catalog));
    let codec = registry.get_codec(&key("Quad")).expect("quad");
    let square = Value::Object(Object::new("Square").with("side", 1.0));
    assert_eq!(
        codec.encode(&square).expect("encode"),
        json!({"rectangle": {"side": 1.0}})
    );
}

#[test]
fn test_custom_codec_for_opaque_values() {
    #[derive(Debug, PartialEq)]
    struct Handle(u32);

    let registry = registry();
    let codec = FnCodec::new(
        crate::schema::JsonSchema::formatted(crate::schema::SchemaType::Integer, "handle"),
        |value: &Value| match value {
            Value::Opaque(opaque) => opaque
                .downcast_ref::<Handle>()
                .map(|h| json!(h.0))
                .ok_or_else(|| EncodeError::custom("not a handle")),
            other => Err(EncodeError::unexpected("handle", other)),
        },
        |json: &serde_json::Value| {
            json.as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(|n| Value::Opaque(OpaqueValue::new(Handle(n))))
                .ok_or_else(|| DecodeError::unexpected("handle", json))
        },
    );
    registry
        .register_custom(TypeKey::simple("Class"), codec)
        .expect("register");

    let handle = registry.get_codec(&key("Class<Account>")).expect("class");
    let value = Value::Opaque(OpaqueValue::new(Handle(7)));
    assert_eq!(handle.encode(&value).expect("encode"), json!(7));
    let decoded = handle.decode(&json!(7)).expect("decode");
    let Value::Opaque(opaque) = decoded else {
        panic!("expected opaque value");
    };
    assert_eq!(opaque.downcast_ref::<Handle>(), Some(&Handle(7)));
}

#[test]
fn test_pending_handle_reports_unresolved() {
    let handle = CodecHandle::pending(TypeKey::simple("Later"));
    assert!(!handle.is_resolved());
    assert!(matches!(
        handle.decode(&json!({})),
        Err(DecodeError::Unresolved(_))
    ));
    assert!(matches!(
        handle.encode(&Value::Null),
        Err(EncodeError::Unresolved(_))
    ));

    assert!(handle.complete(Arc::new(AtomicCodec::new(crate::types::AtomicKind::Bool))));
    assert!(!handle.complete(Arc::new(AtomicCodec::new(crate::types::AtomicKind::Int))));
    assert_eq!(handle.decode(&json!(true)).expect("decode"), Value::Bool(true));
}

#[test]
fn test_string_helpers() {
    let registry = registry();
    let codec = registry.get_codec(&key("List<string>")).expect("list");
    let value = codec.decode_str(r#"["a","b"]"#).expect("decode");
    assert_eq!(codec.encode_to_string(&value).expect("encode"), r#"["a","b"]"#);
    assert!(matches!(codec.decode_str("[1,"), Err(DecodeError::Custom { .. })));
}
