// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use jsonshape::introspect::{
    CatalogIntrospector, EnumBuilder, PolymorphicBuilder, PropertySpec, RecordBuilder,
};
use jsonshape::{CodecHandle, CodecRegistry, TypeKey};
use libfuzzer_sys::fuzz_target;
use std::sync::{Arc, OnceLock};

fn codec() -> Option<&'static CodecHandle> {
    static CODEC: OnceLock<Option<CodecHandle>> = OnceLock::new();
    CODEC
        .get_or_init(|| {
            let mut catalog = CatalogIntrospector::new();
            catalog
                .define(EnumBuilder::new("Color").labeled("RED", "red").member("GREEN").build())
                .ok()?;
            catalog
                .define(
                    RecordBuilder::new("Node")
                        .property(PropertySpec::slot("id", "long").mandatory())
                        .property(PropertySpec::slot("color", "Color"))
                        .property(PropertySpec::slot("children", "List<Node>"))
                        .property(PropertySpec::getter_setter("attrs", "Map<Color, double>"))
                        .build()
                        .ok()?,
                )
                .ok()?;
            catalog
                .define(
                    PolymorphicBuilder::new("Item")
                        .variant("node", "Node")
                        .variant("color", "Color")
                        .build()
                        .ok()?,
                )
                .ok()?;
            let registry = CodecRegistry::new(Arc::new(catalog));
            registry.get_codec(&TypeKey::parse("List<Item>").ok()?).ok()
        })
        .as_ref()
}

fuzz_target!(|data: &[u8]| {
    let Some(codec) = codec() else {
        return;
    };
    let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    // Anything that decodes must encode again
    if let Ok(value) = codec.decode(&json) {
        let _ = codec.encode(&value).map(|encoded| codec.decode(&encoded));
    }
});
