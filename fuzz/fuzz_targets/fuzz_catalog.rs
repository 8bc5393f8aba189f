// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use jsonshape::introspect::{CatalogFile, CatalogIntrospector};
use jsonshape::{CodecRegistry, TypeKey};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(file) = CatalogFile::from_json_str(input) else {
        return;
    };
    let mut catalog = CatalogIntrospector::new();
    if file.register_into(&mut catalog).is_err() {
        return;
    }
    let names = catalog.user_types();
    let registry = CodecRegistry::new(Arc::new(catalog));
    for raw in names {
        let key = TypeKey::simple(raw);
        let _ = registry.validate(&key);
        let mut collector = registry.schema_collector();
        let _ = collector.schema_for(&key);
    }
});
