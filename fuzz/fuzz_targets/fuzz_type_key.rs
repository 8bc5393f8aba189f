// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use jsonshape::TypeKey;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    // Display output must parse back to the same key
    if let Ok(key) = TypeKey::parse(input) {
        let printed = key.to_string();
        assert_eq!(TypeKey::parse(&printed).ok(), Some(key));
    }
});
