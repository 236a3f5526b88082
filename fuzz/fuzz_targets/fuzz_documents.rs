#![no_main]
// SPDX-License-Identifier: MIT OR Apache-2.0
//! libFuzzer target for YAML and TOML decoding
//!
//! Tests:
//! - Decoding never panics, it either yields JSON or a typed error
//! - A decoded document diffs cleanly against itself

use libfuzzer_sys::fuzz_target;
use setpatch_diff::{DiffOptions, DocumentFormat, Side, json_diff_with_options, parse_document};

fuzz_target!(|data: &[u8]| {
    if data.len() > 20_000 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    for format in [DocumentFormat::Json, DocumentFormat::Yaml, DocumentFormat::Toml] {
        let Ok(value) = parse_document(text, format, Side::Source) else {
            continue;
        };
        let patch = json_diff_with_options(&value, &value, &DiffOptions::new())
            .expect("default options are supported");
        assert!(patch.is_empty());
    }
});
