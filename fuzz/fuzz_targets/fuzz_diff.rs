#![no_main]
// SPDX-License-Identifier: MIT OR Apache-2.0
//! libFuzzer target for patch generation
//!
//! Tests:
//! - Self-diff is empty under every strategy and rule set
//! - EnsureExists never emits `remove`
//! - Patches serialize and every operation carries a valid pointer

use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use setpatch_diff::{Collections, DiffOptions, Strategy, json_diff_with_options, pointer};

fn rule_sets() -> Vec<Collections> {
    let mut sets = vec![Collections::new()];
    if let Ok(rules) = Collections::new()
        .with_entity_set("$.t", "k")
        .and_then(|c| c.with_entity_set("$[*]", "id"))
        .and_then(|c| c.with_array("$.a"))
        .and_then(|c| c.with_ignored_field("$.t[*].b"))
    {
        sets.push(rules);
    }
    sets
}

fuzz_target!(|data: &[u8]| {
    // Skip overly large or small inputs
    if data.len() > 50_000 || data.len() < 2 {
        return;
    }

    // Split data into two parts for two JSON inputs
    let mid = data.len() / 2;
    let Ok(source) = serde_json::from_slice::<Value>(&data[..mid]) else {
        return;
    };
    let Ok(target) = serde_json::from_slice::<Value>(&data[mid..]) else {
        return;
    };

    for collections in rule_sets() {
        for strategy in [
            Strategy::exact_match(),
            Strategy::exact_match_ignoring_order(),
            Strategy::EnsureExists,
        ] {
            let options = DiffOptions::new()
                .with_strategy(strategy)
                .with_collections(collections.clone());

            let identity = json_diff_with_options(&source, &source, &options)
                .expect("supported strategy");
            assert!(identity.is_empty(), "self-diff not empty: {identity:?}");

            let patch = json_diff_with_options(&source, &target, &options)
                .expect("supported strategy");
            if strategy == Strategy::EnsureExists {
                assert!(patch.iter().all(|op| !op.is_remove()), "remove under EnsureExists");
            }
            for op in &patch {
                let path = op.path();
                assert!(path.is_empty() || path.starts_with('/'), "bad pointer {path}");
                // every segment must survive a decode/encode cycle
                let rebuilt = pointer::segments(path)
                    .fold(String::new(), |acc, segment| pointer::extend(&acc, &segment));
                assert_eq!(rebuilt, path);
            }
            patch.to_json_string().expect("patch serializes");
        }
    }
});
