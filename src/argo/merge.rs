// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pure merge of rendered labels/annotations into a secret's existing
//! metadata, with drift removal driven by the last-applied key set.

use crate::error::Result;
use std::collections::BTreeMap;

/// Prefix of keys owned by the bridge. Reserved keys are never tracked in
/// the last-applied sets and never removed by drift cleanup.
const RESERVED_PREFIX: &str = "kkp-argo-bridge/";

pub fn is_reserved_key(key: &str) -> bool {
    key.starts_with(RESERVED_PREFIX)
}

/// The keys to record as applied for this sync: everything rendered,
/// minus the bridge's own reserved keys.
pub fn tracked_keys(rendered: &BTreeMap<String, String>) -> Vec<String> {
    rendered
        .keys()
        .filter(|k| !is_reserved_key(k))
        .cloned()
        .collect()
}

/// JSON encoding of [`tracked_keys`], the persisted bookkeeping format.
pub fn encode_tracked_keys(rendered: &BTreeMap<String, String>) -> Result<String> {
    Ok(serde_json::to_string(&tracked_keys(rendered))?)
}

/// Merge rendered keys into the existing map:
/// - rendered keys overlay existing keys (add or update)
/// - keys recorded in `last_applied` (a JSON array from the previous sync)
///   that the template no longer produces are removed
/// - keys never recorded as applied are left alone, so out-of-band edits
///   survive
pub fn merge_metadata(
    existing: &BTreeMap<String, String>,
    rendered: &BTreeMap<String, String>,
    last_applied: Option<&str>,
) -> Result<BTreeMap<String, String>> {
    let mut merged = existing.clone();
    for (key, value) in rendered {
        merged.insert(key.clone(), value.clone());
    }

    if let Some(raw) = last_applied {
        let previous_keys: Vec<String> = serde_json::from_str(raw)?;
        for key in previous_keys {
            if !rendered.contains_key(&key) && !is_reserved_key(&key) {
                merged.remove(&key);
            }
        }
    }

    Ok(merged)
}
