//! Field-by-field merging of configuration tiers.
//!
//! Tiers are parsed into `serde_json::Value` trees and layered in place.
//! Mappings merge key by key; every other value (including sequences such as
//! `checker.rules`) is replaced wholesale by the higher tier. A `null` in a
//! higher tier means "unset" and leaves the lower value alone.

use serde_json::Value;

/// Layer `overlay` onto `base` in place.
pub fn merge_into(base: &mut Value, overlay: Value) {
    match overlay {
        Value::Null => {}
        Value::Object(entries) => {
            if let Value::Object(target) = base {
                for (key, value) in entries {
                    match target.get_mut(&key) {
                        Some(existing) => merge_into(existing, value),
                        None => {
                            if !value.is_null() {
                                target.insert(key, value);
                            }
                        }
                    }
                }
            } else {
                *base = Value::Object(entries);
            }
        }
        other => *base = other,
    }
}

/// Layer tiers in order; later tiers win.
pub fn merge_tiers(tiers: impl IntoIterator<Item = Value>) -> Value {
    let mut merged = Value::Null;
    for tier in tiers {
        merge_into(&mut merged, tier);
    }
    merged
}
