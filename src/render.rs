//! Console rendering for `list`.

use crate::record::Record;

/// Render a record as `key: value, key: value`.
///
/// - No projection keys: every field in insertion order, except hidden
///   fields whose key starts with `_`.
/// - Several projection keys: only those fields, in projection order,
///   hidden or not.
/// - Exactly one projection key: just that field's value. A list value
///   renders as its literal, e.g. `[1, 'a']`.
///
/// Returns `None` when nothing would be printed.
pub fn render(record: &Record, keys: &[String]) -> Option<String> {
    if let [key] = keys {
        return record.get(key).map(|value| value.to_string());
    }
    let parts: Vec<String> = if keys.is_empty() {
        record
            .iter()
            .filter(|(k, _)| !k.starts_with('_'))
            .map(|(k, v)| format!("{k}: {v}"))
            .collect()
    } else {
        keys.iter()
            .filter_map(|k| record.get(k).map(|v| format!("{k}: {v}")))
            .collect()
    };
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
