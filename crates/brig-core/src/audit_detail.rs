//! Typed audit `changes` and `extra` payloads.
//!
//! Update audits carry a field-level diff; import and export audits carry a
//! small metadata object. The JSON shapes are fixed by these types.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One changed field in an update diff.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FieldChange {
    pub from: Value,
    pub to: Value,
}

/// Field name → change. Ordered so stored diffs are deterministic.
pub type ChangeSet = BTreeMap<String, FieldChange>;

/// Compute the top-level field diff between two serialized snapshots.
///
/// Fields present on only one side are reported with `null` on the other.
/// Non-object snapshots produce an empty set.
#[must_use]
pub fn diff(before: &Value, after: &Value) -> ChangeSet {
    let mut changes = ChangeSet::new();
    let (Some(before), Some(after)) = (before.as_object(), after.as_object()) else {
        return changes;
    };

    for (field, old) in before {
        let new = after.get(field).unwrap_or(&Value::Null);
        if old != new {
            changes.insert(
                field.clone(),
                FieldChange {
                    from: old.clone(),
                    to: new.clone(),
                },
            );
        }
    }
    for (field, new) in after {
        if !before.contains_key(field) {
            changes.insert(
                field.clone(),
                FieldChange {
                    from: Value::Null,
                    to: new.clone(),
                },
            );
        }
    }
    changes
}

/// `extra` for `AuditAction::Import`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ImportDetail {
    /// 1-based spreadsheet data row.
    pub row: usize,
    /// Whether the row inserted a new record (vs. updating by natural key).
    pub created: bool,
}

/// `extra` for `AuditAction::Export`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ExportDetail {
    pub rows: usize,
    pub format: String,
    pub search: Option<String>,
}
