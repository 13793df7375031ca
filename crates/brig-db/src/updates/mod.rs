//! Partial-update payloads and their builders.
//!
//! Every field is optional; only set fields are written. Nullable columns
//! use `Option<Option<T>>` so a PATCH body can distinguish "leave alone"
//! (field absent) from "clear" (`null`).

pub mod estimate;
pub mod material;
pub mod project;
pub mod tool;
pub mod user;
pub mod work_time;
pub mod work_type;

use brig_core::errors::CoreError;
use serde::{Deserialize, Deserializer};

/// Deserialize a present field (including `null`) as `Some(..)`.
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

pub(crate) fn check_text(field: &str, value: Option<&String>) -> Result<(), CoreError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(CoreError::validation(format!(
            "{field} must not be empty"
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn check_amount(field: &str, value: Option<f64>) -> Result<(), CoreError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(CoreError::validation(format!(
            "{field} must be a non-negative number, got {v}"
        ))),
        _ => Ok(()),
    }
}
