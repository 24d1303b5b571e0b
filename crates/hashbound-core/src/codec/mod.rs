//! Deterministic key and field-name encoding.
//!
//! Pure functions, no I/O. Identical `(model, id)` inputs always yield
//! the identical physical key; `save` idempotency depends on it.
//!
//! Inside one record the hash fields are partitioned into two
//! namespaces: scalar cells live under [`SCALAR_PREFIX`], map entries
//! are stored unprefixed. Map keys that would collide with the scalar
//! namespace are rejected at the API boundary rather than documented as
//! safe-by-convention, because the partial read path could not tell a
//! user entry from a scalar cell afterwards.


use crate::{
    error::{Error, ErrorClass, ErrorOrigin},
    model::EntityModel,
    value::FieldValue,
};
use thiserror::Error as ThisError;

/// Separator between the hash-name namespace and the id segment.
pub const KEY_SEPARATOR: char = ':';

/// Prefix marking a hash field as a scalar cell.
pub const SCALAR_PREFIX: &str = "f:";

/// Physical record key for one entity instance: `hash_name:id`.
#[must_use]
pub fn record_key<I: FieldValue>(model: &EntityModel, id: &I) -> String {
    format!("{}{KEY_SEPARATOR}{}", model.hash_name, id.encode())
}

/// Physical hash-field name for a scalar field.
#[must_use]
pub fn scalar_field(name: &str) -> String {
    format!("{SCALAR_PREFIX}{name}")
}

/// Physical hash-field name for a map entry (identity — no prefix).
#[must_use]
pub const fn map_field(key: &str) -> &str {
    key
}

/// Strip the scalar prefix, or report that the raw field is a map entry.
#[must_use]
pub fn decode_scalar(raw: &str) -> Option<&str> {
    raw.strip_prefix(SCALAR_PREFIX)
}

/// Reject encoded map keys that would land in the scalar namespace.
pub fn ensure_map_key(key: &str) -> Result<(), CodecError> {
    if key.starts_with(SCALAR_PREFIX) {
        return Err(CodecError::ReservedMapKey {
            key: key.to_string(),
        });
    }

    Ok(())
}

///
/// CodecError
///

#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("map key '{key}' collides with the reserved scalar prefix '{SCALAR_PREFIX}'")]
    ReservedMapKey { key: String },
}

impl From<CodecError> for Error {
    fn from(err: CodecError) -> Self {
        Self::new(ErrorClass::Conflict, ErrorOrigin::Codec, err.to_string())
    }
}
