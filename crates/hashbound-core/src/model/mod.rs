//! Runtime entity model definitions.
//!
//! Types in `model` are the *runtime representations* of declared
//! entities, as opposed to their macro-time forms: one immutable,
//! `'static` [`EntityModel`] per declared type, produced by the derive
//! and consumed by the codec, executors, and registry.

pub mod entity;
pub mod field;

pub use entity::{EntityModel, ModelError};
pub use field::{FieldKind, FieldModel, TimeUnit, Ttl};
