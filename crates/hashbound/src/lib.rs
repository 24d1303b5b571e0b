//! HashBound — a typed object mapper for hash-structured key-value
//! stores.
//!
//! ## Crate layout
//! - `hashbound-core`: runtime (models, codec, stores, executors,
//!   scripts, registries, metrics).
//! - `hashbound-derive`: the `#[derive(HashEntity)]` macro.
//!
//! This facade re-exports both so applications depend on one crate; the
//! module paths below must stay aligned with what the derive emits.

pub use hashbound_core::{
    Error, __reexports, codec, db, error, model, obs, registry, script, store, traits, value,
};

pub use hashbound_derive::HashEntity;

///
/// Prelude
/// Core vocabulary plus the derive, under one import.
///

pub mod prelude {
    pub use hashbound_core::prelude::*;
    pub use hashbound_derive::HashEntity;
}

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
