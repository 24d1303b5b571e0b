//! Core runtime for HashBound: entity models, the key/field codec, the
//! store protocol with its in-memory reference backend, command
//! executors, script operations, and the process-wide registries.
#![warn(unreachable_pub)]

extern crate self as hashbound;

// public exports are one module level down
pub mod codec;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod registry;
pub mod script;
pub mod store;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::Error;

/// re-exports
///
/// derive output refers to these so downstream crates don't have to
/// declare the macro's dependencies themselves
pub mod __reexports {
    pub use ctor;
}

///
/// Prelude
///
/// Domain vocabulary only. No stores, executors, or error internals.
///

pub mod prelude {
    pub use crate::{
        db::{HashRepository, RepositoryBuilder},
        model::{EntityModel, FieldKind, FieldModel, TimeUnit, Ttl},
        script::ScriptModel,
        traits::HashEntity,
        value::FieldValue,
    };
}
