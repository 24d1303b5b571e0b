//! Store protocol consumed by the framework.
//!
//! The framework does not implement storage; it assumes a hash-structured
//! key-value store offering the primitives below (Redis semantics). The
//! batch entry points exist so a networked backend can pipeline them into
//! a single round trip; a pipeline gives no cross-command atomicity.

pub mod memory;

pub use memory::MemoryStore;

use crate::{
    error::{Error, ErrorClass, ErrorOrigin},
    script::Script,
};
use std::time::Duration;
use thiserror::Error as ThisError;

///
/// HashStore
///
/// One method per store primitive. Every call is a single logical round
/// trip; the `*_many` variants are pipelined batches. Absence of a key is
/// never an error on this surface — reads return empty shapes and
/// deletes report what they removed.
///

pub trait HashStore: Send + Sync + 'static {
    /// O(1) existence check; transfers no field data.
    fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Atomic multi-field write (creates the record if absent).
    fn write_fields(&self, key: &str, entries: &[(String, String)]) -> Result<(), StoreError>;

    /// Read every field of one record; empty when the key is absent.
    fn read_all(&self, key: &str) -> Result<Vec<(String, String)>, StoreError>;

    /// Read selected fields; position-aligned, `None` for absent cells.
    fn read_fields(&self, key: &str, fields: &[String]) -> Result<Vec<Option<String>>, StoreError>;

    /// Delete selected fields; returns how many existed.
    fn delete_fields(&self, key: &str, fields: &[String]) -> Result<u64, StoreError>;

    /// Delete one record; returns whether it existed.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// (Re)apply a lifetime to a record; false when the key is absent.
    fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Evaluate a registered script atomically: the whole body runs
    /// store-side without interleaving from other callers.
    fn eval(&self, script: &Script, keys: &[String], args: &[String])
    -> Result<Reply, StoreError>;

    /// Pipelined batch of `read_all`, one result per key in issue order.
    fn read_all_many(&self, keys: &[String]) -> Result<Vec<Vec<(String, String)>>, StoreError> {
        keys.iter().map(|key| self.read_all(key)).collect()
    }

    /// Pipelined batch of `delete`; returns how many keys existed.
    fn delete_many(&self, keys: &[String]) -> Result<u64, StoreError> {
        let mut removed = 0;
        for key in keys {
            if self.delete(key)? {
                removed += 1;
            }
        }

        Ok(removed)
    }
}

///
/// Reply
///
/// Raw script return value, shaped like the store's reply taxonomy.
/// Coerced into declared result types by
/// [`FromReply`](crate::script::FromReply).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Reply {
    Nil,
    Integer(i64),
    Bulk(String),
    Status(String),
    Array(Vec<Reply>),
}

///
/// StoreError
///
/// Failure reported by the underlying store. The framework adds no
/// retry or deadline layer on top; transport policy belongs to the
/// store client.
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("store backend error: {message}")]
    Backend { message: String },

    #[error("script '{digest}' is not registered with this store")]
    ScriptNotFound { digest: String },

    #[error("script failed: {message}")]
    ScriptFailed { message: String },
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Self::new(ErrorClass::Store, ErrorOrigin::Store, err.to_string())
    }
}
