//! Declared atomic script operations.
//!
//! A script operation is an explicit table entry: an operation name, the
//! script body written in the store's scripting language, and how many
//! leading parameters bind as keys. Execution is exactly one round trip
//! and the whole body runs store-side without interleaving — the only
//! multi-step surface in the framework with cross-field atomicity.

use crate::{
    error::{Error, ErrorClass, ErrorDetail, ErrorOrigin},
    store::{HashStore, Reply, StoreError},
};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use thiserror::Error as ThisError;

///
/// ScriptModel
///
/// One declared script operation. Call-site parameters bind in
/// declaration order: the first `key_arity` as script keys, the rest as
/// arguments.
///

#[derive(Clone, Copy, Debug)]
pub struct ScriptModel {
    pub name: &'static str,
    pub body: &'static str,
    pub key_arity: usize,
}

///
/// Script
///
/// A script model plus the SHA-256 digest of its body. The digest is the
/// script's identity against the store (the body is registered once and
/// invoked by digest thereafter).
///

#[derive(Clone, Debug)]
pub struct Script {
    model: ScriptModel,
    digest: String,
}

impl Script {
    #[must_use]
    pub fn new(model: ScriptModel) -> Self {
        let digest = Sha256::digest(model.body.as_bytes())
            .iter()
            .fold(String::with_capacity(64), |mut out, byte| {
                let _ = write!(out, "{byte:02x}");
                out
            });

        Self { model, digest }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.model.name
    }

    #[must_use]
    pub const fn body(&self) -> &'static str {
        self.model.body
    }

    #[must_use]
    pub const fn key_arity(&self) -> usize {
        self.model.key_arity
    }

    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Evaluate against a store and coerce the raw reply into the
    /// declared result type. No retries: a store fault or an
    /// uncoercible reply surfaces as a [`ScriptError`].
    pub fn run<T, S>(&self, store: &S, keys: &[String], args: &[String]) -> Result<T, ScriptError>
    where
        T: FromReply,
        S: HashStore + ?Sized,
    {
        if keys.len() != self.key_arity() {
            return Err(ScriptError::KeyArityMismatch {
                name: self.name(),
                expected: self.key_arity(),
                found: keys.len(),
            });
        }

        let reply = store
            .eval(self, keys, args)
            .map_err(|source| ScriptError::Execution {
                name: self.name(),
                source,
            })?;

        T::from_reply(&reply).ok_or_else(|| ScriptError::Decode {
            name: self.name(),
            reply,
        })
    }
}

///
/// FromReply
///
/// Coercion from the store's raw script reply into a declared Rust
/// result type. A reply the target type cannot absorb is a decode
/// failure, never a silent default.
///

pub trait FromReply: Sized {
    fn from_reply(reply: &Reply) -> Option<Self>;
}

impl FromReply for () {
    fn from_reply(_reply: &Reply) -> Option<Self> {
        Some(())
    }
}

impl FromReply for Reply {
    fn from_reply(reply: &Reply) -> Option<Self> {
        Some(reply.clone())
    }
}

impl FromReply for i64 {
    fn from_reply(reply: &Reply) -> Option<Self> {
        match reply {
            Reply::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl FromReply for u64 {
    fn from_reply(reply: &Reply) -> Option<Self> {
        match reply {
            Reply::Integer(n) => Self::try_from(*n).ok(),
            _ => None,
        }
    }
}

impl FromReply for bool {
    fn from_reply(reply: &Reply) -> Option<Self> {
        match reply {
            Reply::Integer(n) => Some(*n != 0),
            Reply::Nil => Some(false),
            _ => None,
        }
    }
}

impl FromReply for String {
    fn from_reply(reply: &Reply) -> Option<Self> {
        match reply {
            Reply::Bulk(s) | Reply::Status(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl<T: FromReply> FromReply for Option<T> {
    fn from_reply(reply: &Reply) -> Option<Self> {
        match reply {
            Reply::Nil => Some(None),
            other => T::from_reply(other).map(Some),
        }
    }
}

impl<T: FromReply> FromReply for Vec<T> {
    fn from_reply(reply: &Reply) -> Option<Self> {
        match reply {
            Reply::Array(items) => items.iter().map(T::from_reply).collect(),
            _ => None,
        }
    }
}

///
/// ScriptError
///
/// Script evaluation failed or its reply did not fit the declared
/// result type. Wraps the store's raw error; never retried here.
///

#[derive(Debug, ThisError)]
pub enum ScriptError {
    #[error("script '{name}': expected {expected} key(s), got {found}")]
    KeyArityMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("script '{name}' failed: {source}")]
    Execution {
        name: &'static str,
        source: StoreError,
    },

    #[error("script '{name}': reply {reply:?} does not fit the declared result type")]
    Decode { name: &'static str, reply: Reply },
}

impl From<ScriptError> for Error {
    fn from(err: ScriptError) -> Self {
        Self {
            class: ErrorClass::Script,
            origin: ErrorOrigin::Script,
            message: err.to_string(),
            detail: Some(ErrorDetail::Script(err)),
        }
    }
}
