//! Derive macro for hash-mapped entities.
//!
//! `#[derive(HashEntity)]` turns a plain named struct into a persistable
//! entity: it emits the static `EntityModel` descriptor, the
//! `HashEntity` impl (field encode/decode glue), and a constructor that
//! registers the model at process start. Malformed declarations are
//! compile errors, so descriptor failures can never reach a request
//! path.

use proc_macro::TokenStream;

mod entity;
mod expand;
mod util;

#[proc_macro_derive(HashEntity, attributes(hash))]
pub fn derive_hash_entity(input: TokenStream) -> TokenStream {
    entity::derive(input.into()).into()
}
