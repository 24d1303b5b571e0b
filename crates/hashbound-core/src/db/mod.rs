//! Repository surface: the fixed operation vocabulary plus declared
//! script operations, bound over any [`HashStore`].
//!
//! The framework is a stateless translation layer: no entity state is
//! cached, no locks are taken, and every correctness guarantee comes
//! from the store's own command-level atomicity.

mod delete;
mod load;
mod map;
mod save;


use crate::{
    codec,
    error::{Error, ErrorOrigin},
    obs::metrics::{self, Event},
    script::{FromReply, Script, ScriptModel},
    store::HashStore,
    traits::HashEntity,
};
use delete::DeleteExecutor;
use load::LoadExecutor;
use map::MapExecutor;
use save::SaveExecutor;
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    marker::PhantomData,
    sync::Arc,
};

/// Operation names reserved by the fixed vocabulary. A declared script
/// may not shadow any of these.
pub const FIXED_VOCABULARY: &[&str] = &[
    "save",
    "find_by_id",
    "exists_by_id",
    "find_all_by_id",
    "delete_by_id",
    "delete_all",
    "save_map_by_id",
    "find_hash_fields_by_id",
    "delete_map_by_id",
];

///
/// RepositoryBuilder
///
/// Builds a [`HashRepository`] for one entity type: validates the entity
/// model, then binds each declared script by name. Any failure here is a
/// fatal configuration error — a builder that does not reach `build`'s
/// `Ok` never yields a repository (Unregistered → Resolving → Ready or
/// Failed, with no path back from Failed).
///

pub struct RepositoryBuilder<E: HashEntity, S: HashStore> {
    store: Arc<S>,
    scripts: Vec<ScriptModel>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: HashEntity, S: HashStore> RepositoryBuilder<E, S> {
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self {
            store,
            scripts: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Declare a script operation for this repository.
    #[must_use]
    pub fn script(mut self, model: ScriptModel) -> Self {
        self.scripts.push(model);
        self
    }

    pub fn build(self) -> Result<HashRepository<E, S>, Error> {
        let model = E::model();
        model.validate()?;

        let mut scripts = HashMap::with_capacity(self.scripts.len());
        for declared in self.scripts {
            if FIXED_VOCABULARY.contains(&declared.name) {
                return Err(Error::config(
                    ErrorOrigin::Executor,
                    format!(
                        "entity '{}': script '{}' shadows the fixed vocabulary",
                        model.path, declared.name
                    ),
                ));
            }
            if scripts.insert(declared.name, Script::new(declared)).is_some() {
                return Err(Error::config(
                    ErrorOrigin::Executor,
                    format!(
                        "entity '{}': script '{}' declared more than once",
                        model.path, declared.name
                    ),
                ));
            }
        }

        Ok(HashRepository {
            store: self.store,
            scripts,
            _marker: PhantomData,
        })
    }
}

///
/// HashRepository
///
/// The concrete object behind a declared repository contract: the fixed
/// vocabulary as real methods, plus declared scripts invoked by name.
/// Cheap to clone; holds only the store handle and the script table.
///

pub struct HashRepository<E: HashEntity, S: HashStore> {
    store: Arc<S>,
    scripts: HashMap<&'static str, Script>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: HashEntity, S: HashStore> Clone for HashRepository<E, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            scripts: self.scripts.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E: HashEntity, S: HashStore> fmt::Debug for HashRepository<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scripts: Vec<&str> = self.scripts.keys().copied().collect();
        scripts.sort_unstable();

        f.debug_struct("HashRepository")
            .field("entity", &E::model().path)
            .field("scripts", &scripts)
            .finish_non_exhaustive()
    }
}

impl<E: HashEntity, S: HashStore> HashRepository<E, S> {
    /// The store this repository routes through.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// A declared script, by operation name.
    #[must_use]
    pub fn script(&self, name: &str) -> Option<&Script> {
        self.scripts.get(name)
    }

    // ── Fixed vocabulary ──────────────────────────────────────────

    /// One atomic multi-field write; refreshes TTL when declared.
    /// Returns the (caller-supplied) id.
    pub fn save(&self, entity: &E) -> Result<E::Id, Error> {
        SaveExecutor::<E, S>::new(&self.store).execute(entity)
    }

    /// One full-hash read; `None` when the key is absent.
    pub fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, Error> {
        LoadExecutor::<E, S>::new(&self.store).find_by_id(id)
    }

    /// One existence check; transfers no field data.
    pub fn exists_by_id(&self, id: &E::Id) -> Result<bool, Error> {
        LoadExecutor::<E, S>::new(&self.store).exists_by_id(id)
    }

    /// One pipelined batch read; ids that do not exist are omitted.
    pub fn find_all_by_id(&self, ids: &[E::Id]) -> Result<Vec<E>, Error> {
        LoadExecutor::<E, S>::new(&self.store).find_all_by_id(ids)
    }

    /// Idempotent whole-record delete.
    pub fn delete_by_id(&self, id: &E::Id) -> Result<(), Error> {
        DeleteExecutor::<E, S>::new(&self.store).delete_by_id(id)
    }

    /// Idempotent pipelined batch delete.
    pub fn delete_all(&self, ids: &[E::Id]) -> Result<(), Error> {
        DeleteExecutor::<E, S>::new(&self.store).delete_all(ids)
    }

    /// Write only the supplied map entries; scalars and TTL untouched.
    pub fn save_map_by_id(
        &self,
        id: &E::Id,
        entries: &[(E::MapKey, E::MapValue)],
    ) -> Result<(), Error> {
        MapExecutor::<E, S>::new(&self.store).save_map_by_id(id, entries)
    }

    /// Read selected map entries; absent key or entries are omitted.
    pub fn find_hash_fields_by_id(
        &self,
        id: &E::Id,
        fields: &[E::MapKey],
    ) -> Result<BTreeMap<E::MapKey, E::MapValue>, Error> {
        MapExecutor::<E, S>::new(&self.store).find_hash_fields_by_id(id, fields)
    }

    /// Delete selected map entries; returns how many existed.
    pub fn delete_map_by_id(&self, id: &E::Id, fields: &[E::MapKey]) -> Result<u64, Error> {
        MapExecutor::<E, S>::new(&self.store).delete_map_by_id(id, fields)
    }

    // ── Script operations ─────────────────────────────────────────

    /// Run a declared single-key script against one entity's record.
    pub fn run_script<T: FromReply>(
        &self,
        name: &str,
        id: &E::Id,
        args: &[String],
    ) -> Result<T, Error> {
        let keys = vec![codec::record_key(E::model(), id)];

        self.run_script_raw(name, &keys, args)
    }

    /// Run a declared script, binding `ids` (in order) as its keys.
    pub fn run_script_with_keys<T: FromReply>(
        &self,
        name: &str,
        ids: &[E::Id],
        args: &[String],
    ) -> Result<T, Error> {
        let model = E::model();
        let keys: Vec<String> = ids.iter().map(|id| codec::record_key(model, id)).collect();

        self.run_script_raw(name, &keys, args)
    }

    fn run_script_raw<T: FromReply>(
        &self,
        name: &str,
        keys: &[String],
        args: &[String],
    ) -> Result<T, Error> {
        let model = E::model();
        let script = self.scripts.get(name).ok_or_else(|| {
            Error::config(
                ErrorOrigin::Script,
                format!("entity '{}': script '{name}' is not declared", model.path),
            )
        })?;

        metrics::record(model.hash_name, Event::Script);

        script.run(&*self.store, keys, args).map_err(Error::from)
    }
}
