//! Process-wide registries.
//!
//! Entity models self-register through ctor constructors emitted by the
//! derive, so the full model set is known before `main` runs.
//! [`verify_models`] is the startup gate: it validates every discovered
//! model exactly once and must succeed before any repository is
//! registered — configuration failures stop the application here, never
//! on a request path.
//!
//! Repository registration is write-once per entity type and fails
//! loudly on duplicates; after startup the registry is read-only, so
//! lookups take no write lock.

use crate::{
    db::HashRepository,
    error::{Error, ErrorClass, ErrorOrigin},
    model::{EntityModel, ModelError},
    store::HashStore,
    traits::HashEntity,
};
use std::{
    any::{Any, TypeId},
    collections::{BTreeMap, HashMap},
    sync::{Arc, LazyLock, OnceLock, RwLock},
};
use thiserror::Error as ThisError;

static MODELS: LazyLock<RwLock<BTreeMap<&'static str, &'static EntityModel>>> =
    LazyLock::new(|| RwLock::new(BTreeMap::new()));

static MODELS_VERIFIED: OnceLock<()> = OnceLock::new();

static REPOSITORIES: LazyLock<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

///
/// RegistryError
///

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error("repository for entity '{path}' already registered")]
    AlreadyRegistered { path: &'static str },

    #[error("repository for entity '{path}' not registered")]
    NotRegistered { path: &'static str },

    #[error("repository for entity '{path}' is bound to a different store type")]
    StoreMismatch { path: &'static str },
}

impl RegistryError {
    const fn class(&self) -> ErrorClass {
        match self {
            Self::AlreadyRegistered { .. } | Self::NotRegistered { .. } => ErrorClass::Config,
            Self::StoreMismatch { .. } => ErrorClass::InvariantViolation,
        }
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        Self::new(err.class(), ErrorOrigin::Registry, err.to_string())
    }
}

/// Insert one entity model. Invoked from derive-emitted constructors;
/// inserting the same static twice is harmless.
pub fn register_model(model: &'static EntityModel) {
    let mut models = MODELS.write().expect("model registry lock poisoned");
    models.insert(model.path, model);
}

/// Snapshot of every registered model, ordered by type path.
#[must_use]
pub fn models() -> Vec<&'static EntityModel> {
    MODELS
        .read()
        .expect("model registry lock poisoned")
        .values()
        .copied()
        .collect()
}

/// Validate every registered model, once per process.
///
/// Checks each model's own invariants plus cross-model hash-name
/// uniqueness (two entity types sharing a namespace segment would alias
/// each other's records).
pub fn verify_models() -> Result<(), Error> {
    if MODELS_VERIFIED.get().is_some() {
        return Ok(());
    }

    let models = MODELS.read().expect("model registry lock poisoned");

    let mut seen: BTreeMap<&'static str, &'static str> = BTreeMap::new();
    for model in models.values() {
        model.validate()?;

        if let Some(first) = seen.insert(model.hash_name, model.path) {
            return Err(ModelError::HashNameCollision {
                first,
                second: model.path,
                hash_name: model.hash_name,
            }
            .into());
        }
    }

    MODELS_VERIFIED.set(()).ok();

    Ok(())
}

/// Register a ready repository for lookup. Write-once per entity type.
pub fn register_repository<E, S>(repository: HashRepository<E, S>) -> Result<(), Error>
where
    E: HashEntity,
    S: HashStore,
{
    verify_models()?;

    let mut repositories = REPOSITORIES
        .write()
        .expect("repository registry lock poisoned");

    if repositories.contains_key(&TypeId::of::<E>()) {
        return Err(RegistryError::AlreadyRegistered {
            path: E::model().path,
        }
        .into());
    }
    repositories.insert(TypeId::of::<E>(), Arc::new(repository));

    Ok(())
}

/// Fetch the registered repository for an entity type.
pub fn lookup<E, S>() -> Result<Arc<HashRepository<E, S>>, Error>
where
    E: HashEntity,
    S: HashStore,
{
    let repositories = REPOSITORIES
        .read()
        .expect("repository registry lock poisoned");

    let entry = repositories
        .get(&TypeId::of::<E>())
        .cloned()
        .ok_or(RegistryError::NotRegistered {
            path: E::model().path,
        })?;

    entry
        .downcast::<HashRepository<E, S>>()
        .map_err(|_| RegistryError::StoreMismatch {
            path: E::model().path,
        }.into())
}
