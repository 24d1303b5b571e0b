use crate::{
    codec,
    error::Error,
    obs::metrics::{self, Event},
    store::HashStore,
    traits::HashEntity,
};
use std::marker::PhantomData;

///
/// SaveExecutor
///
/// Persists one entity as a single atomic multi-field write: the full
/// scalar namespace plus every supplied map entry. A declared TTL is
/// reapplied after the write, so every save refreshes the lifetime.
///

pub(crate) struct SaveExecutor<'a, E: HashEntity, S: HashStore> {
    store: &'a S,
    _marker: PhantomData<fn() -> E>,
}

impl<'a, E: HashEntity, S: HashStore> SaveExecutor<'a, E, S> {
    pub(crate) const fn new(store: &'a S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub(crate) fn execute(&self, entity: &E) -> Result<E::Id, Error> {
        let model = E::model();
        let id = entity.id();
        let key = codec::record_key(model, &id);

        let scalars = entity.scalar_entries();
        let map = entity.map_entries();

        let mut entries = Vec::with_capacity(scalars.len() + map.len());
        for (name, value) in scalars {
            entries.push((codec::scalar_field(name), value));
        }
        for (map_key, value) in map {
            codec::ensure_map_key(&map_key)?;
            entries.push((map_key, value));
        }

        self.store.write_fields(&key, &entries)?;

        if let Some(ttl) = model.ttl {
            self.store.expire(&key, ttl.duration())?;
        }

        metrics::record(model.hash_name, Event::Save);

        Ok(id)
    }
}
