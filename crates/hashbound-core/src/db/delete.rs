use crate::{
    codec,
    error::Error,
    obs::metrics::{self, Event},
    store::HashStore,
    traits::HashEntity,
};
use std::marker::PhantomData;

///
/// DeleteExecutor
///
/// Whole-record deletes. Idempotent: deleting an absent key is a no-op.
/// The batch path pipelines into one round trip.
///

pub(crate) struct DeleteExecutor<'a, E: HashEntity, S: HashStore> {
    store: &'a S,
    _marker: PhantomData<fn() -> E>,
}

impl<'a, E: HashEntity, S: HashStore> DeleteExecutor<'a, E, S> {
    pub(crate) const fn new(store: &'a S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub(crate) fn delete_by_id(&self, id: &E::Id) -> Result<(), Error> {
        let model = E::model();
        let key = codec::record_key(model, id);

        let removed = self.store.delete(&key)?;
        metrics::record(
            model.hash_name,
            Event::Delete {
                rows: u64::from(removed),
            },
        );

        Ok(())
    }

    pub(crate) fn delete_all(&self, ids: &[E::Id]) -> Result<(), Error> {
        let model = E::model();
        let keys: Vec<String> = ids.iter().map(|id| codec::record_key(model, id)).collect();

        let removed = self.store.delete_many(&keys)?;
        metrics::record(model.hash_name, Event::Delete { rows: removed });

        Ok(())
    }
}
