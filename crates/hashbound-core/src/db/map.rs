use crate::{
    codec,
    error::{Error, ErrorOrigin, SerializeError},
    obs::metrics::{self, Event},
    store::HashStore,
    traits::HashEntity,
    value::FieldValue,
};
use std::{collections::BTreeMap, marker::PhantomData};

///
/// MapExecutor
///
/// Partial operations against the unprefixed map namespace. These touch
/// only the supplied entries — scalar cells and any declared TTL are
/// never affected — which is what makes high-frequency per-entry updates
/// possible without a read-modify-write cycle.
///
/// Individually each call is atomic; a read-compute-write sequence built
/// from them is not. Cross-step atomicity needs a script operation.
///

pub(crate) struct MapExecutor<'a, E: HashEntity, S: HashStore> {
    store: &'a S,
    _marker: PhantomData<fn() -> E>,
}

impl<'a, E: HashEntity, S: HashStore> MapExecutor<'a, E, S> {
    pub(crate) const fn new(store: &'a S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// The map surface only exists for entities that declare a map field.
    fn require_map_field() -> Result<(), Error> {
        let model = E::model();
        if model.map_field.is_none() {
            return Err(Error::config(
                ErrorOrigin::Executor,
                format!("entity '{}' declares no map field", model.path),
            ));
        }

        Ok(())
    }

    pub(crate) fn save_map_by_id(
        &self,
        id: &E::Id,
        entries: &[(E::MapKey, E::MapValue)],
    ) -> Result<(), Error> {
        Self::require_map_field()?;

        // A zero-field hash write would materialize an empty record,
        // which the store's existence semantics forbid.
        if entries.is_empty() {
            return Ok(());
        }

        let model = E::model();
        let key = codec::record_key(model, id);

        let mut encoded = Vec::with_capacity(entries.len());
        for (map_key, value) in entries {
            let raw_key = map_key.encode();
            codec::ensure_map_key(&raw_key)?;
            encoded.push((raw_key, value.encode()));
        }

        self.store.write_fields(&key, &encoded)?;
        metrics::record(model.hash_name, Event::MapWrite);

        Ok(())
    }

    pub(crate) fn find_hash_fields_by_id(
        &self,
        id: &E::Id,
        fields: &[E::MapKey],
    ) -> Result<BTreeMap<E::MapKey, E::MapValue>, Error> {
        Self::require_map_field()?;

        let model = E::model();
        let key = codec::record_key(model, id);

        let raw_keys = encode_map_keys(fields)?;
        let values = self.store.read_fields(&key, &raw_keys)?;

        let mut found = BTreeMap::new();
        for ((field, raw_key), value) in fields.iter().zip(&raw_keys).zip(values) {
            let Some(raw) = value else {
                continue;
            };
            let decoded =
                E::MapValue::decode(&raw).ok_or_else(|| SerializeError::BadValue {
                    key: key.clone(),
                    field: raw_key.clone(),
                    raw,
                })?;
            found.insert(field.clone(), decoded);
        }

        metrics::record(model.hash_name, Event::MapRead);

        Ok(found)
    }

    pub(crate) fn delete_map_by_id(&self, id: &E::Id, fields: &[E::MapKey]) -> Result<u64, Error> {
        Self::require_map_field()?;

        let model = E::model();
        let key = codec::record_key(model, id);

        let raw_keys = encode_map_keys(fields)?;
        let removed = self.store.delete_fields(&key, &raw_keys)?;
        metrics::record(model.hash_name, Event::MapDelete);

        Ok(removed)
    }
}

fn encode_map_keys<K: FieldValue>(fields: &[K]) -> Result<Vec<String>, Error> {
    fields
        .iter()
        .map(|field| {
            let raw = field.encode();
            codec::ensure_map_key(&raw)?;
            Ok(raw)
        })
        .collect()
}
