use crate::{
    codec,
    error::{Error, SerializeError},
    obs::metrics::{self, Event},
    store::HashStore,
    traits::HashEntity,
    value::{RawRecord, RecordError},
};
use std::marker::PhantomData;

///
/// LoadExecutor
///
/// Read paths. Absence is never an error here: a missing key loads as
/// `None`, and the batched path silently omits ids that do not exist.
/// The batch issues one pipelined round trip regardless of id count.
///

pub(crate) struct LoadExecutor<'a, E: HashEntity, S: HashStore> {
    store: &'a S,
    _marker: PhantomData<fn() -> E>,
}

impl<'a, E: HashEntity, S: HashStore> LoadExecutor<'a, E, S> {
    pub(crate) const fn new(store: &'a S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub(crate) fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, Error> {
        let model = E::model();
        let key = codec::record_key(model, id);

        let fields = self.store.read_all(&key)?;
        if fields.is_empty() {
            metrics::record(model.hash_name, Event::Load { rows: 0 });
            return Ok(None);
        }

        let entity = decode_record::<E>(&key, fields)?;
        metrics::record(model.hash_name, Event::Load { rows: 1 });

        Ok(Some(entity))
    }

    pub(crate) fn exists_by_id(&self, id: &E::Id) -> Result<bool, Error> {
        let model = E::model();
        let key = codec::record_key(model, id);

        let found = self.store.exists(&key)?;
        metrics::record(model.hash_name, Event::Exists);

        Ok(found)
    }

    pub(crate) fn find_all_by_id(&self, ids: &[E::Id]) -> Result<Vec<E>, Error> {
        let model = E::model();
        let keys: Vec<String> = ids.iter().map(|id| codec::record_key(model, id)).collect();

        let records = self.store.read_all_many(&keys)?;

        let mut entities = Vec::with_capacity(records.len());
        for (key, fields) in keys.iter().zip(records) {
            if fields.is_empty() {
                continue;
            }
            entities.push(decode_record::<E>(key, fields)?);
        }

        metrics::record(
            model.hash_name,
            Event::Load {
                rows: entities.len() as u64,
            },
        );

        Ok(entities)
    }
}

/// Split raw hash fields along the namespace convention and rebuild the
/// entity, lifting field-level decode failures into [`SerializeError`]
/// with the offending key attached.
fn decode_record<E: HashEntity>(key: &str, fields: Vec<(String, String)>) -> Result<E, Error> {
    let mut record = RawRecord::default();
    for (field, value) in fields {
        match codec::decode_scalar(&field) {
            Some(name) => {
                record.scalars.insert(name.to_string(), value);
            }
            None => {
                record.map.insert(field, value);
            }
        }
    }

    E::from_record(&record).map_err(|err| lift_record_error(key, &err))
}

fn lift_record_error(key: &str, err: &RecordError) -> Error {
    let serialize = match err {
        RecordError::MissingField { field } => SerializeError::MissingField {
            key: key.to_string(),
            field: (*field).to_string(),
        },
        RecordError::BadValue { field, raw } => SerializeError::BadValue {
            key: key.to_string(),
            field: (*field).to_string(),
            raw: raw.clone(),
        },
        RecordError::BadMapKey { raw } => SerializeError::BadValue {
            key: key.to_string(),
            field: "<map>".to_string(),
            raw: raw.clone(),
        },
    };

    serialize.into()
}
