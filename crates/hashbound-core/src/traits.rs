use crate::{
    model::EntityModel,
    value::{FieldValue, RawRecord, RecordError},
};

///
/// HashEntity
///
/// A type whose instances persist as one hash per instance. Implemented
/// by the derive, which also emits the backing `static` [`EntityModel`];
/// nothing here is discovered at runtime.
///
/// The encode surface is deliberately stringly: the physical store only
/// speaks string fields, and the split between prefixed scalar cells and
/// unprefixed map entries happens in the executors, not here.
///

pub trait HashEntity: Sized + Send + Sync + 'static {
    /// Primary id type; its encoding completes the record key.
    type Id: FieldValue + Clone + Send + Sync;

    /// Map-field key type (`String` when no map field is declared).
    type MapKey: FieldValue + Clone + Ord + Send + Sync;

    /// Map-field value type (`String` when no map field is declared).
    type MapValue: FieldValue + Send + Sync;

    /// The resolved, process-lifetime descriptor for this type.
    fn model() -> &'static EntityModel;

    fn id(&self) -> Self::Id;

    /// Encoded scalar fields, id included, in declaration order.
    fn scalar_entries(&self) -> Vec<(&'static str, String)>;

    /// Encoded map entries; empty when no map field is declared.
    fn map_entries(&self) -> Vec<(String, String)>;

    /// Rebuild an instance from a namespace-split physical record.
    fn from_record(record: &RawRecord) -> Result<Self, RecordError>;
}
