use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// FieldValue
///
/// String codec for everything that can live in a hash cell: id values,
/// scalar fields, and map keys/values. The physical store only speaks
/// strings, so every declared field type routes through this trait.
///
/// Encoding is infallible; decoding is not, because stored bytes may
/// predate a schema change or be written by another client.
///

pub trait FieldValue: Sized {
    fn encode(&self) -> String;

    fn decode(raw: &str) -> Option<Self>;
}

impl FieldValue for String {
    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl FieldValue for bool {
    fn encode(&self) -> String {
        if *self { "1".to_string() } else { "0".to_string() }
    }

    fn decode(raw: &str) -> Option<Self> {
        match raw {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        }
    }
}

macro_rules! impl_field_value_via_parse {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn encode(&self) -> String {
                    self.to_string()
                }

                fn decode(raw: &str) -> Option<Self> {
                    raw.parse().ok()
                }
            }
        )*
    };
}

impl_field_value_via_parse!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64);

///
/// RawRecord
///
/// One physical record split along the field-namespace convention:
/// scalar cells (prefix already stripped) and unprefixed map entries.
/// Built by the load path; consumed by generated `from_record` impls.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RawRecord {
    pub scalars: BTreeMap<String, String>,
    pub map: BTreeMap<String, String>,
}

impl RawRecord {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty() && self.map.is_empty()
    }

    /// Decode one scalar cell into its declared field type.
    pub fn scalar<T: FieldValue>(&self, field: &'static str) -> Result<T, RecordError> {
        let raw = self
            .scalars
            .get(field)
            .ok_or(RecordError::MissingField { field })?;

        T::decode(raw).ok_or_else(|| RecordError::BadValue {
            field,
            raw: raw.clone(),
        })
    }

    /// Decode every map entry into the declared key/value types.
    pub fn map_entries<K, V, M>(&self) -> Result<M, RecordError>
    where
        K: FieldValue,
        V: FieldValue,
        M: FromIterator<(K, V)>,
    {
        self.map
            .iter()
            .map(|(k, v)| {
                let key = K::decode(k).ok_or_else(|| RecordError::BadMapKey { raw: k.clone() })?;
                let value = V::decode(v).ok_or_else(|| RecordError::BadValue {
                    field: "<map>",
                    raw: v.clone(),
                })?;

                Ok((key, value))
            })
            .collect()
    }
}

///
/// RecordError
///
/// Field-level decode failure. Carries no record key; the executor that
/// issued the read attaches it when lifting into [`SerializeError`].
///

#[derive(Debug, ThisError)]
pub enum RecordError {
    #[error("field '{field}' is missing")]
    MissingField { field: &'static str },

    #[error("field '{field}' holds undecodable value '{raw}'")]
    BadValue { field: &'static str, raw: String },

    #[error("map key '{raw}' is undecodable")]
    BadMapKey { raw: String },
}

impl RecordError {
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } | Self::BadValue { field, .. } => field,
            Self::BadMapKey { .. } => "<map>",
        }
    }

    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::MissingField { .. } => None,
            Self::BadValue { raw, .. } | Self::BadMapKey { raw } => Some(raw),
        }
    }
}
