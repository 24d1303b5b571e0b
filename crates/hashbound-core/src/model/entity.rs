use crate::{
    codec,
    error::{Error, ErrorClass, ErrorOrigin},
    model::field::{FieldKind, FieldModel, Ttl},
};
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

///
/// EntityModel
///
/// Immutable, macro-generated runtime model for one hash-mapped entity.
/// Resolved exactly once per type (one `static` per derive site) and
/// registered at process start; nothing here changes after construction.
///

pub struct EntityModel {
    /// Fully-qualified Rust type path (for dispatch and diagnostics).
    pub path: &'static str,
    /// Stable external name used as the record-key namespace segment.
    pub hash_name: &'static str,
    /// Primary id field; its value completes the record key.
    pub id_field: &'static FieldModel,
    /// Ordered scalar field list (excludes the id and map fields).
    pub scalar_fields: &'static [FieldModel],
    /// Optional key→value collection flattened into the record hash.
    pub map_field: Option<&'static FieldModel>,
    /// Optional record lifetime; reapplied on every save.
    pub ttl: Option<Ttl>,
}

impl EntityModel {
    /// Check the descriptor invariants.
    ///
    /// The derive rejects malformed declarations at compile time; this
    /// re-check covers hand-built models and is run for every model at
    /// registration, so failures surface at startup rather than on a
    /// request path.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.hash_name.is_empty() {
            return Err(ModelError::EmptyHashName { path: self.path });
        }
        if self.hash_name.contains(codec::KEY_SEPARATOR) {
            return Err(ModelError::SeparatorInHashName {
                path: self.path,
                hash_name: self.hash_name,
            });
        }
        if let Some(ttl) = self.ttl
            && ttl.amount == 0
        {
            return Err(ModelError::ZeroTtl { path: self.path });
        }

        let mut seen = BTreeSet::new();
        seen.insert(self.id_field.name);

        for field in self.scalar_fields {
            if field.kind == FieldKind::Map {
                return Err(ModelError::ScalarWithMapKind {
                    path: self.path,
                    field: field.name,
                });
            }
            if !seen.insert(field.name) {
                return Err(ModelError::DuplicateField {
                    path: self.path,
                    field: field.name,
                });
            }
        }

        if let Some(map) = self.map_field {
            if map.kind != FieldKind::Map {
                return Err(ModelError::MapWithScalarKind {
                    path: self.path,
                    field: map.name,
                });
            }
            if !seen.insert(map.name) {
                return Err(ModelError::DuplicateField {
                    path: self.path,
                    field: map.name,
                });
            }
        }

        Ok(())
    }
}

///
/// ModelError
///
/// Malformed entity descriptor. Always a fatal configuration error;
/// never constructed on a per-request path.
///

#[derive(Debug, ThisError)]
pub enum ModelError {
    #[error("entity '{path}': hash name is empty")]
    EmptyHashName { path: &'static str },

    #[error("entity '{path}': hash name '{hash_name}' contains the key separator")]
    SeparatorInHashName {
        path: &'static str,
        hash_name: &'static str,
    },

    #[error("entity '{path}': field '{field}' declared more than once")]
    DuplicateField {
        path: &'static str,
        field: &'static str,
    },

    #[error("entity '{path}': scalar field '{field}' carries a map kind")]
    ScalarWithMapKind {
        path: &'static str,
        field: &'static str,
    },

    #[error("entity '{path}': map field '{field}' carries a scalar kind")]
    MapWithScalarKind {
        path: &'static str,
        field: &'static str,
    },

    #[error("entity '{path}': ttl amount must be non-zero")]
    ZeroTtl { path: &'static str },

    #[error("entities '{first}' and '{second}' share hash name '{hash_name}'")]
    HashNameCollision {
        first: &'static str,
        second: &'static str,
        hash_name: &'static str,
    },
}

impl From<ModelError> for Error {
    fn from(err: ModelError) -> Self {
        Self::new(ErrorClass::Config, ErrorOrigin::Model, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::field::TimeUnit;

    static ID: FieldModel = FieldModel {
        name: "id",
        kind: FieldKind::Text,
    };
    static NAME: FieldModel = FieldModel {
        name: "name",
        kind: FieldKind::Text,
    };
    static META: FieldModel = FieldModel {
        name: "metadata",
        kind: FieldKind::Map,
    };

    fn base_model() -> EntityModel {
        EntityModel {
            path: "tests::Member",
            hash_name: "member",
            id_field: &ID,
            scalar_fields: std::slice::from_ref(&NAME),
            map_field: Some(&META),
            ttl: None,
        }
    }

    #[test]
    fn well_formed_model_validates() {
        assert!(base_model().validate().is_ok());
    }

    #[test]
    fn separator_in_hash_name_is_rejected() {
        let model = EntityModel {
            hash_name: "mem:ber",
            ..base_model()
        };

        assert!(matches!(
            model.validate(),
            Err(ModelError::SeparatorInHashName { .. })
        ));
    }

    #[test]
    fn duplicate_field_name_is_rejected() {
        static DUP: FieldModel = FieldModel {
            name: "id",
            kind: FieldKind::Text,
        };
        let model = EntityModel {
            scalar_fields: std::slice::from_ref(&DUP),
            ..base_model()
        };

        assert!(matches!(
            model.validate(),
            Err(ModelError::DuplicateField { field: "id", .. })
        ));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let model = EntityModel {
            ttl: Some(Ttl::new(0, TimeUnit::Seconds)),
            ..base_model()
        };

        assert!(matches!(model.validate(), Err(ModelError::ZeroTtl { .. })));
    }

    #[test]
    fn map_field_must_carry_map_kind() {
        let model = EntityModel {
            map_field: Some(&NAME),
            ..base_model()
        };

        assert!(matches!(
            model.validate(),
            Err(ModelError::MapWithScalarKind { .. })
        ));
    }
}
