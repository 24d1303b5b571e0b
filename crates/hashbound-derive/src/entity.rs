use crate::expand;
use darling::{Error as DarlingError, FromDeriveInput, FromField, FromMeta, ast};
use proc_macro2::TokenStream;
use syn::{DeriveInput, Ident, Type};

///
/// Entity
/// Parsed `#[hash(...)]` container attributes plus the field list.
///

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(hash), supports(struct_named))]
pub(crate) struct Entity {
    pub ident: Ident,
    pub generics: syn::Generics,
    pub data: ast::Data<darling::util::Ignored, EntityField>,

    /// Stable external name; becomes the record-key namespace segment.
    pub name: String,

    /// Optional record lifetime, reapplied on every save.
    #[darling(default)]
    pub ttl: Option<TtlArg>,
}

///
/// EntityField
///

#[derive(Debug, FromField)]
#[darling(attributes(hash))]
pub(crate) struct EntityField {
    pub ident: Option<Ident>,
    pub ty: Type,

    #[darling(default)]
    pub id: bool,

    #[darling(default)]
    pub map: bool,
}

///
/// TtlArg
/// `ttl(amount = 30, unit = "seconds")`
///

#[derive(Clone, Copy, Debug, FromMeta)]
pub(crate) struct TtlArg {
    pub amount: u64,
    pub unit: TimeUnitArg,
}

#[derive(Clone, Copy, Debug, FromMeta)]
pub(crate) enum TimeUnitArg {
    Millis,
    Seconds,
    Minutes,
    Hours,
    Days,
}

///
/// EntityShape
/// The validated field partition the codegen works from.
///

pub(crate) struct EntityShape<'a> {
    pub id: &'a EntityField,
    pub scalars: Vec<&'a EntityField>,
    pub map: Option<&'a EntityField>,
}

impl Entity {
    /// Partition fields into id / scalars / map, enforcing the
    /// descriptor invariants: exactly one id, at most one map field.
    pub(crate) fn shape(&self) -> Result<EntityShape<'_>, DarlingError> {
        let fields = self
            .data
            .as_ref()
            .take_struct()
            .expect("supports(struct_named) guarantees a named struct");

        let mut acc = DarlingError::accumulator();
        let mut id = None;
        let mut map = None;
        let mut scalars = Vec::new();

        for field in fields {
            if field.id && field.map {
                acc.push(
                    DarlingError::custom("a field cannot be both the id and the map field")
                        .with_span(&field.ident),
                );
                continue;
            }

            if field.id {
                if id.replace(field).is_some() {
                    acc.push(
                        DarlingError::custom("entity declares more than one id field")
                            .with_span(&field.ident),
                    );
                }
            } else if field.map {
                if map.replace(field).is_some() {
                    acc.push(
                        DarlingError::custom("entity declares more than one map field")
                            .with_span(&field.ident),
                    );
                }
            } else {
                scalars.push(field);
            }
        }

        let Some(id) = id else {
            acc.push(DarlingError::custom(
                "entity must mark exactly one field with #[hash(id)]",
            ));
            return Err(acc.finish().unwrap_err());
        };

        if self.name.is_empty() {
            acc.push(DarlingError::custom("entity name must not be empty"));
        }
        if self.name.contains(':') {
            acc.push(DarlingError::custom(
                "entity name must not contain the key separator ':'",
            ));
        }
        if let Some(ttl) = self.ttl
            && ttl.amount == 0
        {
            acc.push(DarlingError::custom("ttl amount must be non-zero"));
        }
        if !self.generics.params.is_empty() {
            acc.push(DarlingError::custom(
                "hash-mapped entities cannot be generic",
            ));
        }

        acc.finish()?;

        Ok(EntityShape { id, scalars, map })
    }
}

pub(crate) fn derive(input: TokenStream) -> TokenStream {
    let parsed: DeriveInput = match syn::parse2(input) {
        Ok(parsed) => parsed,
        Err(err) => return err.to_compile_error(),
    };

    let entity = match Entity::from_derive_input(&parsed) {
        Ok(entity) => entity,
        Err(err) => return err.write_errors(),
    };

    match entity.shape() {
        Ok(shape) => expand::entity(&entity, &shape),
        Err(err) => err.write_errors(),
    }
}
