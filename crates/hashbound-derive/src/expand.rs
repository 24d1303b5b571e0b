use crate::{
    entity::{Entity, EntityShape, TimeUnitArg},
    util,
};
use darling::Error as DarlingError;
use proc_macro2::TokenStream;
use quote::quote;

/// Emit the static model, the `HashEntity` impl, and the registration
/// constructor for one validated entity declaration.
pub(crate) fn entity(entity: &Entity, shape: &EntityShape<'_>) -> TokenStream {
    let ident = &entity.ident;
    let hash_name = &entity.name;

    let id_ident = shape.id.ident.as_ref().expect("named field");
    let id_name = id_ident.to_string();
    let id_ty = &shape.id.ty;
    let id_kind = util::field_kind(id_ty);

    // ── Scalar field models ───────────────────────────────────────
    let scalar_idents: Vec<_> = shape
        .scalars
        .iter()
        .map(|f| f.ident.as_ref().expect("named field"))
        .collect();
    let scalar_names: Vec<String> = scalar_idents.iter().map(ToString::to_string).collect();
    let scalar_tys: Vec<_> = shape.scalars.iter().map(|f| &f.ty).collect();
    let scalar_kinds: Vec<_> = shape.scalars.iter().map(|f| util::field_kind(&f.ty)).collect();

    // ── Map field ─────────────────────────────────────────────────
    let map_parts = match shape.map {
        Some(field) => {
            let map_ident = field.ident.as_ref().expect("named field");
            let map_ty = &field.ty;
            let Some((key_ty, value_ty)) = util::map_type_args(map_ty) else {
                return DarlingError::custom(
                    "map field must be a map type with key and value parameters",
                )
                .with_span(&field.ident)
                .write_errors();
            };

            Some((map_ident, map_ty, key_ty, value_ty))
        }
        None => None,
    };

    let (map_static, map_field_expr) = match shape.map {
        Some(field) => {
            let map_name = field.ident.as_ref().expect("named field").to_string();
            (
                quote! {
                    static MAP_FIELD: ::hashbound::model::FieldModel =
                        ::hashbound::model::FieldModel {
                            name: #map_name,
                            kind: ::hashbound::model::FieldKind::Map,
                        };
                },
                quote!(::core::option::Option::Some(&MAP_FIELD)),
            )
        }
        None => (quote!(), quote!(::core::option::Option::None)),
    };

    let ttl_expr = match entity.ttl {
        Some(ttl) => {
            let amount = ttl.amount;
            let unit = time_unit_tokens(ttl.unit);
            quote! {
                ::core::option::Option::Some(::hashbound::model::Ttl::new(#amount, #unit))
            }
        }
        None => quote!(::core::option::Option::None),
    };

    let (map_key_ty, map_value_ty) = map_parts.map_or_else(
        || (quote!(::std::string::String), quote!(::std::string::String)),
        |(_, _, k, v)| (quote!(#k), quote!(#v)),
    );

    let map_entries_body = map_parts.map_or_else(
        || quote!(::std::vec::Vec::new()),
        |(map_ident, _, _, _)| {
            quote! {
                self.#map_ident
                    .iter()
                    .map(|(k, v)| {
                        (
                            ::hashbound::value::FieldValue::encode(k),
                            ::hashbound::value::FieldValue::encode(v),
                        )
                    })
                    .collect()
            }
        },
    );

    let map_from_record = map_parts.map_or_else(
        || quote!(),
        |(map_ident, map_ty, key_ty, value_ty)| {
            quote! {
                #map_ident: record.map_entries::<#key_ty, #value_ty, #map_ty>()?,
            }
        },
    );

    quote! {
        const _: () = {
            static ID_FIELD: ::hashbound::model::FieldModel =
                ::hashbound::model::FieldModel {
                    name: #id_name,
                    kind: #id_kind,
                };

            static SCALAR_FIELDS: &[::hashbound::model::FieldModel] = &[
                #(
                    ::hashbound::model::FieldModel {
                        name: #scalar_names,
                        kind: #scalar_kinds,
                    },
                )*
            ];

            #map_static

            static MODEL: ::hashbound::model::EntityModel =
                ::hashbound::model::EntityModel {
                    path: concat!(module_path!(), "::", stringify!(#ident)),
                    hash_name: #hash_name,
                    id_field: &ID_FIELD,
                    scalar_fields: SCALAR_FIELDS,
                    map_field: #map_field_expr,
                    ttl: #ttl_expr,
                };

            impl ::hashbound::traits::HashEntity for #ident {
                type Id = #id_ty;
                type MapKey = #map_key_ty;
                type MapValue = #map_value_ty;

                fn model() -> &'static ::hashbound::model::EntityModel {
                    &MODEL
                }

                fn id(&self) -> Self::Id {
                    ::core::clone::Clone::clone(&self.#id_ident)
                }

                fn scalar_entries(&self) -> ::std::vec::Vec<(&'static str, ::std::string::String)> {
                    ::std::vec![
                        (#id_name, ::hashbound::value::FieldValue::encode(&self.#id_ident)),
                        #(
                            (
                                #scalar_names,
                                ::hashbound::value::FieldValue::encode(&self.#scalar_idents),
                            ),
                        )*
                    ]
                }

                fn map_entries(&self) -> ::std::vec::Vec<(::std::string::String, ::std::string::String)> {
                    #map_entries_body
                }

                fn from_record(
                    record: &::hashbound::value::RawRecord,
                ) -> ::core::result::Result<Self, ::hashbound::value::RecordError> {
                    ::core::result::Result::Ok(Self {
                        #id_ident: record.scalar::<#id_ty>(#id_name)?,
                        #(
                            #scalar_idents: record.scalar::<#scalar_tys>(#scalar_names)?,
                        )*
                        #map_from_record
                    })
                }
            }

            #[::hashbound::__reexports::ctor::ctor(unsafe, anonymous, crate_path = ::hashbound::__reexports::ctor)]
            fn __register_model() {
                ::hashbound::registry::register_model(&MODEL);
            }
        };
    }
}

fn time_unit_tokens(unit: TimeUnitArg) -> TokenStream {
    match unit {
        TimeUnitArg::Millis => quote!(::hashbound::model::TimeUnit::Millis),
        TimeUnitArg::Seconds => quote!(::hashbound::model::TimeUnit::Seconds),
        TimeUnitArg::Minutes => quote!(::hashbound::model::TimeUnit::Minutes),
        TimeUnitArg::Hours => quote!(::hashbound::model::TimeUnit::Hours),
        TimeUnitArg::Days => quote!(::hashbound::model::TimeUnit::Days),
    }
}
