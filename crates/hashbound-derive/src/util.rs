use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericArgument, PathArguments, Type};

/// Project a Rust field type onto the runtime `FieldKind` menu.
/// Anything outside the builtin set is `Other`; it still persists as
/// long as it implements `FieldValue`.
pub(crate) fn field_kind(ty: &Type) -> TokenStream {
    let ident = match last_segment_ident(ty) {
        Some(ident) => ident,
        None => return quote!(::hashbound::model::FieldKind::Other),
    };

    match ident.as_str() {
        "String" => quote!(::hashbound::model::FieldKind::Text),
        "bool" => quote!(::hashbound::model::FieldKind::Bool),
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" => {
            quote!(::hashbound::model::FieldKind::Int)
        }
        "u8" | "u16" | "u32" | "u64" | "u128" | "usize" => {
            quote!(::hashbound::model::FieldKind::Uint)
        }
        "f32" | "f64" => quote!(::hashbound::model::FieldKind::Float),
        _ => quote!(::hashbound::model::FieldKind::Other),
    }
}

/// Pull the `(K, V)` type arguments out of a map-shaped field type
/// (`BTreeMap<K, V>`, `HashMap<K, V>`, or anything with two type
/// parameters).
pub(crate) fn map_type_args(ty: &Type) -> Option<(&Type, &Type)> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };

    let mut types = args.args.iter().filter_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    });

    let key = types.next()?;
    let value = types.next()?;

    Some((key, value))
}

fn last_segment_ident(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}
