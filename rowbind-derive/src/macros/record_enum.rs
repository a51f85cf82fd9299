//! RecordEnum derive macro implementation

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

pub fn derive_record_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let enum_name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return syn::Error::new(enum_name.span(), "RecordEnum can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    if variants.is_empty() {
        return syn::Error::new(enum_name.span(), "RecordEnum needs at least one variant")
            .to_compile_error()
            .into();
    }

    if let Some(variant) = variants.iter().find(|v| !matches!(v.fields, Fields::Unit)) {
        return syn::Error::new(variant.ident.span(), "RecordEnum variants cannot carry fields")
            .to_compile_error()
            .into();
    }

    let type_name = enum_name.unraw().to_string();
    let variant_idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();
    let variant_names: Vec<String> = variants.iter().map(|v| v.ident.unraw().to_string()).collect();
    let ordinals: Vec<u32> = (0..variant_idents.len() as u32).collect();

    let expanded = quote! {
        impl ::rowbind::value::RecordEnum for #enum_name {
            const DESCRIPTOR: &'static ::rowbind::EnumDescriptor = &::rowbind::EnumDescriptor {
                name: #type_name,
                variants: &[#(#variant_names),*],
            };

            fn ordinal(&self) -> u32 {
                match self {
                    #(Self::#variant_idents => #ordinals,)*
                }
            }

            fn from_ordinal(ordinal: u32) -> ::core::option::Option<Self> {
                match ordinal {
                    #(#ordinals => ::core::option::Option::Some(Self::#variant_idents),)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl ::rowbind::ValueType for #enum_name {
            fn host_kind() -> ::rowbind::HostKind {
                ::rowbind::HostKind::enumeration(<Self as ::rowbind::value::RecordEnum>::DESCRIPTOR)
            }

            fn into_value(self) -> ::rowbind::Value {
                ::rowbind::value::enum_into_value(&self)
            }

            fn from_value(value: ::rowbind::Value) -> ::core::result::Result<Self, ::rowbind::value::ValueError> {
                ::rowbind::value::enum_from_value(value)
            }
        }
    };

    expanded.into()
}
