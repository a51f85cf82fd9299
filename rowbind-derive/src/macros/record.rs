//! Record derive macro implementation

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{parse_macro_input, Data, DataStruct, DeriveInput, Fields, Ident};

use crate::attributes;
use crate::utils;

pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "Record cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(fields),
            ..
        }) => &fields.named,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Record can only be derived for structs with named fields",
            ))
        }
    };

    let record_name = attributes::extract_record_name(&input.attrs)?
        .unwrap_or_else(|| struct_name.unraw().to_string());

    let mut field_descriptors = Vec::new();
    let mut accessors = Vec::new();
    let mut param_names = Vec::new();
    let mut constructor_fields = Vec::new();
    let mut accessor_consts = Vec::new();

    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let field_type = &field.ty;
        let member = field_ident.unraw().to_string();
        let const_name = Ident::new(&utils::upper_snake_case(&member), Span::call_site());

        let ordinal = if attributes::is_ordinal(field)? {
            quote! { .ordinal() }
        } else {
            quote! {}
        };

        field_descriptors.push(quote! {
            .field(::rowbind::FieldDescriptor::of::<#field_type>(#member) #ordinal)
        });
        accessors.push(quote! {
            .accessor(#member, |record: &Self| {
                ::rowbind::ValueType::into_value(::core::clone::Clone::clone(&record.#field_ident))
            })
        });
        param_names.push(member.clone());
        constructor_fields.push(quote! {
            #field_ident: args.next::<#field_type>(#member)?
        });
        accessor_consts.push(quote! {
            pub const #const_name: ::rowbind::Accessor<Self, #field_type> =
                ::rowbind::Accessor::new(#member, |record: &Self| ::core::clone::Clone::clone(&record.#field_ident));
        });
    }

    Ok(quote! {
        impl ::rowbind::Record for #struct_name {
            fn descriptor() -> ::rowbind::RecordDescriptor<Self> {
                ::rowbind::RecordDescriptor::<Self>::new(#record_name)
                    #(#field_descriptors)*
                    #(#accessors)*
                    .constructor(
                        &[#(#param_names),*],
                        |values: ::std::vec::Vec<::rowbind::Value>| -> ::rowbind::Result<Self> {
                            let mut args = ::rowbind::ConstructorArgs::new(#record_name, values);
                            ::core::result::Result::Ok(Self {
                                #(#constructor_fields),*
                            })
                        },
                    )
            }

            fn record_name() -> &'static str {
                #record_name
            }
        }

        #[allow(dead_code)]
        impl #struct_name {
            #(#accessor_consts)*
        }
    })
}
