//! Record derive macro implementation

use crate::attrs::{parse_field_attrs, parse_record_attrs};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let record_attr = parse_record_attrs(&input.attrs)?;
    let table = record_attr.table.map(|table| quote! { .table(#table) });

    let mut registrations = Vec::with_capacity(fields.len());
    for field in fields {
        let attr = parse_field_attrs(&field.attrs)?;
        if attr.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let field_name = ident.to_string();
        let tag = match attr.directives() {
            Some(directives) => quote! { ::core::option::Option::Some(#directives) },
            None => quote! { ::core::option::Option::None },
        };
        registrations.push(quote! {
            .field(#field_name, #tag, |r| &r.#ident, |r| &mut r.#ident)
        });
    }

    let record_name = name.to_string();

    Ok(quote! {
        impl ::storm::Record for #name {
            fn schema() -> &'static ::storm::RecordSchema<Self> {
                static SCHEMA: ::std::sync::OnceLock<::storm::RecordSchema<#name>> =
                    ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    ::storm::RecordSchema::<#name>::builder(#record_name)
                        #table
                        #(#registrations)*
                        .build()
                })
            }
        }
    })
}
