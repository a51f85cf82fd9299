//! Attribute parsing utilities

use syn::{Attribute, Field, LitStr};

/// Record name from `#[rowbind(name = "...")]` on the struct
pub fn extract_record_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("rowbind")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported rowbind attribute on a record, expected `name = \"...\"`"))
            }
        })?;
    }
    Ok(name)
}

/// Whether the field carries `#[rowbind(ordinal)]`
pub fn is_ordinal(field: &Field) -> syn::Result<bool> {
    let mut ordinal = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("rowbind")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("ordinal") {
                ordinal = true;
                Ok(())
            } else {
                Err(meta.error("unsupported rowbind attribute on a field, expected `ordinal`"))
            }
        })?;
    }
    Ok(ordinal)
}
