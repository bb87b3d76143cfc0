//! Parsing of `#[storm(...)]` attributes.

use syn::{Attribute, LitStr, Result};

/// Struct-level options.
#[derive(Default)]
pub(crate) struct RecordAttr {
    pub table: Option<String>,
}

/// Field-level options.
#[derive(Default)]
pub(crate) struct FieldAttr {
    pub pk: bool,
    pub column: Option<String>,
    pub tag: Option<String>,
    pub skip: bool,
}

impl FieldAttr {
    /// The directive string handed to `storm::tag::resolve`.
    ///
    /// A raw `tag` comes first so that explicit `pk`/`column` options win.
    pub fn directives(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(tag) = &self.tag {
            parts.push(tag.clone());
        }
        if self.pk {
            parts.push("pk".to_string());
        }
        if let Some(column) = &self.column {
            parts.push(format!("column:{column}"));
        }
        (!parts.is_empty()).then(|| parts.join(","))
    }
}

pub(crate) fn parse_record_attrs(attrs: &[Attribute]) -> Result<RecordAttr> {
    let mut out = RecordAttr::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("storm")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().trim().is_empty() {
                    return Err(meta.error("table name cannot be empty"));
                }
                out.table = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unsupported storm attribute, expected `table = \"...\"`"))
            }
        })?;
    }
    Ok(out)
}

pub(crate) fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    let mut out = FieldAttr::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("storm")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("pk") {
                out.pk = true;
            } else if meta.path.is_ident("skip") {
                out.skip = true;
            } else if meta.path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().trim().is_empty() {
                    return Err(meta.error("column name cannot be empty"));
                }
                out.column = Some(lit.value());
            } else if meta.path.is_ident("tag") {
                let lit: LitStr = meta.value()?.parse()?;
                out.tag = Some(lit.value());
            } else {
                return Err(meta.error(
                    "unsupported storm attribute, expected `pk`, `skip`, `column = \"...\"` or `tag = \"...\"`",
                ));
            }
            Ok(())
        })?;
    }
    Ok(out)
}
