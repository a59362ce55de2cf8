//! Attribute parsing for the Bindable derive macro.
//!
//! A bindable field carries exactly one `#[bind("...")]` attribute whose
//! argument is the binding tag as a string literal. The tag itself is only
//! checked at runtime, by discovery; here we just extract it and work out the
//! key name used for the generated constant.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    Attribute, Error, LitStr, Result,
};

/// Field-level attribute from `#[bind("name,kind[,choices]")]`.
#[derive(Debug, Clone)]
pub struct BindAttr {
    /// The raw tag string, passed through unchanged.
    pub tag: String,
    /// The span for error reporting.
    pub span: Span,
}

impl BindAttr {
    /// The key named by the tag, if the tag has a non-empty first segment.
    pub fn key(&self) -> Option<&str> {
        let name = self.tag.split(',').next().unwrap_or_default().trim();
        (!name.is_empty()).then_some(name)
    }
}

impl Parse for BindAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let lit: LitStr = input.parse().map_err(|err| {
            Error::new(
                err.span(),
                "expected a tag string: #[bind(\"name,kind[,a|b|c]\")]",
            )
        })?;
        if !input.is_empty() {
            return Err(input.error("unexpected tokens after bind tag"));
        }
        Ok(BindAttr {
            tag: lit.value(),
            span: lit.span(),
        })
    }
}

/// Extract the `#[bind(...)]` attribute from a field's attributes.
///
/// Returns `None` for untagged fields and an error if the attribute appears
/// more than once.
pub fn parse_bind_attrs(attrs: &[Attribute]) -> Result<Option<BindAttr>> {
    let mut found: Option<BindAttr> = None;
    for attr in attrs {
        if !attr.path().is_ident("bind") {
            continue;
        }
        let parsed = attr.parse_args::<BindAttr>()?;
        if found.is_some() {
            return Err(Error::new(parsed.span, "duplicate #[bind] attribute"));
        }
        found = Some(parsed);
    }
    Ok(found)
}
