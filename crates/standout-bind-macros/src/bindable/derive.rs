//! Implementation of the `#[derive(Bindable)]` macro.
//!
//! Generates an implementation of the `Bindable` trait (one `FieldSlot` per
//! tagged field, in declaration order) and a key constant per tagged field.

use std::collections::HashMap;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::parse_bind_attrs;

/// Main implementation of the Bindable derive macro.
pub fn bindable_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Bindable can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Bindable can only be derived for structs",
            ))
        }
    };

    let mut slots: Vec<TokenStream> = Vec::new();
    let mut key_constants: Vec<TokenStream> = Vec::new();
    let mut seen_constants: HashMap<String, String> = HashMap::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let Some(bind) = parse_bind_attrs(&field.attrs)? else {
            continue;
        };

        let tag = &bind.tag;
        slots.push(quote! {
            ::standout_bind::FieldSlot::<Self>::new(#tag, |dst| &mut dst.#field_name)
        });

        // tags without a name never get a handler, so no constant either
        let Some(key) = bind.key() else {
            continue;
        };
        let const_name = to_const_ident(key);

        match seen_constants.get(&const_name) {
            // same key repeated: the later field's handler wins at discovery
            Some(existing) if existing == key => continue,
            Some(existing) => {
                return Err(Error::new(
                    bind.span,
                    format!(
                        "key {:?} and key {:?} both map to constant {}",
                        existing, key, const_name
                    ),
                ))
            }
            None => {
                seen_constants.insert(const_name.clone(), key.to_string());
            }
        }
        let const_ident = format_ident!("{}", const_name, span = bind.span);
        key_constants.push(quote! {
            /// Binding key constant.
            pub const #const_ident: &'static str = #key;
        });
    }

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#key_constants)*
        }

        impl #impl_generics ::standout_bind::Bindable for #struct_name #ty_generics #where_clause {
            fn bindable_fields() -> ::std::vec::Vec<::standout_bind::FieldSlot<Self>> {
                ::std::vec![
                    #(#slots),*
                ]
            }
        }
    };

    Ok(expanded)
}

/// Turns a key into a valid SCREAMING_SNAKE_CASE identifier.
fn to_const_ident(key: &str) -> String {
    let mut result = String::with_capacity(key.len() + 4);
    let mut prev_was_lower = false;

    for c in key.chars() {
        if c.is_ascii_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = c.is_ascii_lowercase();
        } else {
            result.push('_');
            prev_was_lower = false;
        }
    }

    if result.is_empty() || result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_const_ident() {
        assert_eq!(to_const_ident("level"), "LEVEL");
        assert_eq!(to_const_ident("max_retries"), "MAX_RETRIES");
        assert_eq!(to_const_ident("maxRetries"), "MAX_RETRIES");
        assert_eq!(to_const_ident("log-level"), "LOG_LEVEL");
        assert_eq!(to_const_ident("http.timeout"), "HTTP_TIMEOUT");
        assert_eq!(to_const_ident("2fa"), "_2FA");
    }

    #[test]
    fn test_derive_emits_slots_and_constants() {
        let input: DeriveInput = parse_quote! {
            struct Settings {
                #[bind("verbose,bool")]
                verbose: bool,
                #[bind("level,enum,low|mid|high")]
                level: String,
                cache: Vec<u8>,
            }
        };

        let output = bindable_derive_impl(input).unwrap().to_string();
        assert!(output.contains("\"verbose,bool\""));
        assert!(output.contains("\"level,enum,low|mid|high\""));
        assert!(output.contains("VERBOSE"));
        assert!(output.contains("LEVEL"));
        assert!(!output.contains("cache"));
    }

    #[test]
    fn test_derive_skips_constant_for_unnamed_tag() {
        let input: DeriveInput = parse_quote! {
            struct Settings {
                #[bind(",bool")]
                quiet: bool,
            }
        };

        let output = bindable_derive_impl(input).unwrap().to_string();
        assert!(output.contains("\",bool\""));
        assert!(!output.contains("QUIET"));
    }

    #[test]
    fn test_derive_rejects_constant_clash_between_keys() {
        let input: DeriveInput = parse_quote! {
            struct Settings {
                #[bind("log-level,enum,info|warn")]
                dashed: String,
                #[bind("log_level,enum,info|warn")]
                underscored: String,
            }
        };

        let err = bindable_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("LOG_LEVEL"));
    }

    #[test]
    fn test_derive_repeated_key_emits_one_constant() {
        let input: DeriveInput = parse_quote! {
            struct Settings {
                #[bind("mode,bool")]
                flag: bool,
                #[bind("mode,enum,a|b")]
                mode: String,
            }
        };

        let output = bindable_derive_impl(input).unwrap().to_string();
        assert_eq!(output.matches("const MODE").count(), 1);
    }

    #[test]
    fn test_derive_rejects_enums() {
        let input: DeriveInput = parse_quote! {
            enum Mode { Dev, Prod }
        };
        let err = bindable_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("only be derived for structs"));
    }

    #[test]
    fn test_derive_rejects_tuple_structs() {
        let input: DeriveInput = parse_quote! {
            struct Pair(#[bind("a,bool")] bool);
        };
        let err = bindable_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("named fields"));
    }
}
