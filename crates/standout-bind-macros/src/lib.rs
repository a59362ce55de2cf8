//! Proc macros for standout-bind.
//!
//! # Derive Macros
//!
//! - [`Bindable`] - Generate a binding table and key constants from
//!   `#[bind("...")]` field tags
//!
//! The generated code refers to `::standout_bind`, so use the macro through
//! the `standout-bind` crate (its `derive` feature is on by default) rather
//! than depending on this crate directly.
//!
//! # Examples
//!
//! For working examples, see `standout-bind/tests/bindable_derive.rs`.

mod bindable;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Bindable` trait for settings structs.
///
/// Every field carrying a `#[bind("...")]` attribute becomes one entry of the
/// binding table, in declaration order. Untagged fields are ignored.
///
/// # Field Attributes
///
/// | Tag | Field type |
/// |-----|------------|
/// | `"name,bool"` | `bool` |
/// | `"name,int"` | `i64` |
/// | `"name,duration"` | `chrono::TimeDelta` |
/// | `"name,enum,a\|b\|c"` | `String` |
/// | `"name,strings"` | `Vec<String>` |
///
/// Tags are validated when the binder is built, not at compile time: a
/// malformed tag, or one whose kind does not match the field type, is skipped.
///
/// # Generated Code
///
/// 1. A `pub const` per tagged field holding its key, named in
///    SCREAMING_SNAKE_CASE (`"max-retries"` becomes `MAX_RETRIES`)
/// 2. Implementation of `Bindable::bindable_fields()`
///
/// # Example
///
/// ```ignore
/// use standout_bind::{Bindable, Binder};
///
/// #[derive(Bindable, Default)]
/// struct Settings {
///     #[bind("verbose,bool")]
///     verbose: bool,
///
///     #[bind("level,enum,low|mid|high")]
///     level: String,
///
///     // not bindable
///     history: Vec<String>,
/// }
///
/// let mut settings = Settings::default();
/// let mut binder = Binder::without_backup(&mut settings);
/// binder.dispatch(Settings::LEVEL, &["high".into()])?;
/// ```
#[proc_macro_derive(Bindable, attributes(bind))]
pub fn bindable_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    bindable::bindable_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
