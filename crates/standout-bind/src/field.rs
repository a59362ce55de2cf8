//! Field discovery from binding tags.
//!
//! A destination type describes its bindable fields through [`Bindable`]: a
//! table of [`FieldSlot`]s, each pairing a tag string with an accessor that
//! grants write access to exactly one field. The table is usually generated by
//! `#[derive(Bindable)]`, but can be written by hand.
//!
//! # Tag Grammar
//!
//! ```text
//! name[,kind[,choice1|choice2|...]]
//! ```
//!
//! - `name` is the dispatch key.
//! - `kind` is one of `bool`, `int`, `duration`, `enum`, `strings`.
//! - The third segment is required for `enum` and rejected for anything else.
//!
//! Discovery is advisory: a slot whose tag does not parse, or whose kind does
//! not fit the field's Rust type, is skipped without error.
//!
//! # Field Types
//!
//! | Kind | Field type |
//! |------|------------|
//! | `bool` | `bool` |
//! | `int` | `i64` |
//! | `duration` | `chrono::TimeDelta` |
//! | `enum` | `String` |
//! | `strings` | `Vec<String>` |

use chrono::TimeDelta;
use tracing::debug;

use crate::coerce::{Kind, Value};
use crate::error::{HandlerError, TagError};

/// A parsed binding tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTag {
    /// The dispatch key.
    pub name: String,
    /// The kind raw arguments coerce to.
    pub kind: Kind,
    /// Permitted values, in declaration order. Empty unless `kind` is `Enum`.
    pub choices: Vec<String>,
}

impl FieldTag {
    /// Parses a tag of the form `name,kind[,a|b|c]`.
    pub fn parse(tag: &str) -> Result<Self, TagError> {
        let mut parts = tag.split(',');

        let name = parts.next().unwrap_or_default().trim();
        if name.is_empty() {
            return Err(TagError::MissingName);
        }

        let kind: Kind = match parts.next().map(str::trim) {
            Some(kind) if !kind.is_empty() => kind.parse()?,
            _ => return Err(TagError::MissingKind),
        };

        let choices = match (kind, parts.next()) {
            (Kind::Enum, Some(list)) => {
                let choices: Vec<String> = list.split('|').map(String::from).collect();
                if choices.iter().all(String::is_empty) {
                    return Err(TagError::MissingChoices);
                }
                choices
            }
            (Kind::Enum, None) => return Err(TagError::MissingChoices),
            (_, Some(_)) => return Err(TagError::UnexpectedChoices),
            (_, None) => Vec::new(),
        };

        if parts.next().is_some() {
            return Err(TagError::TooManySegments);
        }

        Ok(FieldTag {
            name: name.to_string(),
            kind,
            choices,
        })
    }
}

/// A field type that can receive coerced values.
///
/// Implemented for the Rust type backing each [`Kind`].
pub trait BindTarget {
    /// Returns true if values of `kind` can be assigned to this field.
    fn accepts(&self, kind: Kind) -> bool;

    /// Writes a coerced value into the field.
    fn assign(&mut self, value: Value) -> Result<(), HandlerError>;
}

macro_rules! bind_target {
    ($ty:ty, $kind:ident) => {
        impl BindTarget for $ty {
            fn accepts(&self, kind: Kind) -> bool {
                kind == Kind::$kind
            }

            fn assign(&mut self, value: Value) -> Result<(), HandlerError> {
                match value {
                    Value::$kind(v) => {
                        *self = v;
                        Ok(())
                    }
                    other => Err(HandlerError::KindMismatch {
                        expected: Kind::$kind,
                        found: other.kind(),
                    }),
                }
            }
        }
    };
}

bind_target!(bool, Bool);
bind_target!(i64, Int);
bind_target!(TimeDelta, Duration);
bind_target!(String, Enum);
bind_target!(Vec<String>, Strings);

/// Accessor granting write access to one field of `T`.
pub type FieldAccess<T> = fn(&mut T) -> &mut dyn BindTarget;

/// One entry of a destination's binding table: a tag and the field it names.
pub struct FieldSlot<T> {
    tag: &'static str,
    access: FieldAccess<T>,
}

impl<T> FieldSlot<T> {
    /// Creates a slot from a tag string and a field accessor.
    ///
    /// ```rust
    /// use standout_bind::FieldSlot;
    ///
    /// struct Settings { verbose: bool }
    ///
    /// let slot = FieldSlot::<Settings>::new("verbose,bool", |s| &mut s.verbose);
    /// assert_eq!(slot.tag(), "verbose,bool");
    /// ```
    pub fn new(tag: &'static str, access: FieldAccess<T>) -> Self {
        Self { tag, access }
    }

    /// The raw tag string.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// The field accessor.
    pub fn access(&self) -> FieldAccess<T> {
        self.access
    }
}

impl<T> Clone for FieldSlot<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FieldSlot<T> {}

impl<T> std::fmt::Debug for FieldSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSlot").field("tag", &self.tag).finish()
    }
}

/// Types whose fields can be bound to keys.
///
/// Usually derived:
///
/// ```rust
/// use standout_bind::Bindable;
///
/// #[derive(Bindable, Default)]
/// struct Settings {
///     #[bind("verbose,bool")]
///     verbose: bool,
///     #[bind("level,enum,low|mid|high")]
///     level: String,
///     // untagged fields are not bindable
///     cache: Vec<u8>,
/// }
///
/// assert_eq!(Settings::bindable_fields().len(), 2);
/// assert_eq!(Settings::LEVEL, "level");
/// ```
///
/// Or written by hand as an explicit table:
///
/// ```rust
/// use standout_bind::{Bindable, FieldSlot};
///
/// struct Settings { retries: i64 }
///
/// impl Bindable for Settings {
///     fn bindable_fields() -> Vec<FieldSlot<Self>> {
///         vec![FieldSlot::<Self>::new("retries,int", |s| &mut s.retries)]
///     }
/// }
/// ```
pub trait Bindable: Sized {
    /// Returns the binding table, in field declaration order.
    fn bindable_fields() -> Vec<FieldSlot<Self>>;
}

/// A slot whose tag parsed and whose field accepts the tag's kind.
pub struct FieldBinding<T> {
    pub tag: FieldTag,
    pub access: FieldAccess<T>,
}

impl<T> Clone for FieldBinding<T> {
    fn clone(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            access: self.access,
        }
    }
}

impl<T> std::fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBinding")
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

/// Resolves the binding table of `T` against a live destination.
///
/// Slots with malformed tags, or whose kind the field cannot hold, are
/// dropped. The destination is only read (to ask each field which kinds it
/// accepts), never written.
pub fn discover<T: Bindable>(dst: &mut T) -> Vec<FieldBinding<T>> {
    T::bindable_fields()
        .into_iter()
        .filter_map(|slot| match resolve(&slot, dst) {
            Ok(tag) => Some(FieldBinding {
                tag,
                access: slot.access,
            }),
            Err(err) => {
                debug!("skipping binding tag {:?}: {}", slot.tag, err);
                None
            }
        })
        .collect()
}

fn resolve<T>(slot: &FieldSlot<T>, dst: &mut T) -> Result<FieldTag, TagError> {
    let tag = FieldTag::parse(slot.tag)?;
    if (slot.access)(dst).accepts(tag.kind) {
        Ok(tag)
    } else {
        Err(TagError::Unsupported(tag.kind))
    }
}
