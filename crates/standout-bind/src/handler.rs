//! Handler types.
//!
//! A handler is the unit of dispatch behavior bound to a key: it receives the
//! raw arguments for that key, coerces them, and either writes the result into
//! the destination or hands it to caller code.
//!
//! # Provenance
//!
//! - Default handlers ([`FieldHandler`]) come from discovery. Each one owns
//!   write access to exactly one field and assigns the coerced value to it.
//! - Override handlers are registered by the caller through
//!   [`Binder`](crate::Binder)'s `add_*` methods. They coerce the same way but
//!   pass the typed value to a callback instead of touching a field.
//!
//! In both cases coercion happens before any side effect, so a bad argument
//! leaves the destination untouched.

use chrono::TimeDelta;

use crate::coerce::{self, Kind};
use crate::error::HandlerError;
use crate::field::FieldBinding;

/// Trait for key handlers.
///
/// Handlers take `&mut self`, so they can keep state between dispatches, and
/// `&mut T`, the destination the binder was built over.
///
/// # Example
///
/// ```rust
/// use standout_bind::{Handler, HandlerError};
///
/// struct Settings { paths: Vec<String> }
///
/// /// Appends instead of replacing.
/// struct AppendPaths;
///
/// impl Handler<Settings> for AppendPaths {
///     fn handle(&mut self, dst: &mut Settings, args: &[String]) -> Result<(), HandlerError> {
///         dst.paths.extend(standout_bind::split_list(args));
///         Ok(())
///     }
/// }
/// ```
pub trait Handler<T> {
    /// Applies the raw arguments for a key.
    fn handle(&mut self, dst: &mut T, args: &[String]) -> Result<(), HandlerError>;
}

/// Boxed handler as stored by the binder.
pub type BoxedHandler<T> = Box<dyn Handler<T>>;

/// A wrapper that implements [`Handler`] for `FnMut` closures.
///
/// ```rust
/// use standout_bind::{FnHandler, Handler, HandlerError};
///
/// struct Settings { hits: i64 }
///
/// let mut handler = FnHandler::new(|dst: &mut Settings, args: &[String]| {
///     dst.hits += args.len() as i64;
///     Ok::<_, HandlerError>(())
/// });
///
/// let mut settings = Settings { hits: 0 };
/// handler.handle(&mut settings, &["a".into(), "b".into()]).unwrap();
/// assert_eq!(settings.hits, 2);
/// ```
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F> {
    /// Creates a new FnHandler wrapping the given closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<T, F> Handler<T> for FnHandler<F>
where
    F: FnMut(&mut T, &[String]) -> Result<(), HandlerError>,
{
    fn handle(&mut self, dst: &mut T, args: &[String]) -> Result<(), HandlerError> {
        (self.f)(dst, args)
    }
}

/// Default handler produced by discovery for one tagged field.
pub struct FieldHandler<T> {
    binding: FieldBinding<T>,
}

impl<T> FieldHandler<T> {
    pub fn new(binding: FieldBinding<T>) -> Self {
        Self { binding }
    }

    /// The kind this field coerces to.
    pub fn kind(&self) -> Kind {
        self.binding.tag.kind
    }
}

impl<T> Handler<T> for FieldHandler<T> {
    fn handle(&mut self, dst: &mut T, args: &[String]) -> Result<(), HandlerError> {
        let tag = &self.binding.tag;
        let value = coerce::coerce(tag.kind, &tag.choices, args)?;
        (self.binding.access)(dst).assign(value)
    }
}

/// Adapts a `bool` callback into a handler.
pub fn bool_handler<T, F>(mut f: F) -> impl Handler<T>
where
    F: FnMut(bool) -> anyhow::Result<()>,
{
    FnHandler::new(move |_: &mut T, args: &[String]| -> Result<(), HandlerError> {
        let value = coerce::parse_bool(coerce::first(Kind::Bool, args)?)?;
        f(value).map_err(HandlerError::Callback)
    })
}

/// Adapts an `i64` callback into a handler.
pub fn int_handler<T, F>(mut f: F) -> impl Handler<T>
where
    F: FnMut(i64) -> anyhow::Result<()>,
{
    FnHandler::new(move |_: &mut T, args: &[String]| -> Result<(), HandlerError> {
        let value = coerce::parse_int(coerce::first(Kind::Int, args)?)?;
        f(value).map_err(HandlerError::Callback)
    })
}

/// Adapts a [`TimeDelta`] callback into a handler.
pub fn duration_handler<T, F>(mut f: F) -> impl Handler<T>
where
    F: FnMut(TimeDelta) -> anyhow::Result<()>,
{
    FnHandler::new(move |_: &mut T, args: &[String]| -> Result<(), HandlerError> {
        let value = coerce::parse_duration(coerce::first(Kind::Duration, args)?)?;
        f(value).map_err(HandlerError::Callback)
    })
}

/// Adapts a string callback into a handler that only accepts `choices`.
pub fn enum_handler<T, F>(choices: Vec<String>, mut f: F) -> impl Handler<T>
where
    F: FnMut(String) -> anyhow::Result<()>,
{
    FnHandler::new(move |_: &mut T, args: &[String]| -> Result<(), HandlerError> {
        let value = coerce::choose(coerce::first(Kind::Enum, args)?, &choices)?;
        f(value).map_err(HandlerError::Callback)
    })
}

/// Adapts a string-list callback into a handler.
pub fn strings_handler<T, F>(mut f: F) -> impl Handler<T>
where
    F: FnMut(Vec<String>) -> anyhow::Result<()>,
{
    FnHandler::new(move |_: &mut T, args: &[String]| -> Result<(), HandlerError> {
        f(coerce::split_list(args)).map_err(HandlerError::Callback)
    })
}

/// Adapts a raw-argument callback into a handler. No coercion is applied.
pub fn raw_handler<T, F>(mut f: F) -> impl Handler<T>
where
    F: FnMut(&[String]) -> anyhow::Result<()>,
{
    FnHandler::new(move |_: &mut T, args: &[String]| -> Result<(), HandlerError> {
        f(args).map_err(HandlerError::Callback)
    })
}
