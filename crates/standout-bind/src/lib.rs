//! Key-to-handler binding for typed settings.
//!
//! `standout-bind` routes keyed raw string arguments (from flags, environment
//! variables, config entries, a control socket...) into a strongly typed
//! destination struct. Each key maps to a handler that coerces the arguments
//! into one of a few primitive kinds and then either writes a field or calls
//! back into application code.
//!
//! # Features
//!
//! - **Field discovery**: `#[derive(Bindable)]` plus `#[bind("name,kind")]` tags
//!   turn struct fields into default handlers
//! - **Coercion**: `bool`, `int`, `duration`, `enum` (ordered choice set) and
//!   `strings` (`a:b:c` lists)
//! - **Overrides**: replace or add handlers with typed callbacks
//! - **Hooks**: observe each key before and after its handler runs
//! - **Batch dispatch**: apply many keys, stopping at the first failure
//! - **Backup**: optional JSON snapshot of the destination at construction
//!
//! # Quick Start
//!
//! ```rust
//! use standout_bind::{Bindable, Binder};
//!
//! #[derive(Bindable, Default)]
//! struct Settings {
//!     #[bind("verbose,bool")]
//!     verbose: bool,
//!     #[bind("paths,strings")]
//!     paths: Vec<String>,
//! }
//!
//! let mut settings = Settings::default();
//! let mut binder = Binder::without_backup(&mut settings);
//!
//! binder.before_hook(Settings::PATHS, |key, args| println!("{key} <- {args:?}"));
//! binder.dispatch_batch([
//!     (Settings::VERBOSE, vec!["true".to_string()]),
//!     (Settings::PATHS, vec!["/etc:/usr/etc".to_string()]),
//! ])?;
//!
//! drop(binder);
//! assert!(settings.verbose);
//! assert_eq!(settings.paths, ["/etc", "/usr/etc"]);
//! # Ok::<(), standout_bind::DispatchError>(())
//! ```
//!
//! # Logging
//!
//! The crate emits `tracing` events (discovery skips and dispatch failures at
//! `debug`, per-dispatch detail at `trace`, backups at `info`). Nothing is
//! printed unless the application installs a subscriber.

mod backup;
mod binder;
mod coerce;
mod error;
mod field;
mod handler;
mod hooks;

pub use backup::{backup_path, write_backup};

pub use binder::{Binder, BinderBuilder};

pub use coerce::{
    choose, coerce, duration_serde, format_duration, parse_bool, parse_duration, parse_int,
    split_list, Kind, Value, LIST_SEPARATOR,
};

pub use error::{CoerceError, ConstructionError, DispatchError, HandlerError, TagError};

pub use field::{discover, BindTarget, Bindable, FieldAccess, FieldBinding, FieldSlot, FieldTag};

pub use handler::{
    bool_handler, duration_handler, enum_handler, int_handler, raw_handler, strings_handler,
    BoxedHandler, FieldHandler, FnHandler, Handler,
};

pub use hooks::{HookFn, HookPhase, HookRegistry, Hooks};

#[cfg(feature = "derive")]
pub use standout_bind_macros::Bindable;
