//! The binder: key → handler registry and dispatch.
//!
//! A [`Binder`] is built over a mutable destination. Construction optionally
//! snapshots the destination to disk, then runs discovery once to seed one
//! default handler per tagged field. After that, overrides, hook registration
//! and dispatch can be interleaved freely; there is no sealed state.
//!
//! # Dispatch
//!
//! [`Binder::dispatch`] runs, in order:
//!
//! 1. every before-hook for the key;
//! 2. the handler lookup, failing with [`DispatchError::NoHandler`] if there is
//!    none (after-hooks do not run in that case);
//! 3. the handler;
//! 4. every after-hook for the key, whatever the handler returned;
//! 5. returns the handler's outcome.
//!
//! # Example
//!
//! ```rust
//! use standout_bind::{Bindable, Binder};
//!
//! #[derive(Bindable, Default)]
//! struct Settings {
//!     #[bind("verbose,bool")]
//!     verbose: bool,
//!     #[bind("level,enum,low|mid|high")]
//!     level: String,
//! }
//!
//! let mut settings = Settings::default();
//! let mut binder = Binder::without_backup(&mut settings);
//!
//! binder.dispatch("level", &["mid".into()])?;
//! assert!(binder.dispatch("level", &["extreme".into()]).is_err());
//! assert!(binder.dispatch("missing", &[]).is_err());
//!
//! drop(binder);
//! assert_eq!(settings.level, "mid");
//! # Ok::<(), standout_bind::DispatchError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{TimeDelta, Utc};
use serde::Serialize;
use tracing::{debug, trace};

use crate::backup::write_backup;
use crate::error::{ConstructionError, DispatchError};
use crate::field::{self, Bindable};
use crate::handler::{self, BoxedHandler, FieldHandler, Handler};
use crate::hooks::{HookPhase, HookRegistry, Hooks};

/// Dispatches keyed raw arguments to handlers that mutate a destination.
///
/// The binder borrows the destination mutably for its whole lifetime; the
/// destination is only ever written from inside a handler.
pub struct Binder<'a, T> {
    dst: &'a mut T,
    handlers: HashMap<String, BoxedHandler<T>>,
    hooks: HookRegistry,
    backup: Option<PathBuf>,
}

impl<'a, T> Binder<'a, T>
where
    T: Bindable + Serialize + 'static,
{
    /// Creates a binder, writing a JSON snapshot of `dst` under `backup_dir`
    /// first if `enable_backup` is set.
    ///
    /// Fails only if the snapshot cannot be written.
    pub fn new(
        dst: &'a mut T,
        backup_dir: impl AsRef<Path>,
        enable_backup: bool,
    ) -> Result<Self, ConstructionError> {
        Self::builder(dst)
            .backup_dir(backup_dir.as_ref())
            .backup(enable_backup)
            .build()
    }

    /// Starts building a binder over `dst`.
    pub fn builder(dst: &'a mut T) -> BinderBuilder<'a, T> {
        BinderBuilder {
            dst,
            backup_dir: None,
            backup: false,
        }
    }
}

impl<'a, T> Binder<'a, T>
where
    T: Bindable + 'static,
{
    /// Creates a binder with no snapshot. Never fails.
    pub fn without_backup(dst: &'a mut T) -> Self {
        Self::seed(dst, None)
    }

    fn seed(dst: &'a mut T, backup: Option<PathBuf>) -> Self {
        let mut handlers: HashMap<String, BoxedHandler<T>> = HashMap::new();
        for binding in field::discover(&mut *dst) {
            let key = binding.tag.name.clone();
            handlers.insert(key, Box::new(FieldHandler::new(binding)));
        }
        debug!("discovered {} bindable field(s)", handlers.len());

        Self {
            dst,
            handlers,
            hooks: HookRegistry::new(),
            backup,
        }
    }

    /// Registers `handler` for `key`, replacing any previous handler.
    ///
    /// The handler receives the destination, so it can mutate it in ways a
    /// plain field assignment cannot.
    pub fn set_handler<H>(&mut self, key: impl Into<String>, handler: H)
    where
        H: Handler<T> + 'static,
    {
        let key = key.into();
        if self.handlers.contains_key(&key) {
            debug!("replacing handler for {}", key);
        }
        self.handlers.insert(key, Box::new(handler));
    }

    /// Overrides `key` with a boolean callback.
    pub fn add_bool<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: FnMut(bool) -> anyhow::Result<()> + 'static,
    {
        self.set_handler(key, handler::bool_handler::<T, F>(f));
    }

    /// Overrides `key` with an integer callback.
    pub fn add_int<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: FnMut(i64) -> anyhow::Result<()> + 'static,
    {
        self.set_handler(key, handler::int_handler::<T, F>(f));
    }

    /// Overrides `key` with a duration callback.
    pub fn add_duration<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: FnMut(TimeDelta) -> anyhow::Result<()> + 'static,
    {
        self.set_handler(key, handler::duration_handler::<T, F>(f));
    }

    /// Overrides `key` with a callback that only accepts one of `choices`.
    pub fn add_enum<I, S, F>(&mut self, key: impl Into<String>, choices: I, f: F)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnMut(String) -> anyhow::Result<()> + 'static,
    {
        let choices = choices.into_iter().map(Into::into).collect();
        self.set_handler(key, handler::enum_handler::<T, F>(choices, f));
    }

    /// Overrides `key` with a string-list callback.
    pub fn add_strings<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: FnMut(Vec<String>) -> anyhow::Result<()> + 'static,
    {
        self.set_handler(key, handler::strings_handler::<T, F>(f));
    }

    /// Overrides `key` with a callback that receives the raw arguments.
    pub fn add_handler<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: FnMut(&[String]) -> anyhow::Result<()> + 'static,
    {
        self.set_handler(key, handler::raw_handler::<T, F>(f));
    }

    /// Appends a hook that runs before the handler for `key`.
    pub fn before_hook<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: Fn(&str, &[String]) + 'static,
    {
        self.hooks.add(HookPhase::Before, key, f);
    }

    /// Appends a hook that runs after the handler for `key`.
    pub fn after_hook<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: Fn(&str, &[String]) + 'static,
    {
        self.hooks.add(HookPhase::After, key, f);
    }

    /// Appends a prepared set of hooks for `key`.
    pub fn hooks(&mut self, key: impl Into<String>, hooks: Hooks) {
        self.hooks.extend(key, hooks);
    }

    /// Applies `args` to the handler for `key`, running its hooks around it.
    pub fn dispatch(&mut self, key: &str, args: &[String]) -> Result<(), DispatchError> {
        trace!("dispatching {} with {} argument(s)", key, args.len());
        self.hooks.run(HookPhase::Before, key, args);

        let Some(handler) = self.handlers.get_mut(key) else {
            debug!("no handler for key {}", key);
            return Err(DispatchError::NoHandler {
                key: key.to_string(),
            });
        };
        let outcome = handler.handle(self.dst, args);

        self.hooks.run(HookPhase::After, key, args);

        outcome.map_err(|source| {
            debug!("dispatch of {} failed: {}", key, source);
            DispatchError::Handler {
                key: key.to_string(),
                source,
            }
        })
    }

    /// Dispatches each `(key, args)` entry in iteration order, stopping at the
    /// first failure.
    ///
    /// Entries before the failing one stay applied; entries after it are not
    /// dispatched. Pass an ordered collection (`Vec`, slice, `BTreeMap`) when
    /// the order matters: a `HashMap` is accepted but iterates in no
    /// particular order.
    pub fn dispatch_batch<I, K, A>(&mut self, entries: I) -> Result<(), DispatchError>
    where
        I: IntoIterator<Item = (K, A)>,
        K: AsRef<str>,
        A: AsRef<[String]>,
    {
        for (key, args) in entries {
            self.dispatch(key.as_ref(), args.as_ref())?;
        }
        Ok(())
    }

    /// Returns true if `key` has a handler.
    pub fn has_handler(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// All keys with a handler, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Read access to the destination.
    pub fn target(&self) -> &T {
        &*self.dst
    }

    /// The snapshot written at construction, if backup was enabled.
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup.as_deref()
    }
}

impl<T> fmt::Debug for Binder<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.handlers.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Binder")
            .field("keys", &keys)
            .field("hooks", &self.hooks)
            .field("backup", &self.backup)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Binder`].
///
/// ```rust,no_run
/// use standout_bind::{Bindable, Binder};
/// use serde::Serialize;
///
/// #[derive(Bindable, Serialize, Default)]
/// struct Settings {
///     #[bind("retries,int")]
///     retries: i64,
/// }
///
/// let mut settings = Settings::default();
/// let binder = Binder::builder(&mut settings)
///     .backup_dir("/var/lib/myapp/backups")
///     .backup(true)
///     .build()?;
/// # Ok::<(), standout_bind::ConstructionError>(())
/// ```
pub struct BinderBuilder<'a, T> {
    dst: &'a mut T,
    backup_dir: Option<PathBuf>,
    backup: bool,
}

impl<'a, T> BinderBuilder<'a, T>
where
    T: Bindable + Serialize + 'static,
{
    /// Sets the directory backups are written to.
    pub fn backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = Some(dir.into());
        self
    }

    /// Enables or disables the construction-time snapshot. Off by default.
    pub fn backup(mut self, enabled: bool) -> Self {
        self.backup = enabled;
        self
    }

    /// Writes the snapshot if enabled, then runs discovery.
    pub fn build(self) -> Result<Binder<'a, T>, ConstructionError> {
        let backup = if self.backup {
            let dir = self.backup_dir.ok_or(ConstructionError::MissingBackupDir)?;
            Some(write_backup(&dir, &*self.dst, Utc::now())?)
        } else {
            None
        };
        Ok(Binder::seed(self.dst, backup))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoerceError, HandlerError};
    use crate::field::FieldSlot;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Debug, Default, Serialize)]
    struct Settings {
        verbose: bool,
        level: String,
        count: i64,
    }

    impl Bindable for Settings {
        fn bindable_fields() -> Vec<FieldSlot<Self>> {
            vec![
                FieldSlot::<Self>::new("verbose,bool", |s| &mut s.verbose),
                FieldSlot::<Self>::new("level,enum,low|mid|high", |s| &mut s.level),
                FieldSlot::<Self>::new("count,int", |s| &mut s.count),
            ]
        }
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_discovery_seeds_handlers() {
        let mut settings = Settings::default();
        let binder = Binder::without_backup(&mut settings);
        assert_eq!(binder.keys(), vec!["count", "level", "verbose"]);
        assert!(binder.backup_path().is_none());
    }

    #[test]
    fn test_dispatch_writes_field() {
        let mut settings = Settings::default();
        let mut binder = Binder::without_backup(&mut settings);

        binder.dispatch("level", &args(&["mid"])).unwrap();
        binder.dispatch("verbose", &args(&["true"])).unwrap();
        assert_eq!(binder.target().level, "mid");

        drop(binder);
        assert!(settings.verbose);
    }

    #[test]
    fn test_dispatch_validation_failure() {
        let mut settings = Settings::default();
        let mut binder = Binder::without_backup(&mut settings);

        let err = binder.dispatch("level", &args(&["extreme"])).unwrap_err();
        assert!(err.to_string().contains("low|mid|high"));
        assert!(matches!(
            err.coerce_error(),
            Some(CoerceError::Validation { .. })
        ));
        assert_eq!(binder.target().level, "");
    }

    #[test]
    fn test_dispatch_unknown_key() {
        let mut settings = Settings::default();
        let mut binder = Binder::without_backup(&mut settings);

        let err = binder.dispatch("missing", &[]).unwrap_err();
        assert_eq!(err.to_string(), "no handler for key missing");
    }

    #[test]
    fn test_override_replaces_default() {
        let seen = Rc::new(Cell::new(None));
        let seen_clone = seen.clone();

        let mut settings = Settings::default();
        let mut binder = Binder::without_backup(&mut settings);
        binder.add_bool("verbose", move |v| {
            seen_clone.set(Some(v));
            Ok(())
        });

        binder.dispatch("verbose", &args(&["true"])).unwrap();
        assert_eq!(seen.get(), Some(true));
        assert!(!binder.target().verbose);
    }

    #[test]
    fn test_second_override_wins() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (first, second) = (log.clone(), log.clone());

        let mut settings = Settings::default();
        let mut binder = Binder::without_backup(&mut settings);
        binder.add_int("count", move |n| {
            first.borrow_mut().push(("first", n));
            Ok(())
        });
        binder.add_int("count", move |n| {
            second.borrow_mut().push(("second", n));
            Ok(())
        });

        binder.dispatch("count", &args(&["5"])).unwrap();
        assert_eq!(*log.borrow(), vec![("second", 5)]);
    }

    #[test]
    fn test_override_for_new_key() {
        let mut settings = Settings::default();
        let mut binder = Binder::without_backup(&mut settings);
        assert!(!binder.has_handler("mode"));

        binder.add_enum("mode", ["dev", "prod"], |_| Ok(()));
        assert!(binder.has_handler("mode"));
        assert!(binder.dispatch("mode", &args(&["prod"])).is_ok());
        assert!(binder.dispatch("mode", &args(&["qa"])).is_err());
    }

    #[test]
    fn test_set_handler_can_mutate_destination() {
        let mut settings = Settings::default();
        let mut binder = Binder::without_backup(&mut settings);
        binder.set_handler(
            "count",
            handler::FnHandler::new(|dst: &mut Settings, args: &[String]| {
                dst.count += args.len() as i64;
                Ok::<_, HandlerError>(())
            }),
        );

        binder.dispatch("count", &args(&["a", "b", "c"])).unwrap();
        assert_eq!(binder.target().count, 3);
    }

    #[test]
    fn test_hooks_wrap_handler() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (before, after, inner) = (log.clone(), log.clone(), log.clone());

        let mut settings = Settings::default();
        let mut binder = Binder::without_backup(&mut settings);
        binder.before_hook("count", move |k, _| before.borrow_mut().push(format!("before {k}")));
        binder.after_hook("count", move |k, _| after.borrow_mut().push(format!("after {k}")));
        binder.add_int("count", move |n| {
            inner.borrow_mut().push(format!("handler {n}"));
            Ok(())
        });

        binder.dispatch("count", &args(&["7"])).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["before count", "handler 7", "after count"]
        );
    }

    #[test]
    fn test_after_hooks_run_on_handler_failure() {
        let after = Rc::new(Cell::new(0));
        let after_clone = after.clone();

        let mut settings = Settings::default();
        let mut binder = Binder::without_backup(&mut settings);
        binder.after_hook("count", move |_, _| after_clone.set(after_clone.get() + 1));

        assert!(binder.dispatch("count", &args(&["nope"])).is_err());
        assert_eq!(after.get(), 1);
    }

    #[test]
    fn test_no_handler_skips_after_hooks() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let (before, after) = (calls.clone(), calls.clone());

        let mut settings = Settings::default();
        let mut binder = Binder::without_backup(&mut settings);
        binder.before_hook("ghost", move |_, _| before.borrow_mut().push("before"));
        binder.after_hook("ghost", move |_, _| after.borrow_mut().push("after"));

        assert!(binder.dispatch("ghost", &[]).unwrap_err().is_no_handler());
        assert_eq!(*calls.borrow(), vec!["before"]);
    }

    #[test]
    fn test_prepared_hooks() {
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        let mut settings = Settings::default();
        let mut binder = Binder::without_backup(&mut settings);
        binder.hooks(
            "verbose",
            Hooks::new().after(move |_, _| count_clone.set(count_clone.get() + 1)),
        );

        binder.dispatch("verbose", &args(&["1"])).unwrap();
        binder.dispatch("verbose", &args(&["0"])).unwrap();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_batch_stops_at_first_failure() {
        let mut settings = Settings::default();
        let mut binder = Binder::without_backup(&mut settings);

        let err = binder
            .dispatch_batch(vec![
                ("verbose", args(&["true"])),
                ("count", args(&["many"])),
                ("level", args(&["high"])),
            ])
            .unwrap_err();

        assert_eq!(err.key(), "count");
        drop(binder);
        assert!(settings.verbose);
        assert_eq!(settings.level, "");
    }

    #[test]
    fn test_builder_requires_dir_for_backup() {
        let mut settings = Settings::default();
        let err = Binder::builder(&mut settings).backup(true).build().unwrap_err();
        assert!(matches!(err, ConstructionError::MissingBackupDir));
    }

    #[test]
    fn test_new_without_backup_touches_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("never");

        let mut settings = Settings::default();
        let binder = Binder::new(&mut settings, &dir, false).unwrap();

        assert!(binder.backup_path().is_none());
        assert!(!dir.exists());
    }

    #[test]
    fn test_debug_lists_keys() {
        let mut settings = Settings::default();
        let binder = Binder::without_backup(&mut settings);
        let debug = format!("{:?}", binder);
        assert!(debug.contains("\"count\""));
        assert!(debug.contains("\"verbose\""));
    }
}
