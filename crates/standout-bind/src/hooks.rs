//! Hook system for observing dispatch.
//!
//! Hooks run around a key's handler without taking part in it. They see the
//! key and the raw arguments, cannot change either, and have no way to fail
//! or to influence the dispatch outcome.
//!
//! # Pipeline Position
//!
//! ```text
//! dispatch(key, args)
//!   → BEFORE HOOKS ← (always, even when the key has no handler)
//!   → handler lookup ── missing → "no handler for key" (after hooks skipped)
//!   → handler(args)
//!   → AFTER HOOKS  ← (always, whether the handler succeeded or failed)
//!   → handler outcome
//! ```
//!
//! Hooks for a key run in the order they were registered.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

/// Type alias for hook functions: `(key, raw arguments)`.
pub type HookFn = Rc<dyn Fn(&str, &[String])>;

/// Which side of the handler a hook runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Before,
    After,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::Before => write!(f, "before"),
            HookPhase::After => write!(f, "after"),
        }
    }
}

/// The hook chains of a single key.
#[derive(Clone, Default)]
pub struct Hooks {
    before: Vec<HookFn>,
    after: Vec<HookFn>,
}

impl Hooks {
    /// Creates a new empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }

    /// Number of hooks registered for a phase.
    pub fn count(&self, phase: HookPhase) -> usize {
        self.chain(phase).len()
    }

    /// Adds a before-hook.
    ///
    /// # Example
    ///
    /// ```rust
    /// use standout_bind::Hooks;
    ///
    /// let hooks = Hooks::new()
    ///     .before(|key, args| eprintln!("setting {key} from {args:?}"))
    ///     .after(|key, _| eprintln!("{key} done"));
    /// assert!(!hooks.is_empty());
    /// ```
    pub fn before<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &[String]) + 'static,
    {
        self.push(HookPhase::Before, Rc::new(f));
        self
    }

    /// Adds an after-hook.
    pub fn after<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &[String]) + 'static,
    {
        self.push(HookPhase::After, Rc::new(f));
        self
    }

    /// Appends a hook to the chain for `phase`.
    pub fn push(&mut self, phase: HookPhase, hook: HookFn) {
        match phase {
            HookPhase::Before => self.before.push(hook),
            HookPhase::After => self.after.push(hook),
        }
    }

    /// Appends every hook of `other`, preserving its order.
    pub fn extend(&mut self, other: Hooks) {
        self.before.extend(other.before);
        self.after.extend(other.after);
    }

    /// Runs the chain for `phase` in registration order.
    pub fn run(&self, phase: HookPhase, key: &str, args: &[String]) {
        let chain = self.chain(phase);
        if !chain.is_empty() {
            trace!("running {} {} hook(s) for {}", chain.len(), phase, key);
        }
        for hook in chain {
            hook(key, args);
        }
    }

    fn chain(&self, phase: HookPhase) -> &[HookFn] {
        match phase {
            HookPhase::Before => &self.before,
            HookPhase::After => &self.after,
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_count", &self.before.len())
            .field("after_count", &self.after.len())
            .finish()
    }
}

/// Hook chains for every key.
///
/// Append-only: hooks can be added but never removed.
#[derive(Clone, Debug, Default)]
pub struct HookRegistry {
    by_key: HashMap<String, Hooks>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hook for `key`.
    pub fn add<F>(&mut self, phase: HookPhase, key: impl Into<String>, f: F)
    where
        F: Fn(&str, &[String]) + 'static,
    {
        self.by_key
            .entry(key.into())
            .or_default()
            .push(phase, Rc::new(f));
    }

    /// Appends a prepared hook set for `key` after any hooks already there.
    pub fn extend(&mut self, key: impl Into<String>, hooks: Hooks) {
        self.by_key.entry(key.into()).or_default().extend(hooks);
    }

    /// Runs the `phase` chain for `key`. A key with no hooks is a no-op.
    pub fn run(&self, phase: HookPhase, key: &str, args: &[String]) {
        if let Some(hooks) = self.by_key.get(key) {
            hooks.run(phase, key, args);
        }
    }

    /// Returns the hooks registered for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Hooks> {
        self.by_key.get(key)
    }

    /// Returns true if no key has any hooks.
    pub fn is_empty(&self) -> bool {
        self.by_key.values().all(Hooks::is_empty)
    }
}
