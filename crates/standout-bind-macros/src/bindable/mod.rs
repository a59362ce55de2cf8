//! Implementation of the `#[derive(Bindable)]` macro.
//!
//! Generates the binding table and key constants for a settings struct from
//! its `#[bind("...")]` field tags.

mod attrs;
mod derive;

pub use derive::bindable_derive_impl;
