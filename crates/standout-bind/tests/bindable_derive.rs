//! Integration tests for the Bindable derive macro.
//!
//! These tests verify that `#[derive(Bindable)]` produces a binding table that
//! discovery and the binder accept, plus the key constants.

#![cfg(feature = "derive")]
#![allow(dead_code)] // Some fields are intentionally untagged

use chrono::TimeDelta;
use standout_bind::{discover, Bindable, Binder, Kind};

// =============================================================================
// Basic derive tests
// =============================================================================

#[derive(Bindable, Debug, Default)]
struct Settings {
    #[bind("verbose,bool")]
    verbose: bool,

    #[bind("retries,int")]
    retries: i64,

    #[bind("timeout,duration")]
    timeout: TimeDelta,

    #[bind("level,enum,low|mid|high")]
    level: String,

    #[bind("paths,strings")]
    paths: Vec<String>,

    history: Vec<String>,
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_table_follows_declaration_order() {
    let tags: Vec<&str> = Settings::bindable_fields()
        .iter()
        .map(|slot| slot.tag())
        .collect();

    assert_eq!(
        tags,
        vec![
            "verbose,bool",
            "retries,int",
            "timeout,duration",
            "level,enum,low|mid|high",
            "paths,strings",
        ]
    );
}

#[test]
fn test_key_constants_generated() {
    assert_eq!(Settings::VERBOSE, "verbose");
    assert_eq!(Settings::RETRIES, "retries");
    assert_eq!(Settings::TIMEOUT, "timeout");
    assert_eq!(Settings::LEVEL, "level");
    assert_eq!(Settings::PATHS, "paths");
}

#[test]
fn test_discovery_resolves_every_kind() {
    let mut settings = Settings::default();
    let kinds: Vec<Kind> = discover(&mut settings)
        .iter()
        .map(|binding| binding.tag.kind)
        .collect();

    assert_eq!(kinds, Kind::ALL.to_vec());
}

#[test]
fn test_dispatch_through_derived_table() {
    let mut settings = Settings::default();
    let mut binder = Binder::without_backup(&mut settings);

    binder.dispatch(Settings::VERBOSE, &args(&["T"])).unwrap();
    binder.dispatch(Settings::RETRIES, &args(&["-3"])).unwrap();
    binder.dispatch(Settings::TIMEOUT, &args(&["90s"])).unwrap();
    binder.dispatch(Settings::LEVEL, &args(&["high"])).unwrap();
    binder.dispatch(Settings::PATHS, &args(&["a:b:c"])).unwrap();
    drop(binder);

    assert!(settings.verbose);
    assert_eq!(settings.retries, -3);
    assert_eq!(settings.timeout, TimeDelta::seconds(90));
    assert_eq!(settings.level, "high");
    assert_eq!(settings.paths, args(&["a", "b", "c"]));
    assert!(settings.history.is_empty());
}

// =============================================================================
// Malformed and mismatched tags
// =============================================================================

#[derive(Bindable, Default)]
struct Sloppy {
    #[bind("good,bool")]
    good: bool,

    // kind does not fit the field
    #[bind("count,int")]
    count: bool,

    #[bind("mode,enum")]
    mode: String,

    #[bind("ratio,float")]
    ratio: i64,

    #[bind(",bool")]
    quiet: bool,
}

#[test]
fn test_bad_tags_are_skipped() {
    let mut sloppy = Sloppy::default();
    let binder = Binder::without_backup(&mut sloppy);
    assert_eq!(binder.keys(), vec!["good"]);
}

#[test]
fn test_constants_exist_for_skipped_tags() {
    assert_eq!(Sloppy::COUNT, "count");
    assert_eq!(Sloppy::MODE, "mode");
}

// =============================================================================
// Naming
// =============================================================================

#[derive(Bindable, Default)]
struct Renamed {
    #[bind("max-retries,int")]
    retries: i64,

    #[bind("logLevel,enum,info|warn")]
    level: String,
}

#[test]
fn test_constant_named_after_key_not_field() {
    assert_eq!(Renamed::MAX_RETRIES, "max-retries");
    assert_eq!(Renamed::LOG_LEVEL, "logLevel");

    let mut renamed = Renamed::default();
    let binder = Binder::without_backup(&mut renamed);
    assert_eq!(binder.keys(), vec!["logLevel", "max-retries"]);
}

#[derive(Bindable, Default)]
struct Shadowed {
    #[bind("mode,bool")]
    first: bool,

    #[bind("mode,enum,a|b")]
    second: String,
}

#[test]
fn test_repeated_key_later_field_wins() {
    let mut shadowed = Shadowed::default();
    let mut binder = Binder::without_backup(&mut shadowed);

    assert_eq!(Shadowed::MODE, "mode");
    binder.dispatch(Shadowed::MODE, &args(&["b"])).unwrap();
    assert!(binder.dispatch(Shadowed::MODE, &args(&["true"])).is_err());
    drop(binder);

    assert_eq!(shadowed.second, "b");
    assert!(!shadowed.first);
}

// =============================================================================
// Generics
// =============================================================================

#[derive(Bindable, Default)]
struct WithExtra<E: Default> {
    #[bind("enabled,bool")]
    enabled: bool,

    extra: E,
}

#[test]
fn test_generic_struct() {
    let mut settings = WithExtra::<u32>::default();
    let mut binder = Binder::without_backup(&mut settings);
    binder.dispatch(WithExtra::<u32>::ENABLED, &args(&["1"])).unwrap();
    drop(binder);
    assert!(settings.enabled);
}
