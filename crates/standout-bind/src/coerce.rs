//! Type coercion from raw string arguments.
//!
//! Every binding key has a [`Kind`]. Before a handler touches a field or calls
//! into caller code, its raw arguments are coerced into a typed [`Value`] by
//! one of the functions here. Coercion is pure: nothing is written until the
//! caller of [`coerce`] decides what to do with the value.
//!
//! | Kind | Rust type | Input |
//! |------|-----------|-------|
//! | `bool` | `bool` | `1 t T TRUE true True` / `0 f F FALSE false False` |
//! | `int` | `i64` | base-10, optional sign |
//! | `duration` | [`TimeDelta`] | optional sign, then `1h 30m`, `90s`, `1.5h`, `.5s`, ... or `0` |
//! | `enum` | `String` | one of an ordered choice set |
//! | `strings` | `Vec<String>` | `a:b:c` as one argument, or one element per argument |
//!
//! Scalar kinds read the first argument and ignore the rest.

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;

use crate::error::{CoerceError, TagError};

/// Separator used to split a single `strings` argument into elements.
pub const LIST_SEPARATOR: char = ':';

/// The primitive kind a key's raw arguments coerce to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Duration,
    Enum,
    Strings,
}

impl Kind {
    /// All kinds, in tag-name order.
    pub const ALL: [Kind; 5] = [
        Kind::Bool,
        Kind::Int,
        Kind::Duration,
        Kind::Enum,
        Kind::Strings,
    ];

    /// The name used for this kind in binding tags.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Duration => "duration",
            Kind::Enum => "enum",
            Kind::Strings => "strings",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TagError::UnknownKind(s.to_string()))
    }
}

/// A coerced argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Duration(TimeDelta),
    Enum(String),
    Strings(Vec<String>),
}

impl Value {
    /// The kind this value was coerced as.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Duration(_) => Kind::Duration,
            Value::Enum(_) => Kind::Enum,
            Value::Strings(_) => Kind::Strings,
        }
    }
}

/// Coerces raw arguments into a value of the given kind.
///
/// `choices` is only consulted for [`Kind::Enum`].
pub fn coerce(kind: Kind, choices: &[String], args: &[String]) -> Result<Value, CoerceError> {
    match kind {
        Kind::Bool => parse_bool(first(kind, args)?).map(Value::Bool),
        Kind::Int => parse_int(first(kind, args)?).map(Value::Int),
        Kind::Duration => parse_duration(first(kind, args)?).map(Value::Duration),
        Kind::Enum => choose(first(kind, args)?, choices).map(Value::Enum),
        Kind::Strings => Ok(Value::Strings(split_list(args))),
    }
}

/// Returns the argument a scalar kind reads.
pub(crate) fn first(kind: Kind, args: &[String]) -> Result<&str, CoerceError> {
    args.first()
        .map(String::as_str)
        .ok_or(CoerceError::MissingArgument { kind })
}

/// Parses a boolean token.
pub fn parse_bool(raw: &str) -> Result<bool, CoerceError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(CoerceError::parse(Kind::Bool, raw, "not a boolean")),
    }
}

/// Parses a base-10 signed 64-bit integer.
pub fn parse_int(raw: &str) -> Result<i64, CoerceError> {
    raw.parse::<i64>()
        .map_err(|e| CoerceError::parse(Kind::Int, raw, e))
}

/// Parses a signed, human-readable time span such as `-1h 30m` or `250ms`.
pub fn parse_duration(raw: &str) -> Result<TimeDelta, CoerceError> {
    let (negative, magnitude) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    if magnitude == "0" {
        return Ok(TimeDelta::zero());
    }

    let span = humantime::parse_duration(&leading_zero_fractions(magnitude))
        .map_err(|e| CoerceError::parse(Kind::Duration, raw, e))?;
    let delta =
        TimeDelta::from_std(span).map_err(|e| CoerceError::parse(Kind::Duration, raw, e))?;

    Ok(if negative { -delta } else { delta })
}

/// Rewrites bare fractions such as `.5s` as `0.5s`.
fn leading_zero_fractions(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len() + 2);
    let mut prev = None;
    for c in expr.chars() {
        if c == '.' && !prev.is_some_and(|p: char| p.is_ascii_digit()) {
            out.push('0');
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Formats a signed time span the way [`parse_duration`] reads it.
pub fn format_duration(delta: &TimeDelta) -> String {
    // abs() of TimeDelta::MIN is out of range for std, fall back to the max span
    let span = delta.abs().to_std().unwrap_or(std::time::Duration::MAX);
    let text = humantime::format_duration(span).to_string();
    if *delta < TimeDelta::zero() {
        format!("-{}", text)
    } else {
        text
    }
}

/// Checks that `raw` is one of `choices`, returning it as an owned string.
pub fn choose(raw: &str, choices: &[String]) -> Result<String, CoerceError> {
    if choices.iter().any(|choice| choice == raw) {
        Ok(raw.to_string())
    } else {
        Err(CoerceError::Validation {
            value: raw.to_string(),
            choices: choices.to_vec(),
        })
    }
}

/// Builds a string list from raw arguments.
///
/// A single argument is split on [`LIST_SEPARATOR`]; several arguments are
/// taken verbatim, one element each.
pub fn split_list(args: &[String]) -> Vec<String> {
    match args {
        [single] => single.split(LIST_SEPARATOR).map(String::from).collect(),
        many => many.to_vec(),
    }
}

/// Serde adapter for [`TimeDelta`] fields, using the same text format as the
/// `duration` kind.
///
/// ```rust
/// use chrono::TimeDelta;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Settings {
///     #[serde(with = "standout_bind::duration_serde")]
///     timeout: TimeDelta,
/// }
///
/// let json = serde_json::to_string(&Settings { timeout: TimeDelta::seconds(90) }).unwrap();
/// assert_eq!(json, r#"{"timeout":"1m 30s"}"#);
/// ```
pub mod duration_serde {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_duration(delta))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<TimeDelta, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
