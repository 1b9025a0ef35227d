//! Argument formatting: turn semantic values into flat token lists.
//!
//! Every binding receives loosely shaped values (a path, a list of paths, a
//! map of password handles, a density of `300`) and must hand the process
//! runner a flat `Vec<String>`. The helpers here are the only place that
//! decides how a shape becomes tokens, so all three bindings agree on it.
//!
//! Shapes are a closed set ([`ArgValue`]) and every rule is an exhaustive
//! `match`, checked in a fixed priority order:
//!
//! | Shape | [`normalize`] result |
//! |-------|----------------------|
//! | `Text(s)` | `[s]` |
//! | `List(xs)` | the elements of `xs`, in order |
//! | `Absent` | the caller's default |
//! | `Bool`/`Int`/`Float` | `[value.to_string()]` (floats keep a fraction: `300.0`) |
//! | `Map(_)` | [`Pdf2TxtError::ArgumentShape`] |

use crate::error::Pdf2TxtError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Insertion-ordered name → value map used for operators and options.
pub type ArgMap = IndexMap<String, ArgValue>;

static ABSENT: ArgValue = ArgValue::Absent;

/// `map[name]`, or [`ArgValue::Absent`] when the name is not set.
pub fn lookup<'a>(map: &'a ArgMap, name: &str) -> &'a ArgValue {
    map.get(name).unwrap_or(&ABSENT)
}

/// A semantic argument value before it is turned into tokens.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// No value supplied.
    #[default]
    Absent,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<ArgValue>),
    Map(ArgMap),
}

impl ArgValue {
    /// Short name of the value's shape, for error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            ArgValue::Absent => "absent",
            ArgValue::Bool(_) => "bool",
            ArgValue::Int(_) => "integer",
            ArgValue::Float(_) => "float",
            ArgValue::Text(_) => "string",
            ArgValue::List(_) => "sequence",
            ArgValue::Map(_) => "mapping",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ArgValue::Absent)
    }

    /// Truthiness used by presence flags: empty and zero values are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            ArgValue::Absent => false,
            ArgValue::Bool(b) => *b,
            ArgValue::Int(i) => *i != 0,
            ArgValue::Float(f) => *f != 0.0,
            ArgValue::Text(s) => !s.is_empty(),
            ArgValue::List(xs) => !xs.is_empty(),
            ArgValue::Map(m) => !m.is_empty(),
        }
    }

    /// String form of a scalar, `None` for absent, sequence and mapping.
    pub fn scalar_token(&self) -> Option<String> {
        match self {
            ArgValue::Bool(b) => Some(b.to_string()),
            ArgValue::Int(i) => Some(i.to_string()),
            ArgValue::Float(f) => Some(format!("{f:?}")),
            ArgValue::Text(s) => Some(s.clone()),
            ArgValue::Absent | ArgValue::List(_) | ArgValue::Map(_) => None,
        }
    }

    fn shape_error(&self) -> Pdf2TxtError {
        Pdf2TxtError::ArgumentShape {
            shape: self.shape().to_string(),
            value: self.to_string(),
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Absent => f.write_str("<absent>"),
            ArgValue::List(xs) => {
                let parts: Vec<String> = xs.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            ArgValue::Map(m) => {
                let parts: Vec<String> = m.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            scalar => f.write_str(&scalar.scalar_token().unwrap_or_default()),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Text(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Text(s)
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

impl From<i64> for ArgValue {
    fn from(i: i64) -> Self {
        ArgValue::Int(i)
    }
}

impl From<i32> for ArgValue {
    fn from(i: i32) -> Self {
        ArgValue::Int(i64::from(i))
    }
}

impl From<u32> for ArgValue {
    fn from(i: u32) -> Self {
        ArgValue::Int(i64::from(i))
    }
}

impl From<f64> for ArgValue {
    fn from(f: f64) -> Self {
        ArgValue::Float(f)
    }
}

impl<T: Into<ArgValue>> From<Vec<T>> for ArgValue {
    fn from(xs: Vec<T>) -> Self {
        ArgValue::List(xs.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ArgValue::Absent, Into::into)
    }
}

impl From<ArgMap> for ArgValue {
    fn from(m: ArgMap) -> Self {
        ArgValue::Map(m)
    }
}

/// Path-separator convention applied to path tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Tokens are passed through untouched.
    #[default]
    Posix,
    /// Forward slashes in path tokens become backslashes.
    Windows,
}

impl Platform {
    /// The convention of the host this binary was compiled for.
    pub fn native() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    pub fn localize(self, path: &str) -> String {
        match self {
            Platform::Posix => path.to_string(),
            Platform::Windows => path.replace('/', "\\"),
        }
    }
}

// ── Formatting rules ──────────────────────────────────────────────────────

/// Convert `value` into tokens, using `default` when it is absent.
pub fn normalize(value: &ArgValue, default: &[String]) -> Result<Vec<String>, Pdf2TxtError> {
    match value {
        ArgValue::Text(s) => Ok(vec![s.clone()]),
        ArgValue::List(items) => flatten_sequence(items),
        ArgValue::Absent => Ok(default.to_vec()),
        ArgValue::Bool(_) | ArgValue::Int(_) | ArgValue::Float(_) => {
            Ok(value.scalar_token().into_iter().collect())
        }
        ArgValue::Map(_) => Err(value.shape_error()),
    }
}

/// Like [`normalize`], but a mapping renders as `key=value` tokens.
///
/// This is the pdftk handle syntax (`A=in.pdf`, `A=secret`).
pub fn normalize_keyed(value: &ArgValue, default: &[String]) -> Result<Vec<String>, Pdf2TxtError> {
    match value {
        ArgValue::Map(m) => m
            .iter()
            .map(|(k, v)| {
                v.scalar_token()
                    .map(|v| format!("{k}={v}"))
                    .ok_or_else(|| v.shape_error())
            })
            .collect(),
        other => normalize(other, default),
    }
}

/// `[flag, value]`, `[flag, elements...]`, or nothing when `value` is absent.
pub fn format_flag_arg(flag: &str, value: &ArgValue) -> Result<Vec<String>, Pdf2TxtError> {
    match value {
        ArgValue::Absent => Ok(Vec::new()),
        ArgValue::Text(s) => Ok(vec![flag.to_string(), s.clone()]),
        ArgValue::List(items) => {
            let mut tokens = vec![flag.to_string()];
            tokens.extend(flatten_sequence(items)?);
            Ok(tokens)
        }
        ArgValue::Bool(_) | ArgValue::Int(_) | ArgValue::Float(_) => {
            let mut tokens = vec![flag.to_string()];
            tokens.extend(value.scalar_token());
            Ok(tokens)
        }
        ArgValue::Map(_) => Err(value.shape_error()),
    }
}

/// `[flag]` when `options[flag]` is truthy, otherwise `default`.
pub fn format_presence_flag(options: &ArgMap, flag: &str, default: &[String]) -> Vec<String> {
    match options.get(flag) {
        Some(v) if v.is_truthy() => vec![flag.to_string()],
        _ => default.to_vec(),
    }
}

/// `-name value` pairs in insertion order; an absent mapping yields nothing.
///
/// Each value goes through [`normalize`], so a sequence value contributes all
/// of its elements after the flag.
pub fn flatten_mapping(mapping: Option<&ArgMap>) -> Result<Vec<String>, Pdf2TxtError> {
    let mut tokens = Vec::new();
    if let Some(m) = mapping {
        for (name, value) in m {
            tokens.push(format!("-{name}"));
            tokens.extend(normalize(value, &[])?);
        }
    }
    Ok(tokens)
}

fn flatten_sequence(items: &[ArgValue]) -> Result<Vec<String>, Pdf2TxtError> {
    let mut tokens = Vec::with_capacity(items.len());
    for item in items {
        match item {
            ArgValue::Absent => {}
            ArgValue::List(inner) => tokens.extend(flatten_sequence(inner)?),
            ArgValue::Map(_) => return Err(item.shape_error()),
            scalar => tokens.extend(scalar.scalar_token()),
        }
    }
    Ok(tokens)
}
