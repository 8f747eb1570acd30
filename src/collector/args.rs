// Typed scraper arguments.
//
// A scraper declares its arguments once as ArgDefs; runtime overrides
// travel as Args. Value variants are never coerced: a mismatched access
// returns None and configure rejects the argument.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use std::fmt;

/// The tag of an [`ArgValue`] variant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArgKind {
    /// A string value.
    String,
    /// A boolean value.
    Bool,
    /// An integer value.
    Int,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
        }
    }
}

/// A tagged argument value.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    /// A string value.
    String(String),
    /// A boolean value.
    Bool(bool),
    /// An integer value.
    Int(i64),
}

impl ArgValue {
    /// Returns the variant tag.
    pub fn kind(&self) -> ArgKind {
        match self {
            Self::String(_) => ArgKind::String,
            Self::Bool(_) => ArgKind::Bool,
            Self::Int(_) => ArgKind::Int,
        }
    }

    /// Returns the string value, `None` for other variants.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean value, `None` for other variants.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value, `None` for other variants.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ArgValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

/// A compile-time argument declaration: name, help text and the default
/// value whose tag fixes the argument's type.
#[derive(Debug)]
pub struct ArgDef {
    /// Argument name, unique within its scraper.
    pub name: &'static str,
    /// Operator facing description.
    pub help: &'static str,
    /// Default value; its tag is the declared type.
    pub default: ArgValue,
}

/// A named runtime argument value, passed by value to `configure`.
#[derive(Clone, Debug, PartialEq)]
pub struct Arg {
    /// Argument name.
    pub name: String,
    /// Argument value.
    pub value: ArgValue,
}

impl Arg {
    /// Returns a new argument.
    pub fn new(name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Materializes one [`Arg`] per definition using its declared default.
pub fn default_args(defs: &[ArgDef]) -> Vec<Arg> {
    defs.iter()
        .map(|def| Arg::new(def.name, def.default.clone()))
        .collect()
}
