//! Positional message parameters.

use core::fmt;

use crate::plural::PluralCount;

/// A positional parameter substituted for `$1`, `$2`, ... in a message.
///
/// Parameters keep the type they were supplied with so that plural
/// selection can read counts without re-parsing, while display always
/// produces the same text the caller would expect from `to_string()`.
///
/// Equality is total: floats compare by bit pattern, so a `NaN` parameter
/// equals itself and `0.0` differs from `-0.0` (they display differently).
#[derive(Debug, Clone)]
pub enum Param {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Param {
    /// Interpret the parameter as a plural count.
    ///
    /// Text is parsed leniently (surrounding whitespace, decimals). A count
    /// is fractional when its text shows fraction digits (`"1.5"`, `"1.0"`)
    /// or a float has a fractional part. Returns `None` when the value has
    /// no finite numeric reading.
    #[must_use]
    pub fn as_count(&self) -> Option<PluralCount> {
        match self {
            Self::Int(n) => Some(PluralCount::whole(*n)),
            Self::Float(f) => float_count(*f, false),
            Self::Text(s) => {
                let s = s.trim();
                if let Ok(n) = s.parse::<i64>() {
                    return Some(PluralCount::whole(n));
                }
                let visible = s
                    .split_once('.')
                    .is_some_and(|(_, frac)| frac.starts_with(|c: char| c.is_ascii_digit()));
                s.parse::<f64>()
                    .ok()
                    .and_then(|f| float_count(f, visible))
            }
            Self::Bool(_) => None,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn float_count(f: f64, visible_fraction: bool) -> Option<PluralCount> {
    f.is_finite().then(|| PluralCount {
        integer: f.trunc() as i64,
        fractional: visible_fraction || f.fract() != 0.0,
    })
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Param {}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Param {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
