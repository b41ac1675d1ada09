//! Data types and typed values held by expectations.
//!
//! Raw configuration text becomes a [`Value`] through [`DataType::coerce`];
//! caller-supplied values go through [`DataType::convert`]. Both always yield a
//! value of the requested kind or nothing at all.

use crate::errors::ExpectationError;
use std::fmt;
use std::str::FromStr;

/// Tokens read as `true` (case-insensitive).
pub const TRUE_TOKENS: [&str; 4] = ["1", "yes", "true", "on"];

/// Tokens read as `false` (case-insensitive).
pub const FALSE_TOKENS: [&str; 4] = ["0", "no", "false", "off"];

/// Supported value kinds. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit signed integer.
    Integer,
    /// 64-bit float.
    Float,
    /// Boolean.
    Boolean,
    /// Free text, stored verbatim.
    String,
}

impl DataType {
    /// Lower-case name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::String => "string",
        }
    }

    /// Convert a caller-supplied value into this kind.
    ///
    /// Numeric kinds are permissive: an integer slot accepts integral floats
    /// and numeric strings, a float slot accepts integers and numeric strings.
    /// A boolean slot accepts only a real boolean. A string slot accepts
    /// anything and keeps its canonical text.
    #[must_use]
    pub fn convert(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::Integer, Value::Integer(i)) => Some(Value::Integer(*i)),
            (Self::Integer, Value::Float(f)) => float_to_integer(*f).map(Value::Integer),
            (Self::Integer, Value::String(s)) => s.trim().parse().ok().map(Value::Integer),
            (Self::Float, Value::Float(f)) => Some(Value::Float(*f)),
            #[allow(clippy::cast_precision_loss)]
            (Self::Float, Value::Integer(i)) => Some(Value::Float(*i as f64)),
            (Self::Float, Value::String(s)) => s.trim().parse().ok().map(Value::Float),
            (Self::Boolean, Value::Boolean(b)) => Some(Value::Boolean(*b)),
            (Self::String, Value::String(s)) => Some(Value::String(s.clone())),
            (Self::String, other) => Some(Value::String(other.to_string())),
            _ => None,
        }
    }

    /// Coerce raw configuration text into this kind.
    ///
    /// Strings are taken verbatim; everything else is trimmed first.
    #[must_use]
    pub fn coerce(self, raw: &str) -> Option<Value> {
        match self {
            Self::Integer => raw.trim().parse().ok().map(Value::Integer),
            Self::Float => raw.trim().parse().ok().map(Value::Float),
            Self::Boolean => parse_bool(raw).map(Value::Boolean),
            Self::String => Some(Value::String(raw.to_owned())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ExpectationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Ok(Self::Integer),
            "float" | "double" => Ok(Self::Float),
            "bool" | "boolean" => Ok(Self::Boolean),
            "str" | "string" => Ok(Self::String),
            _ => Err(ExpectationError::UnknownDataType(s.to_owned())),
        }
    }
}

/// A typed configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    String(String),
}

impl Value {
    /// Kind of this value.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Boolean(_) => DataType::Boolean,
            Self::Integer(_) => DataType::Integer,
            Self::Float(_) => DataType::Float,
            Self::String(_) => DataType::String,
        }
    }

    /// Integer payload, if this is an integer.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Float payload, if this is a float.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Boolean payload, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Text payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Canonical text: the form written to files and read back unchanged.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            // Debug keeps a decimal point or exponent and round-trips exactly.
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u16> for Value {
    fn from(i: u16) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Self::Float(f64::from(x))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Parse a boolean token. Anything outside the token table is `None`.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    let token = raw.trim();
    if TRUE_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(token)) {
        Some(true)
    } else if FALSE_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(token)) {
        Some(false)
    } else {
        None
    }
}

/// Lossless float to integer conversion.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_to_integer(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
