//! Value trees produced by parsing.
use smol_str::SmolStr;

/// An s-expression value.
///
/// Text-bearing atoms (bare tokens, quoted strings, `|base64|` atoms) become
/// [`Value::Symbol`] when their contents are valid UTF-8. Escape sequences
/// and base64 payloads can produce arbitrary octets; such atoms are kept
/// verbatim as [`Value::Bytes`]. Both variants serialize identically, as a
/// length-prefixed netstring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A token, quoted string or base64 atom with UTF-8 contents.
    Symbol(SmolStr),
    /// A raw byte atom.
    Bytes(Vec<u8>),
    /// An integer in `i32` range.
    I32(i32),
    /// A negative integer below `i32` range.
    I64(i64),
    /// A non-negative integer above `i32` range.
    U64(u64),
    /// A parenthesized list.
    List(Vec<Value>),
}

impl Value {
    /// Returns the symbol text if this is a symbol atom.
    #[inline]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the children if this is a list.
    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }
}

impl From<SmolStr> for Value {
    fn from(value: SmolStr) -> Self {
        Self::Symbol(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Symbol(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Symbol(value.into())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::I64(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::U64(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}
