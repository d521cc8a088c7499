//! Core key types for file-backed collections.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A scalar record key.
///
/// `TYPE_NAME` is written into the collection descriptor and compared on
/// every reopen, so changing it for an existing type breaks old collections.
pub trait RecordKey:
    Clone + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    const TYPE_NAME: &'static str;
}

impl RecordKey for String {
    const TYPE_NAME: &'static str = "String";
}

impl RecordKey for u32 {
    const TYPE_NAME: &'static str = "u32";
}

impl RecordKey for u64 {
    const TYPE_NAME: &'static str = "u64";
}

impl RecordKey for i32 {
    const TYPE_NAME: &'static str = "i32";
}

impl RecordKey for i64 {
    const TYPE_NAME: &'static str = "i64";
}

/// Key of a schema-less record: a string or an integer.
///
/// Keys compare by their rendered form, so `Str("7")` and `Int(7)` are the
/// same key, just as they name the same record file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DynamicKey {
    Int(i64),
    Str(String),
}

/// Identity of a [`DynamicKey`]: integers and the strings that render like
/// them collapse to one value.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Canonical<'a> {
    Int(i64),
    Str(&'a str),
}

impl DynamicKey {
    fn canonical(&self) -> Canonical<'_> {
        match self {
            DynamicKey::Int(i) => Canonical::Int(*i),
            DynamicKey::Str(s) => match s.parse::<i64>() {
                Ok(i) if i.to_string() == *s => Canonical::Int(i),
                _ => Canonical::Str(s),
            },
        }
    }

    /// Read a key out of a JSON value. Only strings and integers qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(DynamicKey::Str(s.clone())),
            Value::Number(n) => n.as_i64().map(DynamicKey::Int),
            _ => None,
        }
    }
}

impl PartialEq for DynamicKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for DynamicKey {}

impl PartialOrd for DynamicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DynamicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical().cmp(&other.canonical())
    }
}

impl Hash for DynamicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state)
    }
}

impl RecordKey for DynamicKey {
    const TYPE_NAME: &'static str = "DynamicKey";
}

impl fmt::Display for DynamicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamicKey::Int(i) => write!(f, "{}", i),
            DynamicKey::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for DynamicKey {
    fn from(s: &str) -> Self {
        DynamicKey::Str(s.to_string())
    }
}

impl From<String> for DynamicKey {
    fn from(s: String) -> Self {
        DynamicKey::Str(s)
    }
}

impl From<i64> for DynamicKey {
    fn from(i: i64) -> Self {
        DynamicKey::Int(i)
    }
}
