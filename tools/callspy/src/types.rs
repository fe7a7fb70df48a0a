use crate::errors::SpyError;
use crate::value::{ObjectId, SymbolId, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKey {
    String(String),
    Index(u32),
    Symbol(SymbolId),
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
            Self::Symbol(id) => write!(f, "Symbol(#{})", id.0),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<u32> for PropertyKey {
    fn from(value: u32) -> Self {
        Self::Index(value)
    }
}

impl From<SymbolId> for PropertyKey {
    fn from(value: SymbolId) -> Self {
        Self::Symbol(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    Value,
    Get,
    Set,
}

impl AccessKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Get => "get",
            Self::Set => "set",
        }
    }
}

/// Which slot of a member to intercept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Value(PropertyKey),
    Getter(PropertyKey),
    Setter(PropertyKey),
}

impl Selector {
    pub fn value(key: impl Into<PropertyKey>) -> Self {
        Self::Value(key.into())
    }

    pub fn getter(key: impl Into<PropertyKey>) -> Self {
        Self::Getter(key.into())
    }

    pub fn setter(key: impl Into<PropertyKey>) -> Self {
        Self::Setter(key.into())
    }

    pub fn key(&self) -> &PropertyKey {
        match self {
            Self::Value(key) | Self::Getter(key) | Self::Setter(key) => key,
        }
    }

    pub fn access_kind(&self) -> AccessKind {
        match self {
            Self::Value(_) => AccessKind::Value,
            Self::Getter(_) => AccessKind::Get,
            Self::Setter(_) => AccessKind::Set,
        }
    }
}

impl From<&str> for Selector {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

impl From<PropertyKey> for Selector {
    fn from(value: PropertyKey) -> Self {
        Self::Value(value)
    }
}

/// Outcome of one invocation, or of one promise settlement.
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    Ok(Value),
    Error(Value),
}

impl CallResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn value(&self) -> &Value {
        match self {
            Self::Ok(value) | Self::Error(value) => value,
        }
    }

    pub fn ok_value(&self) -> Option<&Value> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ok(_) => "ok",
            Self::Error(_) => "error",
        }
    }

    pub fn into_outcome(self) -> Result<Value, SpyError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Error(thrown) => Err(SpyError::DelegateFailure(thrown)),
        }
    }
}

/// Where the intercepted member was found. The replacement is always an own
/// property of the target; `Ancestor` means it shadows an inherited member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallSite {
    Own,
    Ancestor(ObjectId),
}

impl InstallSite {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Own => "own",
            Self::Ancestor(_) => "ancestor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThenablePolicy {
    NativeOnly,
    DuckTyped,
}

impl ThenablePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NativeOnly => "native_only",
            Self::DuckTyped => "duck_typed",
        }
    }
}
