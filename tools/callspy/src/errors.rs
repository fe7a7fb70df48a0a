use crate::value::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpyError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("member not found: {0}")]
    MemberNotFound(String),
    #[error("not configurable: {0}")]
    NotConfigurable(String),
    #[error("delegate failure: {0}")]
    DelegateFailure(Value),
    #[error("type error: {0}")]
    TypeError(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl SpyError {
    pub fn thrown(value: impl Into<Value>) -> Self {
        Self::DelegateFailure(value.into())
    }

    /// The value a caller observes as "what was thrown".
    pub fn thrown_value(&self) -> Value {
        match self {
            Self::DelegateFailure(value) => value.clone(),
            other => Value::from(other.to_string()),
        }
    }
}
