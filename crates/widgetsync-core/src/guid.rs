//! Channel identity.
//!
//! Every comm channel carries a globally unique id. On the wire the id is
//! rendered as 32 lower-case hex digits, and widgets reference each other
//! in their state as `IPY_MODEL_<hex>`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Prefix used when a widget is referenced from another widget's state.
pub const MODEL_REF_PREFIX: &str = "IPY_MODEL_";

/// A globally unique channel id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Guid(Uuid);

impl Guid {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The id as 32 hex digits, no dashes.
    pub fn to_hex(&self) -> String {
        self.0.simple().to_string()
    }
}

impl Default for Guid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for Guid {
    type Err = GuidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(GuidParseError::Empty);
        }
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| GuidParseError::Invalid(s.to_string()))
    }
}

impl TryFrom<String> for Guid {
    type Error = GuidParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Guid> for String {
    fn from(id: Guid) -> Self {
        id.to_string()
    }
}

/// A reference to a widget model, serialized as `IPY_MODEL_<hex>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelRef(Guid);

impl ModelRef {
    pub fn new(id: Guid) -> Self {
        Self(id)
    }

    /// The referenced channel id.
    pub fn id(&self) -> Guid {
        self.0
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{MODEL_REF_PREFIX}{}", self.0)
    }
}

impl FromStr for ModelRef {
    type Err = GuidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix(MODEL_REF_PREFIX)
            .ok_or_else(|| GuidParseError::MissingPrefix(s.to_string()))?;
        Ok(Self(hex.parse()?))
    }
}

impl TryFrom<String> for ModelRef {
    type Error = GuidParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ModelRef> for String {
    fn from(r: ModelRef) -> Self {
        r.to_string()
    }
}

/// Error parsing a channel id or model reference.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GuidParseError {
    #[error("channel id cannot be empty")]
    Empty,
    #[error("invalid channel id: {0}")]
    Invalid(String),
    #[error("model reference must start with 'IPY_MODEL_', got: {0}")]
    MissingPrefix(String),
}
