use crate::error::{FornoError, Result};
use serde::Serialize;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// How long a bound instance is reused.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Lifetime {
    /// A fresh instance for every resolution.
    Transient,
    /// One instance per request scope.
    #[default]
    Scoped,
    /// One instance for the whole process.
    Singleton,
}

impl Lifetime {
    /// Parse a lifetime from configuration. Unknown values are a
    /// configuration error rather than a silent fallback to the default.
    pub fn parse(value: &str) -> Result<Self> {
        Lifetime::from_str(value.trim()).map_err(|_| FornoError::InvalidLifetime {
            value: value.to_string(),
        })
    }
}
