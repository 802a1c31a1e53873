//! Snowflake ID - 64-bit user identifier
//!
//! User ids are issued by the account service; the gateway only parses them from the
//! admission request and uses them as the key for the display-name lookup.

use std::fmt;

/// 64-bit user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Snowflake(i64);

impl Snowflake {
    /// Create a new Snowflake from a raw i64 value
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Parse from string representation
    ///
    /// Only positive decimal ids are accepted; surrounding whitespace is rejected.
    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        if s.is_empty() {
            return Err(SnowflakeParseError::Empty);
        }

        let id = s
            .parse::<i64>()
            .map_err(|_| SnowflakeParseError::InvalidFormat)?;

        if id <= 0 {
            return Err(SnowflakeParseError::NotPositive);
        }

        Ok(Self(id))
    }
}

/// Error when parsing a Snowflake from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("snowflake is empty")]
    Empty,

    #[error("invalid snowflake format")]
    InvalidFormat,

    #[error("snowflake must be positive")]
    NotPositive,
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Snowflake {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for i64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl std::str::FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Snowflake::parse(s)
    }
}
