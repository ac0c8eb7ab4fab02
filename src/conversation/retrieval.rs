use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, IntoEnumIterator};

/// Number of source documents the backend consults (`top_k`).
///
/// Restricted to the menu the service is tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum RetrievalWidth {
    Two,
    Four,
    Six,
    Eight,
}

impl Default for RetrievalWidth {
    fn default() -> Self {
        RetrievalWidth::Four
    }
}

impl RetrievalWidth {
    pub fn value(self) -> u32 {
        match self {
            RetrievalWidth::Two => 2,
            RetrievalWidth::Four => 4,
            RetrievalWidth::Six => 6,
            RetrievalWidth::Eight => 8,
        }
    }

    /// Next entry in the menu, wrapping around
    pub fn next(self) -> Self {
        let all: Vec<_> = Self::iter().collect();
        let index = all.iter().position(|w| *w == self).unwrap_or(0);
        all[(index + 1) % all.len()]
    }

    /// Allowed values, for help text
    pub fn menu() -> String {
        Self::iter()
            .map(|w| w.value().to_string())
            .collect::<Vec<_>>()
            .join("|")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("retrieval width must be one of 2, 4, 6 or 8 (got {0})")]
pub struct InvalidRetrievalWidth(pub String);

impl TryFrom<u32> for RetrievalWidth {
    type Error = InvalidRetrievalWidth;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::iter()
            .find(|w| w.value() == value)
            .ok_or_else(|| InvalidRetrievalWidth(value.to_string()))
    }
}

impl From<RetrievalWidth> for u32 {
    fn from(width: RetrievalWidth) -> Self {
        width.value()
    }
}

impl std::str::FromStr for RetrievalWidth {
    type Err = InvalidRetrievalWidth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u32>()
            .map_err(|_| InvalidRetrievalWidth(s.trim().to_string()))?;
        Self::try_from(value)
    }
}

impl fmt::Display for RetrievalWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
