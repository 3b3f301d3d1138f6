//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a committed build batch.
///
/// Batch ids are creation timestamps in milliseconds since the Unix epoch,
/// bumped where needed so that every id issued by one queue is strictly greater
/// than the previous one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(i64);

impl BatchId {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Next id at or after `now`, strictly greater than `last` (if any).
    pub fn next_after(last: Option<BatchId>, now: DateTime<Utc>) -> Self {
        let now = now.timestamp_millis();
        match last {
            Some(BatchId(prev)) if prev >= now => Self(prev.saturating_add(1)),
            _ => Self(now),
        }
    }
}

impl core::fmt::Display for BatchId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for BatchId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for BatchId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let millis = s
            .trim()
            .parse::<i64>()
            .map_err(|e| DomainError::validation(format!("BatchId: {e}")))?;
        Ok(Self(millis))
    }
}
