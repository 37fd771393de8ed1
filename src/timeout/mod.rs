//! Transition deadlines and the configuration they are resolved from.

mod config;
mod resolver;

pub use config::{TimeoutConfig, TimeoutScope, TimeoutValue};
pub use resolver::{ResolvedTimeout, TimeoutResolver, TimeoutSource};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Maximum time a transition handler may run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deadline {
    Bounded(Duration),
    Unbounded,
}

impl Deadline {
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Bounded(duration) => Some(*duration),
            Self::Unbounded => None,
        }
    }

    pub fn as_millis(&self) -> Option<u64> {
        self.as_duration()
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn is_bounded(&self) -> bool {
        matches!(self, Self::Bounded(_))
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(duration) => write!(f, "{}ms", duration.as_millis()),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}
