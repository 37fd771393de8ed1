//! Error classifications attached to failed transitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Why a transition failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The deadline elapsed while the handler was still running.
    Timeout,
    /// The handler returned an error or panicked before the deadline.
    Exception,
    /// The executor could not run the handler at all, e.g. the replica was not
    /// in the state the message expected.
    Framework,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "TIMEOUT",
            Self::Exception => "EXCEPTION",
            Self::Framework => "FRAMEWORK",
        };
        f.write_str(name)
    }
}

/// Classification delivered with a rollback notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorClassification {
    pub kind: ErrorKind,
    pub cause: Option<String>,
}

impl ErrorClassification {
    pub fn new(kind: ErrorKind, cause: Option<String>) -> Self {
        Self { kind, cause }
    }

    pub fn timeout(deadline: Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            Some(format!(
                "transition did not complete within {}ms",
                deadline.as_millis()
            )),
        )
    }

    pub fn exception(cause: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Exception, Some(cause.to_string()))
    }

    pub fn framework(cause: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Framework, Some(cause.to_string()))
    }
}

impl fmt::Display for ErrorClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {}", self.kind, cause),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_cause_names_the_deadline() {
        let error = ErrorClassification::timeout(Duration::from_millis(200));
        assert_eq!(error.kind, ErrorKind::Timeout);
        assert_eq!(
            error.to_string(),
            "TIMEOUT: transition did not complete within 200ms"
        );
    }

    #[test]
    fn kinds_serialize_in_upper_case() {
        let json = serde_json::to_string(&ErrorKind::Exception).unwrap();
        assert_eq!(json, "\"EXCEPTION\"");
    }

    #[test]
    fn classification_without_cause_displays_kind() {
        let error = ErrorClassification::new(ErrorKind::Framework, None);
        assert_eq!(error.to_string(), "FRAMEWORK");
    }
}
