//! Common types used throughout repo-courier
//!
//! Shared type definitions, type aliases, and the status observer
//! used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

// ============================================================================
// Search Sort
// ============================================================================

/// How search results are sorted by the remote engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// The engine's own relevance ranking
    #[default]
    BestMatch,
    /// Star count
    Stars,
    /// Fork count
    Forks,
    /// Open help-wanted issue count
    HelpWantedIssues,
    /// Last update time
    Updated,
}

impl SortKey {
    /// Query-parameter value for this sort key
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BestMatch => "best-match",
            Self::Stars => "stars",
            Self::Forks => "forks",
            Self::HelpWantedIssues => "help-wanted-issues",
            Self::Updated => "updated",
        }
    }
}

/// Direction search results are ordered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending
    Asc,
    /// Descending
    #[default]
    Desc,
}

impl SortOrder {
    /// Query-parameter value for this order
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

// ============================================================================
// Status Observer
// ============================================================================

/// Destination for human-readable status updates.
///
/// Status strings are log-grade text, not a structured protocol; consumers
/// should display them, not parse them. Every update is also emitted on the
/// `tracing` debug level.
#[derive(Clone, Default)]
pub struct StatusSink {
    observer: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

impl StatusSink {
    /// Create a sink that forwards updates to the given observer
    pub fn new(observer: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            observer: Some(Arc::new(observer)),
        }
    }

    /// Create a sink that only logs
    pub fn silent() -> Self {
        Self::default()
    }

    /// Emit one status update
    pub fn emit(&self, status: &str) {
        tracing::debug!("{status}");
        if let Some(observer) = &self.observer {
            observer(status);
        }
    }
}

impl fmt::Debug for StatusSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusSink")
            .field("has_observer", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_sort_key_default() {
        assert_eq!(SortKey::default(), SortKey::BestMatch);
    }

    #[test]
    fn test_sort_key_as_str() {
        assert_eq!(SortKey::BestMatch.as_str(), "best-match");
        assert_eq!(SortKey::Stars.as_str(), "stars");
        assert_eq!(SortKey::HelpWantedIssues.as_str(), "help-wanted-issues");
    }

    #[test]
    fn test_sort_key_serde() {
        let key: SortKey = serde_json::from_str("\"help-wanted-issues\"").unwrap();
        assert_eq!(key, SortKey::HelpWantedIssues);

        let json = serde_json::to_string(&SortKey::BestMatch).unwrap();
        assert_eq!(json, "\"best-match\"");
    }

    #[test]
    fn test_sort_order_default() {
        assert_eq!(SortOrder::default(), SortOrder::Desc);
        assert_eq!(SortOrder::default().as_str(), "desc");
    }

    #[test]
    fn test_status_sink_forwards() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let inner = Arc::clone(&seen);
        let sink = StatusSink::new(move |status| inner.lock().unwrap().push(status.to_string()));

        sink.emit("first");
        sink.emit("second");

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn test_status_sink_silent() {
        // Must not panic without an observer
        StatusSink::silent().emit("ignored");
    }
}
