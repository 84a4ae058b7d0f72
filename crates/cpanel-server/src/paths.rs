//! Visited path tracking.
//!
//! [`PathTracker`] keeps the ordered, deduplicated list of paths any browser
//! has visited. [`Session`] owns one tracker for the lifetime of a running
//! control panel and pairs every mutation with the broadcast it triggers.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// A single tracked location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    /// URL path as reported by the browser (e.g. `/about`).
    pub path: String,
}

impl PathRecord {
    /// Create a record for the given path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Ordered set of [`PathRecord`]s keyed by `path`.
///
/// Insertion order is preserved; a path is stored at most once.
#[derive(Debug, Default)]
pub struct PathTracker {
    records: Vec<PathRecord>,
}

impl PathTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visited path.
    ///
    /// Appends the record unless a record with an equal `path` already exists.
    /// Returns `true` if the collection changed.
    pub fn record(&mut self, record: PathRecord) -> bool {
        if self.records.iter().any(|r| r.path == record.path) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Tracked records in order of first occurrence.
    #[must_use]
    pub fn paths(&self) -> &[PathRecord] {
        &self.records
    }

    /// Number of tracked paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no path has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// State of one running control panel session.
///
/// The tracker lives behind a mutex so that recording a path and
/// broadcasting the resulting list happen as one unit: no peer can
/// observe a list older than one already sent to another peer.
#[derive(Debug, Default)]
pub struct Session {
    paths: Mutex<PathTracker>,
}

impl Session {
    /// Create a session with an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with the current path list while holding the tracker lock.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn with_paths<R>(&self, f: impl FnOnce(&[PathRecord]) -> R) -> R {
        let tracker = self.paths.lock().unwrap();
        f(tracker.paths())
    }

    /// Record a path and, if the list changed, run `on_change` with the
    /// updated list before releasing the lock.
    ///
    /// Returns `true` if the list changed.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn record_path(&self, record: PathRecord, on_change: impl FnOnce(&[PathRecord])) -> bool {
        let mut tracker = self.paths.lock().unwrap();
        let changed = tracker.record(record);
        if changed {
            on_change(tracker.paths());
        }
        changed
    }

    /// Snapshot of the tracked paths.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PathRecord> {
        self.with_paths(<[PathRecord]>::to_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record_all(tracker: &mut PathTracker, paths: &[&str]) {
        for path in paths {
            tracker.record(PathRecord::new(*path));
        }
    }

    #[test]
    fn test_new_tracker_is_empty() {
        let tracker = PathTracker::new();
        assert!(tracker.is_empty());
        assert_eq!(tracker.len(), 0);
    }

    #[test]
    fn test_record_keeps_first_occurrence_order() {
        let mut tracker = PathTracker::new();
        record_all(&mut tracker, &["/", "/about", "/", "/contact"]);

        assert_eq!(
            tracker.paths(),
            &[
                PathRecord::new("/"),
                PathRecord::new("/about"),
                PathRecord::new("/contact"),
            ]
        );
    }

    #[test]
    fn test_record_reports_change() {
        let mut tracker = PathTracker::new();
        assert!(tracker.record(PathRecord::new("/")));
        assert!(tracker.record(PathRecord::new("/about")));
        assert!(!tracker.record(PathRecord::new("/")));
    }

    #[test]
    fn test_record_duplicate_leaves_list_untouched() {
        let mut tracker = PathTracker::new();
        record_all(&mut tracker, &["/a", "/b"]);
        let before = tracker.paths().to_vec();

        assert!(!tracker.record(PathRecord::new("/b")));
        assert_eq!(tracker.paths(), before.as_slice());
    }

    #[test]
    fn test_record_matches_exact_string_only() {
        let mut tracker = PathTracker::new();
        record_all(&mut tracker, &["/about", "/about/", "/About"]);
        assert_eq!(tracker.len(), 3);
    }

    #[test]
    fn test_session_record_path_calls_on_change_with_updated_list() {
        let session = Session::new();
        let mut seen = Vec::new();

        let changed = session.record_path(PathRecord::new("/"), |paths| {
            seen = paths.to_vec();
        });

        assert!(changed);
        assert_eq!(seen, vec![PathRecord::new("/")]);
    }

    #[test]
    fn test_session_record_path_skips_on_change_for_duplicate() {
        let session = Session::new();
        session.record_path(PathRecord::new("/"), |_| {});

        let mut called = false;
        let changed = session.record_path(PathRecord::new("/"), |_| called = true);

        assert!(!changed);
        assert!(!called);
        assert_eq!(session.snapshot(), vec![PathRecord::new("/")]);
    }

    #[test]
    fn test_path_record_serialization() {
        let json = serde_json::to_value(PathRecord::new("/about")).unwrap();
        assert_eq!(json, serde_json::json!({"path": "/about"}));
    }
}
