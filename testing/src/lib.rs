//! # RSVP Testing
//!
//! Testing utilities and helpers for the RSVP registration manager.
//!
//! This crate provides:
//! - A fixed clock for deterministic timestamps
//! - In-memory and failing record stores
//! - A Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```
//! use rsvp_core::{ColumnSchema, RecordStore};
//! use rsvp_testing::{InMemoryRecordStore, test_clock};
//! use rsvp_core::environment::Clock;
//!
//! let store = InMemoryRecordStore::new(ColumnSchema::buildathon());
//! assert_eq!(store.count(), 0);
//! assert_eq!(test_clock().now(), test_clock().now());
//! ```

use chrono::{DateTime, Utc};
use rsvp_core::environment::Clock;

pub mod record_store_mocks;
pub mod reducer_test;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use rsvp_testing::mocks::FixedClock;
    /// use rsvp_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-10-18 09:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-10-18T09:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use record_store_mocks::{FailingRecordStore, InMemoryRecordStore};
pub use reducer_test::{ReducerTest, assertions};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rsvp_core::{ColumnSchema, Record, RecordStore};
    use std::collections::BTreeMap;

    fn record(name: &str) -> Record {
        Record::new(test_clock().now(), name, "x@example.com", BTreeMap::new()).unwrap()
    }

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn test_in_memory_store_keeps_append_order() {
        let store = InMemoryRecordStore::new(ColumnSchema::buildathon());
        store.append(record("Ada")).unwrap();
        store.append(record("Grace")).unwrap();

        let names: Vec<_> = store.load().iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, ["Ada", "Grace"]);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_in_memory_store_conforms_to_schema() {
        let store = InMemoryRecordStore::new(ColumnSchema::referral());
        let mut details = BTreeMap::new();
        details.insert("phone".to_string(), "+49 221".to_string());
        details.insert("role".to_string(), "Engineer".to_string());
        let record = Record::new(test_clock().now(), "Ada", "ada@example.com", details).unwrap();

        store.append(record).unwrap();

        let stored = &store.load()[0];
        assert_eq!(stored.detail("phone"), "+49 221");
        assert_eq!(stored.detail("inviter"), "");
        assert!(!stored.details().contains_key("role"));
    }

    #[test]
    fn test_failing_store_rejects_appends() {
        let store = FailingRecordStore::with_records(
            ColumnSchema::buildathon(),
            vec![record("Ada")],
            "disk full",
        );
        let err = store.append(record("Grace")).unwrap_err();
        assert_eq!(err.to_string(), "store unavailable: disk full");
        assert_eq!(store.count(), 1);
    }
}
