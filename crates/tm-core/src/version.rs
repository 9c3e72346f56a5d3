//! Version records and the sequence keys that order them

use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Version reported when no migration has ever been recorded.
pub const NIL_VERSION: i64 = -1;

/// One row of the migrations table.
///
/// Rows are append-only. The row with the greatest `sequence` is the current
/// state; everything older is history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    /// Ordering key, strictly increasing per driver instance
    pub sequence: u64,
    /// Schema version the record refers to
    pub version: i64,
    /// Whether the attempt at `version` failed part way
    pub dirty: bool,
}

impl VersionRecord {
    /// Storage encoding of the dirty flag.
    pub fn dirty_flag(&self) -> u8 {
        u8::from(self.dirty)
    }

    /// The state this record establishes once it is the latest.
    pub fn state(&self) -> VersionState {
        VersionState {
            version: self.version,
            dirty: self.dirty,
        }
    }
}

/// Current migration state as read back from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionState {
    pub version: i64,
    pub dirty: bool,
}

impl VersionState {
    /// State of a database that has never been migrated.
    pub const NONE: VersionState = VersionState {
        version: NIL_VERSION,
        dirty: false,
    };

    pub fn new(version: i64, dirty: bool) -> Self {
        Self { version, dirty }
    }

    /// True when no version has been recorded.
    pub fn is_nil(&self) -> bool {
        self.version == NIL_VERSION
    }
}

impl Default for VersionState {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for VersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            f.write_str("no version")?;
        } else {
            write!(f, "{}", self.version)?;
        }
        if self.dirty {
            f.write_str(" (dirty)")?;
        }
        Ok(())
    }
}

/// Source of `sequence` keys.
///
/// Keys are wall-clock nanoseconds, bumped past the previously issued key
/// whenever the clock has not moved forward (coarse clocks, clock steps).
#[derive(Debug, Default)]
pub struct SequenceGenerator {
    last: AtomicU64,
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next key. Every key is greater than all earlier ones.
    pub fn next(&self) -> u64 {
        let now = Utc::now()
            .timestamp_nanos_opt()
            .and_then(|nanos| u64::try_from(nanos).ok())
            .unwrap_or(0);

        let mut last = self.last.load(Ordering::Acquire);
        loop {
            let candidate = now.max(last.saturating_add(1));
            match self.last.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return candidate,
                Err(current) => last = current,
            }
        }
    }

    /// Ensure future keys are greater than `sequence`, e.g. a key read back
    /// from the store that was written under a faster clock.
    pub fn observe(&self, sequence: u64) {
        self.last.fetch_max(sequence, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_strictly_increasing() {
        let generator = SequenceGenerator::new();
        let mut previous = generator.next();
        for _ in 0..10_000 {
            let next = generator.next();
            assert!(next > previous, "{next} should be greater than {previous}");
            previous = next;
        }
    }

    #[test]
    fn test_sequence_passes_observed_key() {
        let generator = SequenceGenerator::new();
        let far_future = u64::MAX - 10;
        generator.observe(far_future);
        assert_eq!(generator.next(), far_future + 1);
    }

    #[test]
    fn test_observe_never_moves_backwards() {
        let generator = SequenceGenerator::new();
        let issued = generator.next();
        generator.observe(1);
        assert!(generator.next() > issued);
    }

    #[test]
    fn test_nil_state() {
        let state = VersionState::default();
        assert!(state.is_nil());
        assert!(!state.dirty);
        assert_eq!(state.version, NIL_VERSION);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(VersionState::NONE.to_string(), "no version");
        assert_eq!(VersionState::new(3, false).to_string(), "3");
        assert_eq!(VersionState::new(3, true).to_string(), "3 (dirty)");
    }

    #[test]
    fn test_record_dirty_flag() {
        let record = VersionRecord {
            sequence: 1,
            version: 7,
            dirty: true,
        };
        assert_eq!(record.dirty_flag(), 1);
        assert_eq!(record.state(), VersionState::new(7, true));
    }

    #[test]
    fn test_state_json_shape() {
        let json = serde_json::to_value(VersionState::new(4, true)).unwrap();
        assert_eq!(json, serde_json::json!({ "version": 4, "dirty": true }));

        let json = serde_json::to_value(VersionState::NONE).unwrap();
        assert_eq!(json["version"], -1);
        assert_eq!(json["dirty"], false);
    }

    #[test]
    fn test_record_json_shape() {
        let record = VersionRecord {
            sequence: u64::MAX,
            version: 2,
            dirty: false,
        };
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["sequence"], u64::MAX);
        assert_eq!(json["version"], 2);
        assert_eq!(json["dirty"], false);
    }
}
