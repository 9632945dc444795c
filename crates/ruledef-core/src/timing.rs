//! # Work Timing Records
//!
//! A [`WorkTimingRecord`] is emitted when a unit of work (typically a build
//! action) starts executing. It pairs the identity of that unit with a
//! monotonic [`StartTimestamp`].
//!
//! The timestamp is captured by the caller immediately before the unit is
//! dispatched, not when the record is built. Whatever runs between the
//! decision to execute and the actual execution (cache lookups, input
//! checks) is therefore excluded from the measured duration.
//!
//! Records are never mutated. Pairing a record with a later completion
//! signal and computing durations is the job of a [`TimingObserver`].

use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

static CLOCK_ANCHOR: OnceLock<Instant> = OnceLock::new();

/// Nanoseconds on a process-wide monotonic clock.
///
/// Readings taken by [`StartTimestamp::now()`] never decrease within a
/// process. Values from different processes are not comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StartTimestamp(u64);

impl StartTimestamp {
    /// Read the monotonic clock.
    pub fn now() -> Self {
        let anchor = *CLOCK_ANCHOR.get_or_init(Instant::now);
        let nanos = anchor.elapsed().as_nanos();
        Self(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// A timestamp from a raw nanosecond reading.
    pub fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// The raw nanosecond reading.
    pub fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Time elapsed from `earlier` to `self`, or `None` if `earlier` is later.
    pub fn duration_since(&self, earlier: StartTimestamp) -> Option<Duration> {
        self.0.checked_sub(earlier.0).map(Duration::from_nanos)
    }
}

impl std::fmt::Display for StartTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

/// The start of one unit of work.
///
/// `S` is opaque to this crate. The record holds the subject by `Arc`, and
/// [`WorkTimingRecord::is_for`] compares identity, not value, so two
/// structurally equal actions remain distinguishable.
#[derive(Debug)]
pub struct WorkTimingRecord<S: ?Sized> {
    subject: Arc<S>,
    start: StartTimestamp,
}

impl<S: ?Sized> WorkTimingRecord<S> {
    /// Create a record for a unit of work that started at `start`.
    pub fn new(subject: Arc<S>, start: StartTimestamp) -> Self {
        Self { subject, start }
    }

    /// Create a record stamped with the current monotonic time.
    pub fn started_now(subject: Arc<S>) -> Self {
        Self::new(subject, StartTimestamp::now())
    }

    /// The unit of work that started.
    pub fn subject(&self) -> &Arc<S> {
        &self.subject
    }

    /// When it started.
    pub fn start(&self) -> StartTimestamp {
        self.start
    }

    /// True if this record is for exactly `subject` (pointer identity).
    pub fn is_for(&self, subject: &Arc<S>) -> bool {
        Arc::ptr_eq(&self.subject, subject)
    }
}

impl<S: ?Sized> Clone for WorkTimingRecord<S> {
    fn clone(&self) -> Self {
        Self {
            subject: Arc::clone(&self.subject),
            start: self.start,
        }
    }
}

/// Receives timing records as units of work start.
///
/// Implementations are called from whichever thread dispatches the work,
/// so they must be `Send + Sync`. No ordering is guaranteed between records
/// of units running in parallel.
pub trait TimingObserver<S: ?Sized>: Send + Sync {
    /// Called once per started unit of work.
    fn work_started(&self, record: WorkTimingRecord<S>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, PartialEq)]
    struct Action {
        mnemonic: &'static str,
    }

    #[derive(Default)]
    struct Collector {
        seen: Mutex<Vec<WorkTimingRecord<Action>>>,
    }

    impl TimingObserver<Action> for Collector {
        fn work_started(&self, record: WorkTimingRecord<Action>) {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(record);
            }
        }
    }

    #[test]
    fn test_now_is_monotonic() {
        let mut last = StartTimestamp::now();
        for _ in 0..1000 {
            let next = StartTimestamp::now();
            assert!(next >= last);
            last = next;
        }
    }

    #[test]
    fn test_record_keeps_caller_timestamp() {
        let start = StartTimestamp::from_nanos(42);
        let record = WorkTimingRecord::new(Arc::new(Action { mnemonic: "Compile" }), start);
        assert_eq!(record.start(), start);
        assert_eq!(record.subject().mnemonic, "Compile");
    }

    #[test]
    fn test_is_for_compares_identity() {
        let a = Arc::new(Action { mnemonic: "Link" });
        let b = Arc::new(Action { mnemonic: "Link" });
        let record = WorkTimingRecord::started_now(Arc::clone(&a));
        assert!(record.is_for(&a));
        assert!(!record.is_for(&b));
        assert!(record.clone().is_for(&a));
    }

    #[test]
    fn test_duration_since() {
        let early = StartTimestamp::from_nanos(1_000);
        let late = StartTimestamp::from_nanos(4_000);
        assert_eq!(late.duration_since(early), Some(Duration::from_nanos(3_000)));
        assert_eq!(early.duration_since(late), None);
    }

    #[test]
    fn test_observer_receives_records_from_many_threads() {
        let collector = Arc::new(Collector::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let collector = Arc::clone(&collector);
                std::thread::spawn(move || {
                    let action = Arc::new(Action { mnemonic: "Test" });
                    let start = StartTimestamp::now();
                    collector.work_started(WorkTimingRecord::new(action, start));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(collector.seen.lock().unwrap().len(), 8);
    }

    #[test]
    fn test_unsized_subject() {
        let subject: Arc<str> = Arc::from("//pkg:target");
        let record = WorkTimingRecord::started_now(Arc::clone(&subject));
        assert!(record.is_for(&subject));
        assert_eq!(&**record.subject(), "//pkg:target");
    }
}
