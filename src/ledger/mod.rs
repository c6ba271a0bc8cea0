//! Best-time ledger: the ten fastest wins, persisted after every record.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::LedgerError;

pub mod storage;

use storage::Storage;

pub const CAPACITY: usize = 10;
pub const DEFAULT_KEY: &str = "minesweeperHighScores";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub time: f64,
}

impl fmt::Display for ScoreEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {:.3}s", self.name, self.time)
    }
}

impl ScoreEntry {
    fn is_valid(&self) -> bool {
        is_valid_name(&self.name) && is_valid_time(self.time)
    }
}

pub fn is_valid_name(name: &str) -> bool {
    name.len() == 3 && name.bytes().all(|b| b.is_ascii_uppercase())
}

fn is_valid_time(time: f64) -> bool {
    time.is_finite() && time >= 0.0
}

/// Applies the name field's input mask: uppercase, at most three characters.
///
/// The result still has to pass [`is_valid_name`].
pub fn normalize_name_input(raw: &str) -> String {
    raw.to_uppercase().chars().take(3).collect()
}

fn round_to_millis(time: f64) -> f64 {
    (time * 1000.0).round() / 1000.0
}

fn sort_and_truncate(entries: &mut Vec<ScoreEntry>) {
    entries.sort_by(|a, b| a.time.total_cmp(&b.time));
    entries.truncate(CAPACITY);
}

pub struct ScoreLedger<S> {
    storage: S,
    key: String,
    entries: Vec<ScoreEntry>,
}

impl<S: Storage> ScoreLedger<S> {
    /// Loads the ledger stored under `key`.
    ///
    /// A missing, unreadable or corrupt record yields an empty ledger.
    #[instrument(level = "trace", skip(storage))]
    pub fn open(storage: S, key: &str) -> Self {
        let entries = match storage.read(key) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<ScoreEntry>>(&bytes) {
                Ok(mut entries) => {
                    let total = entries.len();
                    entries.retain(ScoreEntry::is_valid);
                    if entries.len() != total {
                        warn!(
                            "Dropped {} invalid entries from score record {}",
                            total - entries.len(),
                            key
                        );
                    }
                    sort_and_truncate(&mut entries);
                    entries
                }
                Err(e) => {
                    warn!("Corrupt score record {}, starting empty: {}", key, e);
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!("No score record {}, starting empty", key);
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to read score record {}, starting empty: {}", key, e);
                Vec::new()
            }
        };

        info!("Loaded {} scores from {}", entries.len(), key);
        Self {
            storage,
            key: key.to_string(),
            entries,
        }
    }

    pub fn list(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `time` would make it onto the list.
    pub fn qualifies(&self, time: f64) -> bool {
        is_valid_time(round_to_millis(time))
            && (self.entries.len() < CAPACITY
                || self.entries.last().is_some_and(|worst| time < worst.time))
    }

    /// Records a win and persists the ledger before returning.
    ///
    /// Returns the entry's 0-based rank, or `None` when it fell off the end.
    /// Nothing changes in memory unless the write succeeds.
    #[instrument(level = "trace", skip(self))]
    pub fn record(&mut self, name: &str, time: f64) -> Result<Option<usize>, LedgerError> {
        if !is_valid_name(name) {
            return Err(LedgerError::InvalidName(name.to_string()));
        }
        let rounded = round_to_millis(time);
        // Huge times overflow to infinity when scaled, which JSON cannot hold.
        if !is_valid_time(time) || !is_valid_time(rounded) {
            return Err(LedgerError::InvalidTime(time));
        }

        let time = rounded;
        // The sort is stable, so the new entry lands after every equal time.
        let rank = self.entries.iter().filter(|e| e.time <= time).count();
        let rank = (rank < CAPACITY).then_some(rank);

        let mut entries = self.entries.clone();
        entries.push(ScoreEntry {
            name: name.to_string(),
            time,
        });
        sort_and_truncate(&mut entries);

        let bytes = serde_json::to_vec(&entries)
            .map_err(|e| LedgerError::Storage(std::io::Error::other(e)))?;
        self.storage.write(&self.key, &bytes)?;
        self.entries = entries;

        info!("Recorded {} in {:.3}s at rank {:?}", name, time, rank);
        Ok(rank)
    }

    /// Display lines in the form `1. ABC - 12.345s`.
    pub fn ranked_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{}. {}", i + 1, entry))
            .collect()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use proptest::prelude::*;

    use super::storage::MemoryStorage;
    use super::*;

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn read(&self, _key: &str) -> io::Result<Option<Vec<u8>>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }

        fn write(&mut self, _key: &str, _bytes: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    fn empty() -> ScoreLedger<MemoryStorage> {
        ScoreLedger::open(MemoryStorage::new(), DEFAULT_KEY)
    }

    #[test]
    fn validates_names() {
        assert!(is_valid_name("ABC"));
        for bad in ["ab1", "abc", "AB", "ABCD", "AB1", "", "ÄBC", "A C"] {
            assert!(!is_valid_name(bad), "{:?} should be invalid", bad);
        }
    }

    #[test]
    fn normalizes_input_like_the_name_field() {
        assert_eq!(normalize_name_input("abcd"), "ABC");
        assert_eq!(normalize_name_input("zq"), "ZQ");
        assert_eq!(normalize_name_input(" zq"), " ZQ");
        assert_eq!(normalize_name_input("a1b"), "A1B");
    }

    #[test]
    fn rejects_invalid_name_without_mutation() {
        let mut ledger = empty();
        let err = ledger.record("ab1", 3.0).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidName(ref n) if n == "ab1"));
        assert!(ledger.is_empty());
        assert_eq!(ledger.storage().read(DEFAULT_KEY).unwrap(), None);
    }

    #[test]
    fn rejects_negative_and_nan_times() {
        let mut ledger = empty();
        assert!(matches!(ledger.record("ABC", -1.0), Err(LedgerError::InvalidTime(_))));
        assert!(matches!(ledger.record("ABC", f64::NAN), Err(LedgerError::InvalidTime(_))));
        assert!(ledger.is_empty());
    }

    #[test]
    fn rejects_time_too_large_to_store() {
        let mut ledger = empty();
        for i in 0..9 {
            ledger.record("AAA", 10.0 + i as f64).unwrap();
        }

        assert!(matches!(ledger.record("ABC", 1e307), Err(LedgerError::InvalidTime(_))));
        assert!(!ledger.qualifies(1e307));
        assert_eq!(ledger.len(), 9);

        let reopened = ScoreLedger::open(ledger.storage().clone(), DEFAULT_KEY);
        assert_eq!(reopened.list(), ledger.list());
    }

    #[test]
    fn records_sort_ascending_and_persist() {
        let mut ledger = empty();
        assert_eq!(ledger.record("BBB", 20.0).unwrap(), Some(0));
        assert_eq!(ledger.record("AAA", 10.5).unwrap(), Some(0));
        assert_eq!(ledger.record("CCC", 30.25).unwrap(), Some(2));

        let names: Vec<_> = ledger.list().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["AAA", "BBB", "CCC"]);

        let stored = ledger.storage().read(DEFAULT_KEY).unwrap().unwrap();
        let persisted: Vec<ScoreEntry> = serde_json::from_slice(&stored).unwrap();
        assert_eq!(persisted, ledger.list());
    }

    #[test]
    fn duplicates_are_kept_in_submission_order() {
        let mut ledger = empty();
        ledger.record("ABC", 5.0).unwrap();
        assert_eq!(ledger.record("ABC", 5.0).unwrap(), Some(1));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn truncates_to_capacity() {
        let mut ledger = empty();
        for i in 0..CAPACITY {
            ledger.record("AAA", 10.0 + i as f64).unwrap();
        }
        assert!(!ledger.qualifies(50.0));
        assert!(ledger.qualifies(1.0));

        assert_eq!(ledger.record("ZZZ", 50.0).unwrap(), None);
        assert_eq!(ledger.len(), CAPACITY);
        assert!(ledger.list().iter().all(|e| e.name == "AAA"));

        assert_eq!(ledger.record("NEW", 1.0).unwrap(), Some(0));
        assert_eq!(ledger.len(), CAPACITY);
        assert_eq!(ledger.list().last().unwrap().time, 18.0);
    }

    #[test]
    fn keeps_millisecond_precision() {
        let mut ledger = empty();
        ledger.record("ABC", 12.3456789).unwrap();
        assert_eq!(ledger.list()[0].time, 12.346);
        assert_eq!(ledger.ranked_lines(), ["1. ABC - 12.346s"]);
    }

    #[test]
    fn missing_record_is_empty() {
        assert!(empty().is_empty());
    }

    #[test]
    fn corrupt_record_degrades_to_empty() {
        let ledger = ScoreLedger::open(MemoryStorage::with_record(DEFAULT_KEY, "{not json"), DEFAULT_KEY);
        assert!(ledger.is_empty());
    }

    #[test]
    fn read_failure_degrades_to_empty() {
        let ledger = ScoreLedger::open(FailingStorage, DEFAULT_KEY);
        assert!(ledger.is_empty());
    }

    #[test]
    fn loaded_record_is_normalized() {
        let raw = r#"[
            {"name":"CCC","time":3.0},
            {"name":"bad","time":1.0},
            {"name":"AAA","time":1.5},
            {"name":"NEG","time":-2.0}
        ]"#;
        let ledger = ScoreLedger::open(MemoryStorage::with_record(DEFAULT_KEY, raw), DEFAULT_KEY);
        let names: Vec<_> = ledger.list().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["AAA", "CCC"]);
    }

    #[test]
    fn failed_write_leaves_ledger_unchanged() {
        let mut ledger = ScoreLedger::open(FailingStorage, DEFAULT_KEY);
        assert!(matches!(ledger.record("ABC", 1.0), Err(LedgerError::Storage(_))));
        assert!(ledger.is_empty());
    }

    proptest! {
        #[test]
        fn ledger_stays_sorted_capped_and_honest(
            submissions in proptest::collection::vec(("[A-Z]{3}", 0u32..100_000), 0..40),
        ) {
            let mut ledger = empty();
            let mut submitted = Vec::new();
            for (name, millis) in &submissions {
                let time = *millis as f64 / 1000.0;
                ledger.record(name, time).unwrap();
                submitted.push(ScoreEntry { name: name.clone(), time });
            }

            let list = ledger.list();
            prop_assert!(list.len() <= CAPACITY);
            prop_assert_eq!(list.len(), submitted.len().min(CAPACITY));
            prop_assert!(list.windows(2).all(|w| w[0].time <= w[1].time));
            for entry in list {
                prop_assert!(submitted.contains(entry));
            }

            let mut best: Vec<f64> = submitted.iter().map(|e| e.time).collect();
            best.sort_by(f64::total_cmp);
            best.truncate(CAPACITY);
            let kept: Vec<f64> = list.iter().map(|e| e.time).collect();
            prop_assert_eq!(kept, best);
        }
    }
}
