use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// One line of the assistant's event log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub content: String,
    /// Lowercased text before the first colon, empty when there is none.
    #[serde(rename = "type")]
    pub kind: String,
    pub is_new: bool,
    /// Fetch cycle that produced the entry.
    pub batch: u64,
}

impl LogEntry {
    pub fn new(content: &str, batch: u64) -> Self {
        Self {
            content: content.to_string(),
            kind: classify(content),
            is_new: true,
            batch,
        }
    }
}

pub fn classify(line: &str) -> String {
    line.split_once(':')
        .map(|(kind, _)| kind.to_lowercase())
        .unwrap_or_default()
}

/// Splits a fetched blob on `\n` into entries in line order.
///
/// Every segment becomes an entry, so a trailing newline yields a final empty
/// entry and an empty blob yields one. A `\r` before the break is dropped.
pub fn parse_batch(blob: &str, batch: u64) -> Vec<LogEntry> {
    blob.split('\n')
        .map(|line| LogEntry::new(line.strip_suffix('\r').unwrap_or(line), batch))
        .collect()
}

/// Shared append-only list of log entries.
#[derive(Clone, Default)]
pub struct LogBuffer {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Entries at positions `start..`, for readers that track what they have seen.
    pub fn since(&self, start: usize) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.get(start..).map(<[_]>::to_vec).unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn append(&self, batch: Vec<LogEntry>) -> usize {
        let count = batch.len();
        if let Ok(mut entries) = self.entries.lock() {
            entries.extend(batch);
        }
        count
    }

    /// Clears the highlight on every entry currently held.
    pub(crate) fn clear_new_flags(&self) -> usize {
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };
        let mut cleared = 0;
        for entry in entries.iter_mut().filter(|entry| entry.is_new) {
            entry.is_new = false;
            cleared += 1;
        }
        cleared
    }
}
