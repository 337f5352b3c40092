//! Calendar journal: one free-text entry and a todo list per day.
use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    clock_id, load_collection, now_millis, save_collection, KeyValueStore, Result, WorkdeskError,
    JOURNAL_KEY,
};

/// A single todo on a journal day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

/// Everything recorded for one day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub todos: Vec<Todo>,
}

pub struct JournalStore<S: KeyValueStore> {
    backend: S,
    records: BTreeMap<NaiveDate, DayRecord>,
}

impl<S: KeyValueStore> JournalStore<S> {
    pub fn open(backend: S) -> Self {
        let raw: BTreeMap<String, Value> = load_collection(&backend, JOURNAL_KEY)
            .into_option()
            .unwrap_or_default();

        let mut records = BTreeMap::new();
        for (key, value) in raw {
            let Ok(date) = NaiveDate::parse_from_str(&key, "%Y-%m-%d") else {
                warn!("Ignoring journal entry under unreadable date {:?}", key);
                continue;
            };
            match serde_json::from_value::<DayRecord>(value) {
                Ok(record) => {
                    records.insert(date, record);
                }
                Err(e) => warn!("Dropping malformed journal day {}: {}", date, e),
            }
        }

        debug!("Loaded {} journal days", records.len());
        Self { backend, records }
    }

    /// Returns the record for `date`, initializing an empty day on first access
    pub fn record(&mut self, date: NaiveDate) -> &DayRecord {
        self.record_mut(date)
    }

    /// Looks at a day without creating it
    pub fn peek(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.records.get(&date)
    }

    /// Days that have a record, oldest first
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.keys().copied().collect()
    }

    pub fn update_content(&mut self, date: NaiveDate, content: impl Into<String>) {
        self.record_mut(date).content = content.into();
        self.persist();
    }

    pub fn add_todo(&mut self, date: NaiveDate, text: impl Into<String>) -> u64 {
        self.add_todo_at(date, text, now_millis())
    }

    pub fn add_todo_at(&mut self, date: NaiveDate, text: impl Into<String>, now_ms: i64) -> u64 {
        let record = self.record_mut(date);
        let id = clock_id(now_ms, record.todos.iter().map(|t| t.id));
        record.todos.push(Todo {
            id,
            text: text.into(),
            done: false,
        });
        info!("Added todo {} on {}", id, date);
        self.persist();
        id
    }

    /// Flips a todo between done and open, returning the new state
    pub fn toggle_todo(&mut self, date: NaiveDate, id: u64) -> Result<bool> {
        let todo = self
            .records
            .get_mut(&date)
            .and_then(|record| record.todos.iter_mut().find(|t| t.id == id))
            .ok_or(WorkdeskError::TodoNotFound { date, id })?;
        todo.done = !todo.done;
        let done = todo.done;
        self.persist();
        Ok(done)
    }

    pub fn save(&mut self) -> Result<()> {
        save_collection(&mut self.backend, JOURNAL_KEY, &self.records)
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    fn record_mut(&mut self, date: NaiveDate) -> &mut DayRecord {
        if !self.records.contains_key(&date) {
            debug!("Initializing journal day {}", date);
            self.records.insert(date, DayRecord::default());
            self.persist();
        }
        self.records.entry(date).or_default()
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            error!("Failed to save journal: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{persistence::FailingStore, KeyValueStore, MemoryStore};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn first_access_initializes_and_persists_empty_day() {
        let backend = MemoryStore::new();
        let mut journal = JournalStore::open(backend.clone());

        assert_eq!(journal.record(day(3)), &DayRecord::default());
        let stored = backend.get(JOURNAL_KEY).unwrap().unwrap();
        assert_eq!(stored, r#"{"2024-06-03":{"content":"","todos":[]}}"#);
    }

    #[test]
    fn todos_toggle() {
        let mut journal = JournalStore::open(MemoryStore::new());
        let id = journal.add_todo_at(day(1), "water plants", 10);

        assert!(journal.toggle_todo(day(1), id).unwrap());
        assert!(!journal.toggle_todo(day(1), id).unwrap());
        assert!(matches!(
            journal.toggle_todo(day(2), id),
            Err(WorkdeskError::TodoNotFound { .. })
        ));
    }

    #[test]
    fn reopens_with_same_content() {
        let backend = MemoryStore::new();
        let mut journal = JournalStore::open(backend.clone());
        journal.update_content(day(5), "<p>rainy</p>");
        journal.add_todo_at(day(5), "read", 1);
        journal.add_todo_at(day(5), "write", 1);

        let reopened = JournalStore::open(backend);
        let record = reopened.peek(day(5)).unwrap();
        assert_eq!(record.content, "<p>rainy</p>");
        assert_eq!(
            record.todos.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(reopened.dates(), vec![day(5)]);
    }

    #[test]
    fn bad_days_are_skipped() {
        let backend = MemoryStore::with_entry(
            JOURNAL_KEY,
            r#"{"someday":{"content":"x"},"2024-06-07":{"content":"ok"},"2024-06-08":5}"#,
        );
        let journal = JournalStore::open(backend);
        assert_eq!(journal.dates(), vec![day(7)]);
        assert!(journal.peek(day(7)).unwrap().todos.is_empty());
    }

    #[test]
    fn write_failures_keep_the_day_in_memory() {
        let mut journal = JournalStore::open(FailingStore);
        journal.update_content(day(9), "<p>offline</p>");
        let id = journal.add_todo_at(day(9), "retry", 1);

        assert!(journal.toggle_todo(day(9), id).unwrap());
        assert_eq!(journal.peek(day(9)).unwrap().content, "<p>offline</p>");
        assert!(journal.save().is_err());
    }
}
