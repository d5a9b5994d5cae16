//! In-memory history store for tests
//!
//! Inserts are staged per transaction and only become visible on commit, so
//! tests can observe that failed or dropped transactions leave no rows.

use crate::history::{HistoryStore, HistoryTransaction};
use async_trait::async_trait;
use imgops_core::{AppError, HistoryRecord, NewHistoryRecord};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MemoryHistoryStore {
    records: Arc<Mutex<Vec<HistoryRecord>>>,
    rollbacks: Arc<AtomicUsize>,
    fail_insert: bool,
    fail_commit: bool,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_insert() -> Self {
        Self {
            fail_insert: true,
            ..Self::default()
        }
    }

    pub fn failing_commit() -> Self {
        Self {
            fail_commit: true,
            ..Self::default()
        }
    }

    /// Committed records in insertion order
    pub fn records(&self) -> Vec<HistoryRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn rollback_count(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn begin(&self) -> Result<Box<dyn HistoryTransaction>, AppError> {
        Ok(Box::new(MemoryTransaction {
            store: self.clone(),
            staged: Vec::new(),
        }))
    }
}

struct MemoryTransaction {
    store: MemoryHistoryStore,
    staged: Vec<HistoryRecord>,
}

#[async_trait]
impl HistoryTransaction for MemoryTransaction {
    async fn insert(&mut self, record: &NewHistoryRecord) -> Result<HistoryRecord, AppError> {
        if self.store.fail_insert {
            return Err(AppError::Persistence("injected insert failure".to_string()));
        }

        let next_id = self.store.records.lock().unwrap().len() + self.staged.len() + 1;
        let saved = record.clone().into_record(next_id as i32);
        self.staged.push(saved.clone());
        Ok(saved)
    }

    async fn commit(mut self: Box<Self>) -> Result<(), AppError> {
        if self.store.fail_commit {
            return Err(AppError::Persistence("injected commit failure".to_string()));
        }

        let staged = std::mem::take(&mut self.staged);
        self.store.records.lock().unwrap().extend(staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.store.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
