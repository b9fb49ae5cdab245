use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::models::SheetRecord;

/// Records that were accepted from a guest but could not be written to
/// the spreadsheet yet. Held in memory only and bounded, so a restart or
/// a long outage can still lose them.
#[derive(Clone, Debug)]
pub struct PendingQueue {
    records: Arc<Mutex<VecDeque<SheetRecord>>>,
    capacity: usize,
}

impl PendingQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(VecDeque::new())),
            capacity,
        }
    }

    /// Queue a record, handing it back if the queue is full.
    pub fn push(&self, record: SheetRecord) -> Result<(), SheetRecord> {
        let mut records = self.records.lock().expect("Pending queue lock poisoned");
        if records.len() >= self.capacity {
            return Err(record);
        }
        records.push_back(record);
        Ok(())
    }

    /// Copy of the oldest record. It keeps its slot until `pop_front`.
    pub fn front(&self) -> Option<SheetRecord> {
        self.records
            .lock()
            .expect("Pending queue lock poisoned")
            .front()
            .cloned()
    }

    /// Remove the oldest record once it no longer needs delivering.
    /// Only the retry job consumes the queue, so this is the record the
    /// caller last saw from `front`.
    pub fn pop_front(&self) -> Option<SheetRecord> {
        self.records
            .lock()
            .expect("Pending queue lock poisoned")
            .pop_front()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("Pending queue lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
