//! Observer that keeps every record for later inspection.

use std::sync::Mutex;

use super::{CallLevel, CallObserver, CallRecord};

#[derive(Debug, Default)]
pub struct RecordingObserver {
    entries: Mutex<Vec<(CallLevel, String, CallRecord)>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(CallLevel, String, CallRecord)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn only_entry(&self) -> (CallLevel, String, CallRecord) {
        let entries = self.entries();
        assert_eq!(entries.len(), 1, "expected exactly one record");
        entries.into_iter().next().unwrap()
    }
}

impl CallObserver for RecordingObserver {
    fn log(&self, level: CallLevel, message: &str, record: &CallRecord) {
        self.entries
            .lock()
            .unwrap()
            .push((level, message.to_string(), record.clone()));
    }
}
