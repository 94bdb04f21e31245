//! Background writer for session history and statistics.
//!
//! The timer hands its durable writes to this worker over a channel so a
//! slow disk never delays the next tick. Writes are applied in the order
//! they were submitted.

use crate::persistence::{lock, SharedStore, StoreError};
use crate::timer::StoreWrite;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// Sending half of the recorder queue. Cheap to clone.
#[derive(Clone)]
pub struct RecorderHandle {
    tx: Sender<StoreWrite>,
}

impl RecorderHandle {
    /// Queues a write without waiting for it.
    pub fn submit(&self, write: StoreWrite) {
        if let Err(err) = self.tx.send(write) {
            error!(write = ?err.0, "recorder stopped, write dropped");
        }
    }
}

pub struct Recorder;

impl Recorder {
    /// Starts the worker thread. It exits once every handle is dropped.
    pub fn spawn(store: SharedStore) -> (RecorderHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel::<StoreWrite>();
        let worker = thread::spawn(move || {
            for write in rx {
                if let Err(err) = Self::apply(&store, &write) {
                    error!(error = %err, ?write, "failed to persist timer record");
                }
            }
            debug!("recorder finished");
        });
        (RecorderHandle { tx }, worker)
    }

    /// Applies a single write to the store.
    pub fn apply(store: &SharedStore, write: &StoreWrite) -> Result<(), StoreError> {
        let store = lock(store)?;
        match write {
            StoreWrite::AppendSession(session) => store.add_session(session),
            StoreWrite::IncrementPomodoro { date, work_minutes } => {
                store.increment_pomodoro(*date, *work_minutes)
            }
            StoreWrite::CreditTask { task_id } => {
                let found = store.update_task(task_id, |task| task.completed_pomodoros += 1)?;
                if !found {
                    debug!(task_id = %task_id, "credited task no longer exists");
                }
                Ok(())
            }
        }
    }
}
