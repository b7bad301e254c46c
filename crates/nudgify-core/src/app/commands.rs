//! CommandHandler - add / delete / list
//!
//! 重複（同じ owner + subject）と所有者の判定はここで行う。
//! 各操作は独立していて、ストア全体を読み込んで線形に走査する。

use std::sync::Arc;

use tracing::info;

use crate::domain::{NudgeError, OwnerId, TaskRecord};
use crate::ports::TaskStore;

#[derive(Clone)]
pub struct CommandHandler {
    store: Arc<dyn TaskStore>,
}

impl CommandHandler {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Register a task. Validation and duplicate checks happen before any write.
    pub fn add(
        &self,
        owner_id: OwnerId,
        subject: &str,
        due_date: &str,
    ) -> Result<TaskRecord, NudgeError> {
        let record = TaskRecord::new(owner_id, subject, due_date)?;

        let mut tasks = self.store.load()?;
        if tasks.iter().any(|t| t.matches(owner_id, &record.subject)) {
            return Err(NudgeError::Duplicate {
                owner_id,
                subject: record.subject,
            });
        }

        tasks.push(record.clone());
        self.store.save(&tasks)?;
        info!(%owner_id, subject = %record.subject, due_date = %record.due_date, "task added");
        Ok(record)
    }

    /// Remove the owner's task with exactly this subject.
    pub fn delete(&self, owner_id: OwnerId, subject: &str) -> Result<TaskRecord, NudgeError> {
        let mut tasks = self.store.load()?;
        let Some(index) = tasks.iter().position(|t| t.matches(owner_id, subject)) else {
            return Err(NudgeError::NotFound {
                owner_id,
                subject: subject.to_string(),
            });
        };

        let removed = tasks.remove(index);
        self.store.save(&tasks)?;
        info!(%owner_id, subject = %removed.subject, "task deleted");
        Ok(removed)
    }

    /// The owner's tasks in insertion order. Empty is not an error.
    pub fn list(&self, owner_id: OwnerId) -> Result<Vec<TaskRecord>, NudgeError> {
        let tasks = self.store.load()?;
        Ok(tasks.into_iter().filter(|t| t.belongs_to(owner_id)).collect())
    }
}
