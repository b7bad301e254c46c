//! InMemoryTaskStore - テスト用・dry-run 用のストア
//!
//! 保存回数を数えるので「書き込みが何回起きたか」を検証できる。

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::domain::{NudgeError, TaskRecord};
use crate::ports::TaskStore;

#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: Mutex<Vec<TaskRecord>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<TaskRecord>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..Self::default()
        }
    }

    /// 現在の内容のコピー
    pub fn snapshot(&self) -> Vec<TaskRecord> {
        self.tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// `save` が呼ばれて成功した回数
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// true の間、`save` は Io エラーを返して内容を変えない
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl TaskStore for InMemoryTaskStore {
    fn load(&self) -> Result<Vec<TaskRecord>, NudgeError> {
        Ok(self.snapshot())
    }

    fn save(&self, tasks: &[TaskRecord]) -> Result<(), NudgeError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(NudgeError::io(
                "<memory>",
                std::io::Error::new(std::io::ErrorKind::StorageFull, "simulated write failure"),
            ));
        }
        let mut guard = self
            .tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = tasks.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorKind, OwnerId};

    #[test]
    fn save_replaces_contents_and_counts() {
        let store = InMemoryTaskStore::new();
        let tasks = vec![TaskRecord::new(OwnerId::new(1), "math", "2024-04-01").unwrap()];

        store.save(&tasks).unwrap();
        assert_eq!(store.load().unwrap(), tasks);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn failing_save_keeps_previous_contents() {
        let tasks = vec![TaskRecord::new(OwnerId::new(1), "math", "2024-04-01").unwrap()];
        let store = InMemoryTaskStore::with_tasks(tasks.clone());
        store.fail_saves(true);

        let err = store.save(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(store.snapshot(), tasks);
        assert_eq!(store.save_count(), 0);
    }
}
