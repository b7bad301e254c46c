//! JsonFileStore - 1 ファイルの JSON 配列としてタスクを保存する
//!
//! 書き込みは同じディレクトリの一時ファイルに出してから rename する。
//! 途中で失敗しても元のファイルはそのまま残る（単一ライター前提）。

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{NudgeError, TaskRecord};
use crate::ports::TaskStore;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tasks.json".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

/// Stable on-disk form: 2-space pretty JSON plus a trailing newline.
pub fn encode_tasks(tasks: &[TaskRecord]) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_string_pretty(tasks)?;
    json.push('\n');
    Ok(json)
}

impl TaskStore for JsonFileStore {
    fn load(&self) -> Result<Vec<TaskRecord>, NudgeError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                debug!(path = %self.path.display(), "task file does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(NudgeError::io(&self.path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|source| NudgeError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, tasks: &[TaskRecord]) -> Result<(), NudgeError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| NudgeError::io(parent, e))?;
        }

        let json = encode_tasks(tasks).map_err(|source| NudgeError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let staging = self.staging_path();
        if let Err(e) = fs::write(&staging, json) {
            let _ = fs::remove_file(&staging);
            return Err(NudgeError::io(&staging, e));
        }
        if let Err(e) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(NudgeError::io(&self.path, e));
        }

        debug!(path = %self.path.display(), count = tasks.len(), "task file saved");
        Ok(())
    }
}
