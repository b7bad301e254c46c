//! Errors - エラー型と分類
//!
//! ErrorKind は運用上の分類、NudgeError は具体的なエラーです。
//! Validation / Duplicate / NotFound はユーザーに返すだけでストアは変更しません。
//! Parse / Io は操作そのものを失敗させます。

use std::path::PathBuf;

use thiserror::Error;

use super::OwnerId;

/// ErrorKind はエラーの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 入力不正（日付形式、引数の数、空の subject）
    Validation,
    /// (owner_id, subject) が既に存在する
    Duplicate,
    /// 対象のタスクが存在しない
    NotFound,
    /// 永続化ファイルが壊れている
    Parse,
    /// ファイル I/O の失敗
    Io,
    /// メッセージングプラットフォーム呼び出しの失敗
    Platform,
}

/// NudgeError はドメインエラー
#[derive(Debug, Error)]
pub enum NudgeError {
    #[error("invalid due date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("subject must not be empty")]
    EmptySubject,

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("task '{subject}' already exists for owner {owner_id}")]
    Duplicate { owner_id: OwnerId, subject: String },

    #[error("task '{subject}' not found for owner {owner_id}")]
    NotFound { owner_id: OwnerId, subject: String },

    #[error("cannot parse task file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("task file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("messaging platform call failed: {0}")]
    Platform(#[from] MessengerError),
}

impl NudgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NudgeError::InvalidDate { .. } | NudgeError::EmptySubject | NudgeError::Usage(_) => {
                ErrorKind::Validation
            }
            NudgeError::Duplicate { .. } => ErrorKind::Duplicate,
            NudgeError::NotFound { .. } => ErrorKind::NotFound,
            NudgeError::Parse { .. } => ErrorKind::Parse,
            NudgeError::Io { .. } => ErrorKind::Io,
            NudgeError::Platform(_) => ErrorKind::Platform,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NudgeError::Io {
            path: path.into(),
            source,
        }
    }
}

/// MessengerError はプラットフォーム API 呼び出しのエラー
#[derive(Debug, Error)]
pub enum MessengerError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api returned an error for {method}: {description}")]
    Api {
        method: &'static str,
        description: String,
    },

    #[error("{0}")]
    Other(String),
}
