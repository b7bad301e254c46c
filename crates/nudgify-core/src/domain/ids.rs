//! Domain identifiers (strongly-typed IDs).
//!
//! OwnerId はメッセージングプラットフォーム側のチャット ID をそのまま包む newtype です。
//! 値の意味は解釈しません（opaque）。
//!
//! ## なぜ newtype にするのか？
//! - i64 の生値と混同できない（subject の長さ等と取り違えない）
//! - JSON 上は素の整数のまま（`#[serde(transparent)]`）

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the chat that owns a task.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(i64);

impl OwnerId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for OwnerId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
