//! TaskStore port - タスク一覧の正本（source of truth）
//!
//! コレクション全体が永続化の単位。変更は毎回「全件ロード → 1 件変更 → 全件保存」。
//! インデックスは持たず、呼び出し側が線形に走査する。
//!
//! # 実装
//! - `impls::JsonFileStore`: JSON ファイル（本番用）
//! - `impls::InMemoryTaskStore`: テスト用・dry-run 用

use crate::domain::{NudgeError, TaskRecord};

/// TaskStore はタスクコレクションの読み書きだけを担う
///
/// # 設計原則
/// - 業務ルール（重複・所有者・reminded 遷移）は持たない
/// - 複数プロセスからの同時書き込みは保護しない（単一ライター前提）
pub trait TaskStore: Send + Sync {
    /// 挿入順のまま全件を返す。ファイルがまだ無ければ空。
    fn load(&self) -> Result<Vec<TaskRecord>, NudgeError>;

    /// 全件を書き戻す。失敗しても以前の内容は残る。
    fn save(&self, tasks: &[TaskRecord]) -> Result<(), NudgeError>;
}
