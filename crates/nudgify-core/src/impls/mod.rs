//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **JsonFileStore**: JSON ファイルの TaskStore（本番用）
//! - **InMemoryTaskStore**: テスト用・dry-run 用の TaskStore
//! - **TelegramClient**: Telegram Bot API の Messenger / UpdateSource
//! - **RecordingMessenger / ScriptedUpdates**: テスト用・dry-run 用

pub mod inmem_messenger;
pub mod inmem_store;
pub mod json_file_store;
pub mod telegram;

pub use self::inmem_messenger::{RecordingMessenger, ScriptedUpdates, SentMessage};
pub use self::inmem_store::InMemoryTaskStore;
pub use self::json_file_store::JsonFileStore;
pub use self::telegram::TelegramClient;
