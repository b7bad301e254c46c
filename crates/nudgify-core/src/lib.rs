//! nudgify-core
//!
//! Core building blocks for the Nudgify reminder bot.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, command, errors）
//! - **ports**: 抽象化レイヤー（TaskStore, Messenger, UpdateSource, Clock）
//! - **impls**: ports の実装（JsonFileStore, TelegramClient, InMemory 系）
//! - **app**: アプリケーションロジック（builder, commands, dispatch, sweep, poller, keepalive）
//! - **config**: 設定の読み込み（TOML + 環境変数）

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use self::config::{Config, ConfigError};
pub use self::domain::{ErrorKind, NudgeError, OwnerId, TaskRecord};
