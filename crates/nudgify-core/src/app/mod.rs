//! App - アプリケーション層
//!
//! ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: コンポーネントの構築とワイヤリング
//! - **CommandHandler**: add / delete / list（重複・所有者のルール）
//! - **Dispatcher**: チャットのコマンド解釈と返信文の生成
//! - **ReminderSweep**: 明日が期日のタスクへの通知（1 回の batch）
//! - **BotLoop**: 受信ループ
//! - **keepalive**: 死活監視用の HTTP エンドポイント

pub mod builder;
pub mod commands;
pub mod dispatch;
pub mod keepalive;
pub mod poller;
pub mod sweep;

pub use self::builder::{App, AppBuilder, BuildError};
pub use self::commands::CommandHandler;
pub use self::dispatch::Dispatcher;
pub use self::poller::{BotHandle, BotLoop};
pub use self::sweep::{ReminderSweep, SweepReport};
