//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」。外部（ファイル、Telegram、時計）への
//! インターフェースを trait として定義し、実装の詳細は `impls` に置く。

pub mod clock;
pub mod messenger;
pub mod task_store;

pub use self::clock::{Clock, FixedClock, ReminderZone, SystemClock};
pub use self::messenger::{Messenger, UpdateSource};
pub use self::task_store::TaskStore;
