//! Messenger port - 外部メッセージングプラットフォームとの境界
//!
//! コマンド処理とリマインダーが必要とするのは次の 3 つだけ：
//! - 受信（コマンド名・引数・チャット ID・表示名）→ `UpdateSource`
//! - チャット ID 宛てのテキスト送信 → `Messenger::send_text`
//! - チャット ID から表示名の取得 → `Messenger::display_name`

use async_trait::async_trait;

use crate::domain::{InboundMessage, MessengerError, OwnerId};

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, chat_id: OwnerId, text: &str) -> Result<(), MessengerError>;

    /// 表示名（first name）。プラットフォーム側に名前が無ければ `None`。
    async fn display_name(&self, chat_id: OwnerId) -> Result<Option<String>, MessengerError>;
}

/// UpdateSource は受信メッセージを取り出す（long polling など）
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// 次のまとまりを待つ。何も無ければ空の Vec。
    async fn next_batch(&self) -> Result<Vec<InboundMessage>, MessengerError>;
}
