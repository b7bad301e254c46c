//! TelegramClient - Telegram Bot API の Messenger / UpdateSource 実装
//!
//! 使うメソッドは `getUpdates`（long polling）、`sendMessage`、`getChat` の 3 つ。
//!
//! offset はメモリ上にだけ持つ。Telegram 側で update が確定するのは、次の
//! `getUpdates` にそれより大きい offset を渡したとき。BotLoop はバッチを処理し終えてから
//! 次を取りに行くので、途中で落ちた場合は再起動後に同じバッチが再配送される。

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::config::TelegramConfig;
use crate::domain::{InboundMessage, MessengerError, OwnerId};
use crate::ports::{Messenger, UpdateSource};

/// Bot API の共通レスポンス
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    #[serde(default)]
    from: Option<User>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
    #[serde(default)]
    first_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct User {
    #[serde(default)]
    first_name: Option<String>,
}

pub struct TelegramClient {
    token: String,
    api_base: String,
    poll_timeout: Duration,
    /// 次の getUpdates に渡す offset（最後に受け取った update_id + 1）
    offset: AtomicI64,
    client: reqwest::Client,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, MessengerError> {
        let poll_timeout = Duration::from_secs(config.poll_timeout_secs);
        // long polling 分の待ち時間に余裕を持たせる
        let client = reqwest::Client::builder()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build()?;
        Ok(Self {
            token: config.token.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            poll_timeout,
            offset: AtomicI64::new(0),
            client,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        body: serde_json::Value,
    ) -> Result<T, MessengerError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await?;

        // エラー時も Bot API は JSON（ok=false, description）を返す
        let status = response.status();
        let parsed: ApiResponse<T> = response.json().await?;
        match parsed {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(MessengerError::Api {
                method,
                description: description.unwrap_or_else(|| format!("http status {status}")),
            }),
        }
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, chat_id: OwnerId, text: &str) -> Result<(), MessengerError> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                json!({ "chat_id": chat_id.get(), "text": text }),
            )
            .await?;
        Ok(())
    }

    async fn display_name(&self, chat_id: OwnerId) -> Result<Option<String>, MessengerError> {
        let chat: Chat = self
            .call("getChat", json!({ "chat_id": chat_id.get() }))
            .await?;
        Ok(chat.first_name.filter(|name| !name.trim().is_empty()))
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn next_batch(&self) -> Result<Vec<InboundMessage>, MessengerError> {
        let offset = self.offset.load(Ordering::SeqCst);
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                json!({
                    "offset": offset,
                    "timeout": self.poll_timeout.as_secs(),
                    "allowed_updates": ["message"],
                }),
            )
            .await?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset.store(last + 1, Ordering::SeqCst);
        }
        debug!(count = updates.len(), offset, "received updates");

        let messages = updates
            .into_iter()
            .filter_map(|update| {
                let message = update.message?;
                let text = message.text?;
                let sender_name = message
                    .from
                    .and_then(|u| u.first_name)
                    .or(message.chat.first_name)
                    .unwrap_or_else(|| "friend".to_string());
                Some(InboundMessage {
                    chat_id: OwnerId::new(message.chat.id),
                    sender_name,
                    text,
                })
            })
            .collect();
        Ok(messages)
    }
}
