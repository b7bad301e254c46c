//! InMemory Messenger / UpdateSource（開発用・テスト用）
//!
//! 送信内容を記録し、チャット単位で失敗を仕込める。

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{InboundMessage, MessengerError, OwnerId};
use crate::ports::{Messenger, UpdateSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: OwnerId,
    pub text: String,
}

#[derive(Debug, Default)]
struct RecordingState {
    sent: Vec<SentMessage>,
    names: HashMap<OwnerId, String>,
    failing_sends: HashSet<OwnerId>,
    failing_lookups: HashSet<OwnerId>,
}

/// 送ったメッセージを覚えておくだけの Messenger
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    state: Mutex<RecordingState>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut RecordingState) -> R) -> R {
        let mut guard = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    pub fn with_name(self, chat_id: OwnerId, name: impl Into<String>) -> Self {
        let name = name.into();
        self.with_state(|s| s.names.insert(chat_id, name));
        self
    }

    /// このチャットへの送信を失敗させる
    pub fn fail_sends_to(self, chat_id: OwnerId) -> Self {
        self.with_state(|s| s.failing_sends.insert(chat_id));
        self
    }

    /// このチャットの表示名取得を失敗させる
    pub fn fail_lookups_for(self, chat_id: OwnerId) -> Self {
        self.with_state(|s| s.failing_lookups.insert(chat_id));
        self
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.with_state(|s| s.sent.clone())
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat_id: OwnerId, text: &str) -> Result<(), MessengerError> {
        self.with_state(|s| {
            if s.failing_sends.contains(&chat_id) {
                return Err(MessengerError::Other(format!("send to {chat_id} refused")));
            }
            s.sent.push(SentMessage {
                chat_id,
                text: text.to_string(),
            });
            Ok(())
        })
    }

    async fn display_name(&self, chat_id: OwnerId) -> Result<Option<String>, MessengerError> {
        self.with_state(|s| {
            if s.failing_lookups.contains(&chat_id) {
                return Err(MessengerError::Other(format!("chat {chat_id} unreachable")));
            }
            Ok(s.names.get(&chat_id).cloned())
        })
    }
}

/// あらかじめ積んだバッチを順に返す UpdateSource。尽きたら空を返し続ける。
#[derive(Debug, Default)]
pub struct ScriptedUpdates {
    batches: Mutex<VecDeque<Result<Vec<InboundMessage>, String>>>,
}

impl ScriptedUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&self, batch: Vec<InboundMessage>) {
        self.lock().push_back(Ok(batch));
    }

    pub fn push_failure(&self, reason: impl Into<String>) {
        self.lock().push_back(Err(reason.into()));
    }

    pub fn is_drained(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<Vec<InboundMessage>, String>>> {
        self.batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl UpdateSource for ScriptedUpdates {
    async fn next_batch(&self) -> Result<Vec<InboundMessage>, MessengerError> {
        let next = self.lock().pop_front();
        match next {
            Some(Ok(batch)) => Ok(batch),
            Some(Err(reason)) => Err(MessengerError::Other(reason)),
            None => {
                tokio::task::yield_now().await;
                Ok(Vec::new())
            }
        }
    }
}
