//! BotLoop - 受信 → Dispatcher → 返信 のループ
//!
//! コマンドは 1 件ずつ順番に処理する（プロセス内では単一ライター）。
//! 受信に失敗したら少し待って再試行する。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::dispatch::Dispatcher;
use crate::domain::InboundMessage;
use crate::ports::{Messenger, UpdateSource};

const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct BotLoop {
    updates: Arc<dyn UpdateSource>,
    messenger: Arc<dyn Messenger>,
    dispatcher: Dispatcher,
    retry_delay: Duration,
}

/// Running bot handle.
/// - `request_shutdown()` で新しい受信を止める
/// - `shutdown_and_join()` で終了を待てる
pub struct BotHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl BotHandle {
    /// 処理中のコマンドは中断しない。次の受信に進まないだけ。
    pub fn request_shutdown(&self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        if let Err(e) = self.join.await {
            error!(error = %e, "bot loop panicked");
        }
    }
}

impl BotLoop {
    pub fn new(
        updates: Arc<dyn UpdateSource>,
        messenger: Arc<dyn Messenger>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            updates,
            messenger,
            dispatcher,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn spawn(self) -> BotHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move {
            self.run(shutdown_rx).await;
        });
        BotHandle { shutdown_tx, join }
    }

    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        info!("bot loop started");
        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            // long polling は待つので shutdown と競合させる
            let batch = tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                batch = self.updates.next_batch() => batch,
            };

            match batch {
                Ok(messages) => {
                    for message in &messages {
                        self.process(message).await;
                    }
                }
                Err(e) => {
                    warn!(error = %e, delay = ?self.retry_delay, "polling failed, retrying");
                    tokio::select! {
                        _ = shutdown_rx.changed() => {}
                        _ = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }
        }
        info!("bot loop stopped");
    }

    /// Dispatch one message and send the reply, if any.
    pub async fn process(&self, message: &InboundMessage) {
        let Some(reply) = self.dispatcher.handle(message) else {
            debug!(chat_id = %message.chat_id, "ignoring non-command message");
            return;
        };
        if let Err(e) = self.messenger.send_text(message.chat_id, &reply).await {
            error!(chat_id = %message.chat_id, error = %e, "failed to send reply");
        }
    }
}
