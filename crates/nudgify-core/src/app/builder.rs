//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! store / messenger / clock / zone を 1 か所で組み立て、
//! CommandHandler・ReminderSweep・BotLoop に同じものを注入する。
//!
//! # Fail-fast 設計
//! - build() 時に必須コンポーネントが揃っているかチェック
//! - 不足があれば BuildError を返す

use std::sync::Arc;

use super::commands::CommandHandler;
use super::dispatch::Dispatcher;
use super::poller::BotLoop;
use super::sweep::ReminderSweep;
use crate::ports::{Clock, Messenger, ReminderZone, SystemClock, TaskStore, UpdateSource};

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing components: {0:?}. These must be provided before build().")]
    MissingComponents(Vec<&'static str>),
}

/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .store(Arc::new(JsonFileStore::new("assignments.json")))
///     .messenger(telegram.clone())
///     .updates(telegram)
///     .require_updates()
///     .build()?;
/// ```
#[derive(Default)]
pub struct AppBuilder {
    store: Option<Arc<dyn TaskStore>>,
    messenger: Option<Arc<dyn Messenger>>,
    updates: Option<Arc<dyn UpdateSource>>,
    clock: Option<Arc<dyn Clock>>,
    zone: ReminderZone,
    require_updates: bool,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    pub fn updates(mut self, updates: Arc<dyn UpdateSource>) -> Self {
        self.updates = Some(updates);
        self
    }

    /// 未指定なら SystemClock
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn zone(mut self, zone: ReminderZone) -> Self {
        self.zone = zone;
        self
    }

    /// bot として動かす場合は受信元も必須にする
    pub fn require_updates(mut self) -> Self {
        self.require_updates = true;
        self
    }

    pub fn build(self) -> Result<App, BuildError> {
        let mut missing = Vec::new();
        if self.store.is_none() {
            missing.push("store");
        }
        if self.messenger.is_none() {
            missing.push("messenger");
        }
        if self.require_updates && self.updates.is_none() {
            missing.push("updates");
        }

        match (self.store, self.messenger) {
            (Some(store), Some(messenger)) if missing.is_empty() => Ok(App {
                store,
                messenger,
                updates: self.updates,
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
                zone: self.zone,
            }),
            _ => Err(BuildError::MissingComponents(missing)),
        }
    }
}

/// 組み立て済みのコンポーネント一式
pub struct App {
    store: Arc<dyn TaskStore>,
    messenger: Arc<dyn Messenger>,
    updates: Option<Arc<dyn UpdateSource>>,
    clock: Arc<dyn Clock>,
    zone: ReminderZone,
}

impl App {
    pub fn command_handler(&self) -> CommandHandler {
        CommandHandler::new(self.store.clone())
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.command_handler())
    }

    pub fn sweep(&self) -> ReminderSweep {
        ReminderSweep::new(
            self.store.clone(),
            self.messenger.clone(),
            self.clock.clone(),
            self.zone,
        )
    }

    /// 受信元が設定されていなければ None
    pub fn bot_loop(&self) -> Option<BotLoop> {
        let updates = self.updates.clone()?;
        Some(BotLoop::new(
            updates,
            self.messenger.clone(),
            self.dispatcher(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OwnerId, TaskRecord};
    use crate::impls::{InMemoryTaskStore, RecordingMessenger, ScriptedUpdates};
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_build_missing_components() {
        let result = AppBuilder::new().require_updates().build();
        assert!(matches!(
            result,
            Err(BuildError::MissingComponents(missing)) if missing == vec!["store", "messenger", "updates"]
        ));
    }

    #[test]
    fn test_build_without_updates_has_no_bot_loop() {
        let app = AppBuilder::new()
            .store(Arc::new(InMemoryTaskStore::new()))
            .messenger(Arc::new(RecordingMessenger::new()))
            .build()
            .unwrap();
        assert!(app.bot_loop().is_none());
    }

    #[test]
    fn test_build_success() {
        let app = AppBuilder::new()
            .store(Arc::new(InMemoryTaskStore::new()))
            .messenger(Arc::new(RecordingMessenger::new()))
            .updates(Arc::new(ScriptedUpdates::new()))
            .require_updates()
            .build();
        assert!(app.is_ok_and(|app| app.bot_loop().is_some()));
    }

    #[tokio::test]
    async fn test_components_share_the_same_store() {
        let store = Arc::new(InMemoryTaskStore::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let app = AppBuilder::new()
            .store(store.clone())
            .messenger(messenger.clone())
            .clock(Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
            )))
            .zone("UTC".parse().unwrap())
            .build()
            .unwrap();

        app.command_handler()
            .add(OwnerId::new(4), "thesis", "2024-05-02")
            .unwrap();
        let report = app.sweep().run().await.unwrap();

        assert_eq!(report.sent, 1);
        assert_eq!(
            store.snapshot(),
            vec![TaskRecord {
                owner_id: OwnerId::new(4),
                subject: "thesis".into(),
                due_date: "2024-05-02".into(),
                reminded: true,
            }]
        );
    }
}
