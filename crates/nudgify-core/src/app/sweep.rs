//! ReminderSweep - 「明日が期日」のタスクに 1 回だけ通知する
//!
//! # フロー
//! 1. Clock + ReminderZone から tomorrow を計算
//! 2. ストアを全件ロード（失敗したら sweep 全体を中断）
//! 3. レコードごとに due_date を解釈（壊れていたら warn して次へ）
//! 4. tomorrow かつ未通知なら、表示名を引いて送信。成功したものだけ reminded = true
//! 5. 変更があったときだけ 1 回保存
//!
//! 送信や名前解決の失敗はレコード単位で握りつぶしてログに残す。

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::domain::{NudgeError, TaskRecord};
use crate::ports::{Clock, Messenger, ReminderZone, TaskStore};

/// 表示名が取れなかったときの呼びかけ
pub const FALLBACK_NAME: &str = "friend";

pub fn reminder_text(name: &str, subject: &str) -> String {
    format!(
        "hey {name} 🌸\njust a little reminder that your {subject} assignment is due tomorrow\n\
         do it calmly, no stress. i'm rooting for you 💪"
    )
}

/// 1 回の sweep の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub tomorrow: Option<NaiveDate>,
    /// 明日が期日で未通知だったレコード数
    pub due: usize,
    pub sent: usize,
    /// 名前解決または送信に失敗した数
    pub failed: usize,
    /// due_date が解釈できずスキップした数
    pub invalid_dates: usize,
    /// ストアに書き戻したか
    pub persisted: bool,
}

pub struct ReminderSweep {
    store: Arc<dyn TaskStore>,
    messenger: Arc<dyn Messenger>,
    clock: Arc<dyn Clock>,
    zone: ReminderZone,
}

impl ReminderSweep {
    pub fn new(
        store: Arc<dyn TaskStore>,
        messenger: Arc<dyn Messenger>,
        clock: Arc<dyn Clock>,
        zone: ReminderZone,
    ) -> Self {
        Self {
            store,
            messenger,
            clock,
            zone,
        }
    }

    /// Run one pass over the whole store.
    ///
    /// # Errors
    ///
    /// Only store failures (corrupt file on load, I/O on save) abort the sweep.
    pub async fn run(&self) -> Result<SweepReport, NudgeError> {
        let tomorrow = self.zone.tomorrow(self.clock.as_ref());
        let mut report = SweepReport {
            tomorrow: Some(tomorrow),
            ..SweepReport::default()
        };

        let mut tasks = self.store.load()?;
        let mut changed = false;

        for task in tasks.iter_mut() {
            match task.needs_reminder(tomorrow) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!(owner_id = %task.owner_id, subject = %task.subject, error = %e, "skipping task with invalid due date");
                    report.invalid_dates += 1;
                    continue;
                }
            }

            report.due += 1;
            if self.remind(task).await {
                task.reminded = true;
                changed = true;
                report.sent += 1;
            } else {
                report.failed += 1;
            }
        }

        if changed {
            self.store.save(&tasks)?;
            report.persisted = true;
            info!(sent = report.sent, "task file updated");
        }

        Ok(report)
    }

    /// 名前を引いて送る。成功したら true。
    async fn remind(&self, task: &TaskRecord) -> bool {
        let name = match self.messenger.display_name(task.owner_id).await {
            Ok(name) => name.unwrap_or_else(|| FALLBACK_NAME.to_string()),
            Err(e) => {
                error!(owner_id = %task.owner_id, subject = %task.subject, error = %e, "failed to look up chat");
                return false;
            }
        };

        let text = reminder_text(&name, &task.subject);
        match self.messenger.send_text(task.owner_id, &text).await {
            Ok(()) => {
                info!(owner_id = %task.owner_id, %name, subject = %task.subject, "reminder sent");
                true
            }
            Err(e) => {
                error!(owner_id = %task.owner_id, subject = %task.subject, error = %e, "failed to send reminder");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorKind, OwnerId};
    use crate::impls::{InMemoryTaskStore, RecordingMessenger};
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};

    const ALICE: OwnerId = OwnerId::new(1);
    const BOB: OwnerId = OwnerId::new(2);

    // 2024-03-01 09:00 UTC → tomorrow = 2024-03-02
    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ))
    }

    fn task(owner: OwnerId, subject: &str, due: &str) -> TaskRecord {
        TaskRecord {
            owner_id: owner,
            subject: subject.to_string(),
            due_date: due.to_string(),
            reminded: false,
        }
    }

    fn sweep(store: &Arc<InMemoryTaskStore>, messenger: &Arc<RecordingMessenger>) -> ReminderSweep {
        ReminderSweep::new(
            store.clone(),
            messenger.clone(),
            clock(),
            "UTC".parse().unwrap(),
        )
    }

    #[tokio::test]
    async fn due_tomorrow_is_sent_once_and_persisted_once() {
        let store = Arc::new(InMemoryTaskStore::with_tasks(vec![
            task(ALICE, "math", "2024-03-02"),
            task(ALICE, "art", "2024-03-05"),
        ]));
        let messenger = Arc::new(RecordingMessenger::new().with_name(ALICE, "Aiko"));
        let sweep = sweep(&store, &messenger);

        let report = sweep.run().await.unwrap();
        assert_eq!(report.sent, 1);
        assert!(report.persisted);
        assert_eq!(store.save_count(), 1);

        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, ALICE);
        assert_eq!(sent[0].text, reminder_text("Aiko", "math"));

        let tasks = store.snapshot();
        assert!(tasks[0].reminded);
        assert!(!tasks[1].reminded);

        // 2 回目は何も送らず、何も書かない
        let again = sweep.run().await.unwrap();
        assert_eq!(again.due, 0);
        assert_eq!(again.sent, 0);
        assert!(!again.persisted);
        assert_eq!(messenger.sent().len(), 1);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn invalid_date_is_skipped_without_blocking_others() {
        let store = Arc::new(InMemoryTaskStore::with_tasks(vec![
            task(ALICE, "broken", "2024/03/02"),
            task(BOB, "essay", "2024-03-02"),
        ]));
        let messenger = Arc::new(RecordingMessenger::new());

        let report = sweep(&store, &messenger).run().await.unwrap();
        assert_eq!(report.invalid_dates, 1);
        assert_eq!(report.sent, 1);

        let tasks = store.snapshot();
        assert!(!tasks[0].reminded);
        assert_eq!(tasks[0].due_date, "2024/03/02");
        assert!(tasks[1].reminded);
    }

    #[tokio::test]
    async fn unpadded_stored_date_is_reminded_and_kept_as_written() {
        let store = Arc::new(InMemoryTaskStore::with_tasks(vec![task(
            ALICE, "chemistry", "2024-3-2",
        )]));
        let messenger = Arc::new(RecordingMessenger::new().with_name(ALICE, "Aiko"));

        let report = sweep(&store, &messenger).run().await.unwrap();
        assert_eq!(report.invalid_dates, 0);
        assert_eq!(report.sent, 1);
        assert_eq!(messenger.sent()[0].text, reminder_text("Aiko", "chemistry"));

        let tasks = store.snapshot();
        assert!(tasks[0].reminded);
        assert_eq!(tasks[0].due_date, "2024-3-2");
    }

    #[tokio::test]
    async fn missing_name_falls_back_to_friend() {
        let store = Arc::new(InMemoryTaskStore::with_tasks(vec![task(
            BOB,
            "essay",
            "2024-03-02",
        )]));
        let messenger = Arc::new(RecordingMessenger::new());

        sweep(&store, &messenger).run().await.unwrap();
        assert!(messenger.sent()[0].text.starts_with("hey friend 🌸"));
    }

    #[tokio::test]
    async fn platform_failures_are_isolated_per_record() {
        let carol = OwnerId::new(3);
        let store = Arc::new(InMemoryTaskStore::with_tasks(vec![
            task(ALICE, "math", "2024-03-02"),
            task(BOB, "essay", "2024-03-02"),
            task(carol, "lab", "2024-03-02"),
        ]));
        let messenger = Arc::new(
            RecordingMessenger::new()
                .fail_lookups_for(ALICE)
                .fail_sends_to(BOB),
        );

        let report = sweep(&store, &messenger).run().await.unwrap();
        assert_eq!(report.due, 3);
        assert_eq!(report.failed, 2);
        assert_eq!(report.sent, 1);

        let reminded: Vec<bool> = store.snapshot().iter().map(|t| t.reminded).collect();
        assert_eq!(reminded, vec![false, false, true]);
    }

    #[tokio::test]
    async fn nothing_due_means_no_write() {
        let store = Arc::new(InMemoryTaskStore::with_tasks(vec![task(
            ALICE,
            "math",
            "2024-03-01",
        )]));
        let messenger = Arc::new(RecordingMessenger::new());

        let report = sweep(&store, &messenger).run().await.unwrap();
        assert_eq!(report.sent, 0);
        assert!(!report.persisted);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn all_sends_failing_means_no_write() {
        let store = Arc::new(InMemoryTaskStore::with_tasks(vec![task(
            ALICE,
            "math",
            "2024-03-02",
        )]));
        let messenger = Arc::new(RecordingMessenger::new().fail_sends_to(ALICE));

        let report = sweep(&store, &messenger).run().await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn save_failure_aborts_the_sweep() {
        let store = Arc::new(InMemoryTaskStore::with_tasks(vec![task(
            ALICE,
            "math",
            "2024-03-02",
        )]));
        store.fail_saves(true);
        let messenger = Arc::new(RecordingMessenger::new());

        let err = sweep(&store, &messenger).run().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(!store.snapshot()[0].reminded);
    }

    #[tokio::test]
    async fn tomorrow_follows_configured_zone() {
        // 2024-03-01 20:00 UTC は東京では 3/2 の早朝なので tomorrow = 3/3
        let store = Arc::new(InMemoryTaskStore::with_tasks(vec![
            task(ALICE, "math", "2024-03-02"),
            task(BOB, "essay", "2024-03-03"),
        ]));
        let messenger = Arc::new(RecordingMessenger::new());
        let sweep = ReminderSweep::new(
            store.clone(),
            messenger.clone(),
            Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap(),
            )),
            "Asia/Tokyo".parse().unwrap(),
        );

        let report = sweep.run().await.unwrap();
        assert_eq!(
            report.tomorrow,
            Some(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap())
        );
        assert_eq!(messenger.sent().len(), 1);
        assert_eq!(messenger.sent()[0].chat_id, BOB);
    }
}
