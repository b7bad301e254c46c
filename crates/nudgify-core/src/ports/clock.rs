//! Clock port - 時刻の抽象化
//!
//! リマインダーの「明日」は実行時刻から計算するので、時刻源とタイムゾーンを
//! 明示的に注入できるようにしておく。
//!
//! - **SystemClock**: 本番用
//! - **FixedClock**: テスト用

use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, Utc};
use chrono_tz::Tz;

/// Clock は現在時刻を提供
///
/// # テスト容易性
/// - trait により時刻を差し替え可能
/// - テストでは FixedClock を使用
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// OS の時計をそのまま使う
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 常に同じ時刻を返す
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}

/// 「今日」を決めるタイムゾーン
///
/// 未指定ならホストのローカル時刻。ユーザーごとのタイムゾーンは持たない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReminderZone {
    #[default]
    Local,
    Named(Tz),
}

impl ReminderZone {
    /// Calendar date of `instant` in this zone.
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            ReminderZone::Local => instant.with_timezone(&Local).date_naive(),
            ReminderZone::Named(tz) => instant.with_timezone(tz).date_naive(),
        }
    }

    /// The day after the clock's current date in this zone.
    pub fn tomorrow(&self, clock: &dyn Clock) -> NaiveDate {
        self.date_of(clock.now())
            .succ_opt()
            .unwrap_or(NaiveDate::MAX)
    }
}

impl FromStr for ReminderZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("local") {
            return Ok(ReminderZone::Local);
        }
        s.parse::<Tz>()
            .map(ReminderZone::Named)
            .map_err(|_| format!("unknown time zone '{s}'"))
    }
}
