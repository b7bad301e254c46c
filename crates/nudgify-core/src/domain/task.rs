use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{NudgeError, OwnerId};

/// 期日の書式（ISO 8601 の暦日）
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a due date strictly as `YYYY-MM-DD`.
///
/// chrono はゼロ埋めなし（`2024-1-5`）も受け付けるので、
/// 書き戻した文字列が入力と一致するものだけを通す。
pub fn parse_due_date(input: &str) -> Result<NaiveDate, NudgeError> {
    let invalid = || NudgeError::InvalidDate {
        input: input.to_string(),
    };
    let date = NaiveDate::parse_from_str(input, DUE_DATE_FORMAT).map_err(|_| invalid())?;
    if date.format(DUE_DATE_FORMAT).to_string() != input {
        return Err(invalid());
    }
    Ok(date)
}

/// 永続化される唯一のエンティティ。
///
/// `due_date` は文字列のまま保持する。手で編集されたファイルに壊れた日付が
/// 入っていてもロード自体は成功させ、判定はリマインダー側でレコード単位に行う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(alias = "user_id")]
    pub owner_id: OwnerId,
    pub subject: String,
    pub due_date: String,
    #[serde(default)]
    pub reminded: bool,
}

impl TaskRecord {
    /// Build a fresh record. The date is validated; `reminded` starts false.
    pub fn new(owner_id: OwnerId, subject: &str, due_date: &str) -> Result<Self, NudgeError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(NudgeError::EmptySubject);
        }
        let date = parse_due_date(due_date.trim())?;
        Ok(Self {
            owner_id,
            subject: subject.to_string(),
            due_date: date.format(DUE_DATE_FORMAT).to_string(),
            reminded: false,
        })
    }

    /// 保存済みの日付はゼロ埋めなし（`2024-9-10`）も読む。
    /// 古いボットは入力をそのまま保存していた。
    pub fn due_date(&self) -> Result<NaiveDate, NudgeError> {
        NaiveDate::parse_from_str(&self.due_date, DUE_DATE_FORMAT).map_err(|_| {
            NudgeError::InvalidDate {
                input: self.due_date.clone(),
            }
        })
    }

    pub fn belongs_to(&self, owner_id: OwnerId) -> bool {
        self.owner_id == owner_id
    }

    pub fn matches(&self, owner_id: OwnerId, subject: &str) -> bool {
        self.owner_id == owner_id && self.subject == subject
    }

    /// Due on `tomorrow` and not yet reminded.
    pub fn needs_reminder(&self, tomorrow: NaiveDate) -> Result<bool, NudgeError> {
        Ok(!self.reminded && self.due_date()? == tomorrow)
    }
}
