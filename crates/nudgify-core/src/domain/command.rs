//! Command - チャットから届くコマンドの解釈
//!
//! # 対応コマンド
//! - `/start`, `/help`, `/list`
//! - `/add <subject> <YYYY-MM-DD>`
//! - `/delete <subject>`
//! - それ以外の `/...` は Unknown
//!
//! 引数の数が合わないものは Usage として扱い、ストアには触れない。

use super::OwnerId;

pub const ADD_USAGE: &str = "/add <remainder_task_name> YYYY-MM-DD";
pub const DELETE_USAGE: &str = "/delete SUBJECT";

/// プラットフォームから届いた 1 件のメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// 返信先かつタスクの所有者
    pub chat_id: OwnerId,
    /// 送信者の表示名（first name）
    pub sender_name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    List,
    Add { subject: String, due_date: String },
    Delete { subject: String },
    /// 既知のコマンドだが引数の数が違う
    Usage(&'static str),
    Unknown(String),
}

impl Command {
    /// Parse a chat message. Returns `None` for plain text (not a command).
    pub fn parse(text: &str) -> Option<Self> {
        let mut words = text.split_whitespace();
        let head = words.next()?.strip_prefix('/')?;
        // `/add@nudgify_bot` のようなグループ向けの宛先は無視する
        let name = head.split('@').next().unwrap_or(head);
        let args: Vec<&str> = words.collect();

        let command = match (name, args.as_slice()) {
            ("start", _) => Command::Start,
            ("help", _) => Command::Help,
            ("list", _) => Command::List,
            ("add", [subject, due_date]) => Command::Add {
                subject: (*subject).to_string(),
                due_date: (*due_date).to_string(),
            },
            ("add", _) => Command::Usage(ADD_USAGE),
            ("delete", [subject]) => Command::Delete {
                subject: (*subject).to_string(),
            },
            ("delete", _) => Command::Usage(DELETE_USAGE),
            (other, _) => Command::Unknown(other.to_string()),
        };
        Some(command)
    }
}
