//! Dispatcher - 受信メッセージ → Command → CommandHandler → 返信テキスト
//!
//! ユーザー起因のエラー（Validation / Duplicate / NotFound）は返信で伝える。
//! ストアの失敗は汎用メッセージを返してログに残す。ループは止めない。

use tracing::{error, warn};

use super::commands::CommandHandler;
use crate::domain::{Command, InboundMessage, NudgeError, TaskRecord};

const START_COMMANDS: &str = "Commands:\n\
                              /add SUBJECT YYYY-MM-DD\n\
                              /list - Show your tasks\n\
                              /delete SUBJECT - Delete a task\n\
                              /help - Show this help message";

const HELP_COMMANDS: &str = "Commands:\n\
                             /add SUBJECT YYYY-MM-DD - Add a task\n\
                             /list - Show your tasks\n\
                             /delete SUBJECT - Remove a task";

#[derive(Clone)]
pub struct Dispatcher {
    handler: CommandHandler,
}

impl Dispatcher {
    pub fn new(handler: CommandHandler) -> Self {
        Self { handler }
    }

    /// Returns the reply text, or `None` when the message is not a command.
    pub fn handle(&self, message: &InboundMessage) -> Option<String> {
        let command = Command::parse(&message.text)?;
        let name = message.sender_name.as_str();
        let owner = message.chat_id;

        let reply = match command {
            Command::Start => format!("Welcome {name}! 👋\n\n{START_COMMANDS}"),
            Command::Help => format!("Here you go {name}! 📖\n\n{HELP_COMMANDS}"),
            Command::Usage(usage) => failure_reply(&NudgeError::Usage(usage)),
            Command::Unknown(other) => {
                warn!(chat_id = %owner, command = %other, "unrecognized command");
                format!(
                    "Hey {name}, I didn't understand that command 🧠\n\
                     Use /help to see available commands."
                )
            }
            Command::Add { subject, due_date } => {
                match self.handler.add(owner, &subject, &due_date) {
                    Ok(task) => format!(
                        "Got it {name}! ✅ Added {} due on {}",
                        task.subject, task.due_date
                    ),
                    Err(e) => failure_reply(&e),
                }
            }
            Command::Delete { subject } => match self.handler.delete(owner, &subject) {
                Ok(task) => format!("Done {name}! 🗑️ Deleted {}", task.subject),
                Err(e) => failure_reply(&e),
            },
            Command::List => match self.handler.list(owner) {
                Ok(tasks) if tasks.is_empty() => format!("No tasks found for you, {name}."),
                Ok(tasks) => render_list(name, &tasks),
                Err(e) => failure_reply(&e),
            },
        };
        Some(reply)
    }
}

fn render_list(name: &str, tasks: &[TaskRecord]) -> String {
    let lines: Vec<String> = tasks
        .iter()
        .map(|t| format!("• {} → {}", t.subject, t.due_date))
        .collect();
    format!("📋 {name}'s Tasks:\n\n{}", lines.join("\n"))
}

fn failure_reply(err: &NudgeError) -> String {
    match err {
        NudgeError::InvalidDate { .. } => "Date must be in YYYY-MM-DD format.".to_string(),
        NudgeError::EmptySubject => "Subject must not be empty.".to_string(),
        NudgeError::Usage(usage) => format!("Usage: {usage}"),
        NudgeError::Duplicate { .. } => "Task already exists.".to_string(),
        NudgeError::NotFound { .. } => "Task not found.".to_string(),
        _ => {
            error!(error = %err, kind = ?err.kind(), "command failed");
            "Something went wrong, please try again later.".to_string()
        }
    }
}
