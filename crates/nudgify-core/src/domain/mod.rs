//! Domain model (IDs, task records, commands, errors).

pub mod command;
pub mod errors;
pub mod ids;
pub mod task;

pub use self::command::{Command, InboundMessage};
pub use self::errors::{ErrorKind, MessengerError, NudgeError};
pub use self::ids::OwnerId;
pub use self::task::{DUE_DATE_FORMAT, TaskRecord, parse_due_date};
