//! 记忆层：单次运行的只追加对话日志

pub mod conversation;

pub use conversation::{ConversationLog, Message, Role, ToolCall, ORCHESTRATOR_PRODUCER};
