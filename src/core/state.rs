//! 运行状态：对话状态、节点枚举与可观测的步数计数器

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::memory::{ConversationLog, Message};

/// 编排者可委派的下一个 Agent（封闭集合）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NextAgent {
    Search,
    Booker,
    End,
}

impl NextAgent {
    pub fn as_str(&self) -> &'static str {
        match self {
            NextAgent::Search => "search",
            NextAgent::Booker => "booker",
            NextAgent::End => "end",
        }
    }
}

impl fmt::Display for NextAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 状态机节点
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// 编排者
    Task,
    Search,
    Booker,
    SearchTools,
    BookerTools,
    End,
}

impl Node {
    pub fn as_str(&self) -> &'static str {
        match self {
            Node::Task => "task",
            Node::Search => "search",
            Node::Booker => "booker",
            Node::SearchTools => "search_tools",
            Node::BookerTools => "booker_tools",
            Node::End => "END",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Node::End)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单次运行独占的对话状态
///
/// `next_agent` 只由编排者写入；Worker 与工具执行器只向日志追加消息。
#[derive(Clone, Debug, Serialize)]
pub struct ConversationState {
    pub log: ConversationLog,
    pub next_agent: NextAgent,
    /// 编排者决定结束时给出的最终结论
    pub verdict: Option<String>,
}

impl ConversationState {
    /// 以一条用户消息开始
    pub fn new(initial_request: impl Into<String>) -> Self {
        let mut log = ConversationLog::new();
        log.append(Message::user(initial_request));
        Self {
            log,
            next_agent: NextAgent::End,
            verdict: None,
        }
    }

    pub fn from_log(log: ConversationLog) -> Self {
        Self {
            log,
            next_agent: NextAgent::End,
            verdict: None,
        }
    }

    /// 最新一条消息是否带工具调用
    pub fn last_has_tool_calls(&self) -> bool {
        self.log.last().map(|m| m.has_tool_calls()).unwrap_or(false)
    }
}

/// 可克隆的步数计数器，运行过程中可从其它任务读取
#[derive(Clone, Debug, Default)]
pub struct StepCounter(Arc<AtomicUsize>);

impl StepCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn increment(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}
