//! Worker 节点（search / booker）
//!
//! 每个 Worker 绑定固定的工具子集，以角色提示词 + 完整日志调用 LLM：
//! - 回复带 tool call：只保留第一个，追加后交给工具节点执行；
//! - 回复不带 tool call：作为观察结果追加，回到编排者。
//!
//! Booker 在调用 LLM 之前检查新鲜度：最近 `freshness_window` 条消息里必须有编排者的指令，
//! 否则写入纠正消息并直接交还编排者。

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::core::{ConversationState, RunError};
use crate::llm::{LlmClient, LlmReply, LlmRequest};
use crate::memory::{ConversationLog, Message, Role, ORCHESTRATOR_PRODUCER};
use crate::react::prompts::PromptSet;
use crate::tools::{ToolExecutor, QUERY_DATABASE, WEB_SEARCH};

/// 多个 tool call 被截断时追加到内容末尾的说明
pub const SINGLE_CALL_NOTE: &str =
    "FYI only the first tool call was used. The model accepts only one tool call at a time.";

/// Booker 拒绝执行时写入的纠正消息
pub const GUARD_REFUSAL: &str = "I couldn't complete the given task, please rethink and try again";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    Search,
    Booker,
}

impl WorkerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerKind::Search => "search",
            WorkerKind::Booker => "booker",
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次 Worker 回合的结果（每种结果都恰好追加一条消息）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// 追加了带 tool call 的消息；truncated 表示丢弃了多余的调用
    ToolCall { truncated: bool },
    /// 追加了不带 tool call 的观察结果
    Answered,
    /// 新鲜度检查未通过，追加了纠正消息
    GuardTripped,
}

/// 只保留第一个 tool call，并在内容末尾追加说明
pub fn enforce_single_call(mut reply: LlmReply) -> (LlmReply, bool) {
    if reply.tool_calls.len() <= 1 {
        return (reply, false);
    }
    reply.tool_calls.truncate(1);
    reply.content = if reply.content.trim().is_empty() {
        SINGLE_CALL_NOTE.to_string()
    } else {
        format!("{}\n\n{}", reply.content.trim_end(), SINGLE_CALL_NOTE)
    };
    (reply, true)
}

/// 最近 window 条消息中是否有编排者指令
pub fn has_fresh_instruction(log: &ConversationLog, window: usize) -> bool {
    log.recent(window).iter().any(|m| m.is_from(ORCHESTRATOR_PRODUCER))
}

pub struct Worker {
    kind: WorkerKind,
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptSet>,
    executor: ToolExecutor,
    freshness_window: usize,
}

impl Worker {
    pub fn new(
        kind: WorkerKind,
        llm: Arc<dyn LlmClient>,
        prompts: Arc<PromptSet>,
        executor: ToolExecutor,
        freshness_window: usize,
    ) -> Self {
        Self {
            kind,
            llm,
            prompts,
            executor,
            freshness_window,
        }
    }

    pub fn kind(&self) -> WorkerKind {
        self.kind
    }

    /// 该 Worker 的工具执行器（工具节点使用）
    pub fn executor(&self) -> &ToolExecutor {
        &self.executor
    }

    /// Search 依据本次委派中已有的工具结果选择提示词：先看 web_search，再看 query_database
    fn system_prompt(&self, log: &ConversationLog) -> &str {
        match self.kind {
            WorkerKind::Booker => &self.prompts.booker,
            WorkerKind::Search => {
                let current = log.since_last_instruction();
                let used = |tool: &str| current.iter().any(|m| m.role == Role::Tool && m.is_from(tool));
                if used(WEB_SEARCH) {
                    &self.prompts.search_after_web
                } else if used(QUERY_DATABASE) {
                    &self.prompts.search_after_db
                } else {
                    &self.prompts.search
                }
            }
        }
    }

    /// 执行一个 Worker 回合，向日志追加恰好一条消息
    pub async fn act(&self, state: &mut ConversationState) -> Result<WorkerOutcome, RunError> {
        if self.kind == WorkerKind::Booker && !has_fresh_instruction(&state.log, self.freshness_window) {
            tracing::warn!(
                window = self.freshness_window,
                "no recent orchestrator instruction, booker refuses to act"
            );
            state
                .log
                .append(Message::assistant(GUARD_REFUSAL).with_producer(self.kind.as_str()));
            return Ok(WorkerOutcome::GuardTripped);
        }

        let mut messages = Vec::with_capacity(state.log.len() + 1);
        messages.push(Message::system(self.system_prompt(&state.log)));
        messages.extend(state.log.messages().iter().cloned());
        let request = LlmRequest::new(messages).with_tools(self.executor.tool_specs());

        let reply = self.llm.complete(&request).await.map_err(|e| {
            tracing::warn!(worker = %self.kind, error = %e, "worker oracle call failed");
            RunError::from(e)
        })?;

        if reply.tool_calls.is_empty() {
            tracing::debug!(worker = %self.kind, preview = %preview(&reply.content), "worker answered");
            state
                .log
                .append(Message::assistant(reply.content).with_producer(self.kind.as_str()));
            return Ok(WorkerOutcome::Answered);
        }

        let requested = reply.tool_calls.len();
        let (reply, truncated) = enforce_single_call(reply);
        if truncated {
            tracing::warn!(worker = %self.kind, requested, "multiple tool calls, only the first is kept");
        }
        state.log.append(
            Message::assistant(reply.content)
                .with_producer(self.kind.as_str())
                .with_tool_calls(reply.tool_calls),
        );
        Ok(WorkerOutcome::ToolCall { truncated })
    }
}

pub(crate) fn preview(text: &str) -> String {
    if text.chars().count() > 120 {
        format!("{}...", text.chars().take(120).collect::<String>())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::memory::ToolCall;
    use crate::tools::{booker_registry, search_registry};
    use crate::travel::TravelDatabase;

    fn worker(kind: WorkerKind, mock: Arc<MockLlmClient>) -> Worker {
        let db = Arc::new(TravelDatabase::in_memory().unwrap());
        let registry = match kind {
            WorkerKind::Search => search_registry(db, 5),
            WorkerKind::Booker => booker_registry(db, std::time::Duration::from_secs(5)),
        };
        Worker::new(kind, mock, Arc::new(PromptSet::default()), ToolExecutor::new(registry, 5), 8)
    }

    fn instructed(text: &str) -> ConversationState {
        let mut state = ConversationState::new("Plan a trip to LA");
        state
            .log
            .append(Message::user(text).with_producer(ORCHESTRATOR_PRODUCER));
        state
    }

    #[test]
    fn test_enforce_single_call() {
        let calls = (1..=3)
            .map(|i| ToolCall::new(format!("c{i}"), "query_database", serde_json::json!({"query": "SELECT 1"})))
            .collect();
        let (reply, truncated) = enforce_single_call(LlmReply::with_tool_calls("Checking", calls));
        assert!(truncated);
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].id, "c1");
        assert!(reply.content.starts_with("Checking"));
        assert!(reply.content.ends_with(SINGLE_CALL_NOTE));
    }

    #[tokio::test]
    async fn test_booker_guard_skips_oracle() {
        let mock = Arc::new(MockLlmClient::scripted(vec![]));
        let booker = worker(WorkerKind::Booker, Arc::clone(&mock));
        let mut state = instructed("Book flight 1");
        for i in 0..8 {
            state.log.append(Message::assistant(format!("filler {i}")).with_producer("search"));
        }

        let outcome = booker.act(&mut state).await.unwrap();
        assert_eq!(outcome, WorkerOutcome::GuardTripped);
        assert_eq!(mock.call_count(), 0);
        let last = state.log.last().unwrap();
        assert_eq!(last.content, GUARD_REFUSAL);
        assert!(last.is_from("booker"));
        assert!(!last.has_tool_calls());
    }

    #[tokio::test]
    async fn test_booker_instruction_at_window_edge_is_fresh() {
        let mock = Arc::new(MockLlmClient::scripted(vec![Ok(LlmReply::text("Nothing to book"))]));
        let booker = worker(WorkerKind::Booker, Arc::clone(&mock));
        let mut state = instructed("Book flight 1");
        for i in 0..7 {
            state.log.append(Message::assistant(format!("filler {i}")).with_producer("search"));
        }

        assert_eq!(booker.act(&mut state).await.unwrap(), WorkerOutcome::Answered);
        assert_eq!(mock.call_count(), 1);
        assert_ne!(state.log.last().unwrap().content, GUARD_REFUSAL);
    }

    #[tokio::test]
    async fn test_booker_binds_only_create_booking() {
        let mock = Arc::new(MockLlmClient::scripted(vec![Ok(LlmReply::text("Nothing to book"))]));
        let booker = worker(WorkerKind::Booker, Arc::clone(&mock));
        let mut state = instructed("Book flight 1");

        assert_eq!(booker.act(&mut state).await.unwrap(), WorkerOutcome::Answered);
        let tools: Vec<String> = mock.requests()[0].tools.iter().map(|t| t.name.clone()).collect();
        assert_eq!(tools, vec!["create_booking"]);
        assert!(state.log.last().unwrap().is_from("booker"));
    }

    #[tokio::test]
    async fn test_search_prompt_follows_latest_tool_result() {
        let mock = Arc::new(MockLlmClient::scripted(vec![
            Ok(LlmReply::text("a")),
            Ok(LlmReply::text("b")),
            Ok(LlmReply::text("c")),
        ]));
        let search = worker(WorkerKind::Search, Arc::clone(&mock));
        let prompts = PromptSet::default();

        let mut state = instructed("Find flights");
        search.act(&mut state).await.unwrap();

        let mut state = instructed("Find flights");
        state.log.append(Message::tool(QUERY_DATABASE, "c1", "{}"));
        search.act(&mut state).await.unwrap();

        // 之前委派中的 web_search 结果不影响本次委派
        let mut state = ConversationState::new("Plan a trip to LA");
        state.log.append(Message::user("Check weather").with_producer(ORCHESTRATOR_PRODUCER));
        state.log.append(Message::tool(WEB_SEARCH, "c0", "[]"));
        state.log.append(Message::user("Find hotels").with_producer(ORCHESTRATOR_PRODUCER));
        state.log.append(Message::tool(QUERY_DATABASE, "c1", "{}"));
        search.act(&mut state).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].messages[0].content, prompts.search);
        assert_eq!(requests[1].messages[0].content, prompts.search_after_db);
        assert_eq!(requests[2].messages[0].content, prompts.search_after_db);
    }

    #[tokio::test]
    async fn test_search_truncates_multiple_calls() {
        let calls = vec![
            ToolCall::new("c1", WEB_SEARCH, serde_json::json!({"query": "LA weather"})),
            ToolCall::new("c2", QUERY_DATABASE, serde_json::json!({"query": "SELECT 1"})),
        ];
        let mock = Arc::new(MockLlmClient::scripted(vec![Ok(LlmReply::with_tool_calls("", calls))]));
        let search = worker(WorkerKind::Search, mock);
        let mut state = instructed("Find flights");

        let outcome = search.act(&mut state).await.unwrap();
        assert_eq!(outcome, WorkerOutcome::ToolCall { truncated: true });
        let last = state.log.last().unwrap();
        assert_eq!(last.tool_calls.len(), 1);
        assert_eq!(last.content, SINGLE_CALL_NOTE);
    }
}
