//! LLM 客户端抽象（推理 Oracle）
//!
//! 所有后端（OpenAI 兼容 / Mock）实现 LlmClient：输入带角色的消息列表、可选的工具 schema、
//! 可选的结构化输出 schema，返回一条 assistant 回复（可能带 tool calls）。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::memory::{Message, ToolCall};

/// 绑定给 LLM 的工具描述（name / description / 参数 JSON Schema）
#[derive(Clone, Debug, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// 结构化输出约束：回复必须符合该 JSON Schema
#[derive(Clone, Debug, Serialize)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

/// 一次 LLM 调用的完整输入
#[derive(Clone, Debug, Default)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSpec>,
    pub response_schema: Option<ResponseSchema>,
}

impl LlmRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_response_schema(mut self, schema: ResponseSchema) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// LLM 的一条回复
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LlmReply {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl LlmReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
        }
    }
}

/// LLM 调用错误（网络 / 限流 / API / 响应格式）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited (retry after {retry_after_ms} ms)")]
    RateLimited { retry_after_ms: u64 },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Mock script exhausted")]
    ScriptExhausted,
}

impl LlmError {
    /// 网络抖动、限流与 5xx 可重试；4xx 与格式错误不可重试
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Network(_) | LlmError::Timeout | LlmError::RateLimited { .. } => true,
            LlmError::Api { status, .. } => *status >= 500,
            LlmError::InvalidResponse(_) | LlmError::ScriptExhausted => false,
        }
    }
}

/// LLM 客户端 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmReply, LlmError>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}

/// 重试策略：指数退避
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryConfig {
    /// 第 attempt 次重试前的等待时长（attempt 从 0 开始）
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// 带重试的 LLM 客户端装饰器：仅对瞬时错误重试
pub struct RetryingLlmClient {
    inner: Arc<dyn LlmClient>,
    config: RetryConfig,
}

impl RetryingLlmClient {
    pub fn new(inner: Arc<dyn LlmClient>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl LlmClient for RetryingLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmReply, LlmError> {
        let mut attempt = 0;
        loop {
            match self.inner.complete(request).await {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    // 服务端给出的 retry-after 同样受 max_backoff 约束
                    let wait = match &e {
                        LlmError::RateLimited { retry_after_ms } => Duration::from_millis(*retry_after_ms)
                            .max(self.config.backoff_for(attempt))
                            .min(self.config.max_backoff),
                        _ => self.config.backoff_for(attempt),
                    };
                    tracing::warn!(error = %e, attempt, wait_ms = wait.as_millis() as u64, "LLM call failed, retrying");
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn token_usage(&self) -> (u64, u64, u64) {
        self.inner.token_usage()
    }
}
