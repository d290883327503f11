//! 错误类型与恢复动作
//!
//! AgentError 是节点内部的错误，由 RecoveryEngine 决定重试、写回日志还是终止；
//! RunError 是一次运行对调用方可见的失败。

use thiserror::Error;

use crate::llm::LlmError;

/// 节点执行过程中可能出现的错误（结构化输出解析、工具、LLM）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Delegation parse error: {0}")]
    DelegationParse(String),

    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    #[error("Unknown tool: {0}")]
    HallucinatedTool(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// 恢复引擎根据错误类型给出的建议动作
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryAction {
    /// 附加纠正提示后重新请求 LLM（不写入日志）
    RetryWithPrompt(String),
    /// 作为工具结果写回日志，交给发起调用的 Worker 自行纠正
    Observe(String),
    /// 终止当前运行
    Abort,
}

/// 一次运行的终止性错误
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Initial request is empty")]
    EmptyRequest,

    #[error("Delegation parse error after {attempts} attempt(s): {detail}")]
    DelegationParse { attempts: u32, detail: String },

    #[error("Exceeded maximum steps ({max_steps})")]
    StepBudgetExceeded { max_steps: usize },

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// 引擎组装失败
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("no API key configured (set OPENAI_API_KEY or WAYFARER__LLM__API_KEY)")]
    MissingApiKey,

    #[error("unsupported LLM provider: {0}")]
    UnsupportedProvider(String),
}
