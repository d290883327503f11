//! 错误恢复引擎
//!
//! 根据 AgentError 类型返回 RecoveryAction：结构化输出错误 -> 带纠正提示重试；
//! 工具类错误 -> 写回日志供 Worker 观察；LLM 传输错误 -> 终止。

use crate::core::{AgentError, RecoveryAction};

/// 语义化错误恢复：将错误映射为可执行动作
#[derive(Debug, Default)]
pub struct RecoveryEngine;

impl RecoveryEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, err: &AgentError) -> RecoveryAction {
        match err {
            AgentError::DelegationParse(raw) => RecoveryAction::RetryWithPrompt(format!(
                "Your previous reply could not be parsed as a delegation decision: {raw}. \
                Reply with ONLY a JSON object of the form \
                {{\"next_agent\": \"search\" | \"booker\" | \"end\", \"instruction\": \"...\", \
                \"reasoning\": \"...\", \"verdict\": \"...\"}}. \
                next_agent must be exactly one of search, booker or end, and instruction must not be empty \
                unless next_agent is end."
            )),
            AgentError::HallucinatedTool(_)
            | AgentError::ToolExecutionFailed(_)
            | AgentError::ToolTimeout(_) => RecoveryAction::Observe(format!("Error: {err}")),
            AgentError::Llm(_) => RecoveryAction::Abort,
        }
    }
}
