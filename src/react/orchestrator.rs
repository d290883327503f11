//! 编排者节点（task）
//!
//! 读取完整日志，要求 LLM 按 DelegationDecision 的 JSON Schema 给出下一步委派；
//! 解析或校验失败时由 RecoveryEngine 生成纠正提示重试（只进请求，不进日志），
//! 重试耗尽后以 DelegationParse 终止运行，绝不猜测 next_agent。

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::{AgentError, ConversationState, NextAgent, RecoveryAction, RecoveryEngine, RunError};
use crate::llm::{LlmClient, LlmRequest, ResponseSchema};
use crate::memory::{ConversationLog, Message, ORCHESTRATOR_PRODUCER};
use crate::react::prompts::PromptSet;
use crate::react::structured::parse_structured;
use crate::tools::schema_value;

/// Structured output for task delegation decisions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DelegationDecision {
    /// Which agent to delegate to: 'search' for searching, 'booker' for booking, 'end' when complete
    pub next_agent: NextAgent,
    /// Clear instruction/subtask for the chosen agent
    #[serde(default)]
    pub instruction: String,
    /// Brief explanation of why this delegation was chosen
    #[serde(default)]
    pub reasoning: String,
    /// Final verdict of the task, describing the hotel and flight booked
    #[serde(default)]
    pub verdict: Option<String>,
}

impl DelegationDecision {
    /// 委派给 Worker 时指令不能为空
    pub fn validate(&self) -> Result<(), String> {
        if self.next_agent != NextAgent::End && self.instruction.trim().is_empty() {
            return Err(format!(
                "instruction must not be empty when next_agent is {}",
                self.next_agent
            ));
        }
        Ok(())
    }
}

pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptSet>,
    /// 首次失败后的额外尝试次数
    max_retries: u32,
    recovery: RecoveryEngine,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptSet>, max_retries: u32) -> Self {
        Self {
            llm,
            prompts,
            max_retries,
            recovery: RecoveryEngine::new(),
        }
    }

    fn system_prompt(&self, log: &ConversationLog) -> &str {
        if log.len() <= 1 {
            &self.prompts.task_initial
        } else {
            &self.prompts.task_continuation
        }
    }

    /// 只读日志，返回一个通过校验的决定
    pub async fn decide(&self, log: &ConversationLog) -> Result<DelegationDecision, RunError> {
        let mut messages = Vec::with_capacity(log.len() + 3);
        messages.push(Message::system(self.system_prompt(log)));
        messages.extend(log.messages().iter().cloned());
        let schema = ResponseSchema {
            name: "delegation_decision".to_string(),
            schema: schema_value::<DelegationDecision>(),
        };

        let attempts = self.max_retries + 1;
        let mut correction: Option<(String, String)> = None;
        let mut last_detail = String::new();

        for attempt in 1..=attempts {
            let mut request_messages = messages.clone();
            if let Some((raw, hint)) = &correction {
                request_messages.push(Message::assistant(raw.clone()));
                request_messages.push(Message::user(hint.clone()));
            }
            let request = LlmRequest::new(request_messages).with_response_schema(schema.clone());

            let reply = self.llm.complete(&request).await.map_err(|e| {
                tracing::warn!(error = %e, "orchestrator oracle call failed");
                RunError::from(e)
            })?;

            match parse_structured::<DelegationDecision>(&reply.content)
                .and_then(|d| d.validate().map(|_| d))
            {
                Ok(decision) => return Ok(decision),
                Err(detail) => {
                    tracing::warn!(attempt, attempts, %detail, "delegation decision rejected");
                    let err = AgentError::DelegationParse(detail.clone());
                    last_detail = detail;
                    match self.recovery.handle(&err) {
                        RecoveryAction::RetryWithPrompt(hint) => correction = Some((reply.content, hint)),
                        _ => break,
                    }
                }
            }
        }

        Err(RunError::DelegationParse {
            attempts,
            detail: last_detail,
        })
    }

    /// 决定并写回状态：追加指令消息，设置 next_agent；end 时记录 verdict
    pub async fn run(&self, state: &mut ConversationState) -> Result<DelegationDecision, RunError> {
        let decision = self.decide(&state.log).await?;

        let verdict = decision
            .verdict
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let content = if decision.instruction.trim().is_empty() {
            verdict.clone().unwrap_or_default()
        } else {
            decision.instruction.clone()
        };

        state
            .log
            .append(Message::user(content).with_producer(ORCHESTRATOR_PRODUCER));
        state.next_agent = decision.next_agent;
        if decision.next_agent == NextAgent::End {
            state.verdict = verdict;
        }

        tracing::info!(
            next_agent = %decision.next_agent,
            reasoning = %decision.reasoning,
            "delegated"
        );
        Ok(decision)
    }
}
