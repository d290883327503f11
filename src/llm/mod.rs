//! LLM 层：推理 Oracle 抽象与实现（OpenAI 兼容 / 重试装饰器 / Mock）

pub mod mock;
pub mod openai;
pub mod traits;

pub use mock::MockLlmClient;
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::{
    LlmClient, LlmError, LlmReply, LlmRequest, ResponseSchema, RetryConfig, RetryingLlmClient,
    ToolSpec,
};
