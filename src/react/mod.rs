//! Reason-Act 节点：编排者、Worker、提示词、结构化输出与过程事件

pub mod events;
pub mod orchestrator;
pub mod prompts;
pub mod structured;
pub mod worker;

pub use events::WorkflowEvent;
pub use orchestrator::{DelegationDecision, Orchestrator};
pub use prompts::PromptSet;
pub use structured::{extract_json, parse_structured};
pub use worker::{
    enforce_single_call, has_fresh_instruction, Worker, WorkerKind, WorkerOutcome, GUARD_REFUSAL,
    SINGLE_CALL_NOTE,
};
