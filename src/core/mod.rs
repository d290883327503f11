//! 核心编排层：错误与恢复、运行状态、路由、引擎与构建器

pub mod builder;
pub mod engine;
pub mod error;
pub mod recovery;
pub mod router;
pub mod state;

pub use builder::{create_llm_from_config, EngineBuilder};
pub use engine::{WorkflowEngine, WorkflowRun};
pub use error::{AgentError, BuildError, RecoveryAction, RunError};
pub use recovery::RecoveryEngine;
pub use router::route;
pub use state::{ConversationState, NextAgent, Node, StepCounter};
