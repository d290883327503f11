//! Wayfarer - 多 Agent 旅行委派引擎
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 状态、路由、错误与恢复、工作流引擎与构建器
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / 重试 / Mock）
//! - **memory**: 只追加的对话日志
//! - **react**: 编排者、Worker、提示词与过程事件
//! - **tools**: 工具注册表、执行器与三个旅行工具
//! - **travel**: SQLite 旅行库与模拟网页检索

pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod react;
pub mod tools;
pub mod travel;

pub use crate::core::{ConversationState, EngineBuilder, RunError, WorkflowEngine};
