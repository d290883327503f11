//! 引擎构建器：统一的初始化逻辑
//!
//! 从 AppConfig 组装 LLM 客户端（两档模型）、数据库、每个 Worker 的工具集与提示词，
//! 测试中可用 with_llm / with_booker_llm 注入 Mock。

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::core::{BuildError, WorkflowEngine};
use crate::llm::{LlmClient, OpenAiClient, RetryConfig, RetryingLlmClient};
use crate::react::{Orchestrator, PromptSet, Worker, WorkerKind};
use crate::tools::{booker_registry, search_registry, ToolExecutor};
use crate::travel::TravelDatabase;

fn retry_config(cfg: &AppConfig) -> RetryConfig {
    RetryConfig {
        max_retries: cfg.llm.retry.max_retries,
        initial_backoff: Duration::from_millis(cfg.llm.retry.initial_backoff_ms),
        max_backoff: Duration::from_millis(cfg.llm.retry.max_backoff_ms),
    }
}

/// 根据配置创建 OpenAI 兼容客户端（外层包重试）；返回 (主模型, booker 模型)
pub fn create_llm_from_config(
    cfg: &AppConfig,
) -> Result<(Arc<dyn LlmClient>, Arc<dyn LlmClient>), BuildError> {
    let provider = cfg.llm.provider.to_lowercase();
    if provider != "openai" {
        return Err(BuildError::UnsupportedProvider(provider));
    }
    let api_key = cfg.llm.resolve_api_key().ok_or(BuildError::MissingApiKey)?;
    let base = cfg.llm.base_url.as_deref();

    let make = |model: &str| -> Arc<dyn LlmClient> {
        let client = OpenAiClient::new(base, model, Some(api_key.as_str()), cfg.llm.timeout_secs);
        Arc::new(RetryingLlmClient::new(Arc::new(client), retry_config(cfg)))
    };

    tracing::info!("Using OpenAI LLM ({})", cfg.llm.model);
    let main = make(&cfg.llm.model);
    let booker = match cfg.llm.booker_model.as_deref() {
        Some(model) if model != cfg.llm.model => {
            tracing::info!("Booker uses {}", model);
            make(model)
        }
        _ => Arc::clone(&main),
    };
    Ok((main, booker))
}

/// 引擎构建器
pub struct EngineBuilder {
    config: AppConfig,
    llm: Option<Arc<dyn LlmClient>>,
    booker_llm: Option<Arc<dyn LlmClient>>,
    prompts: Option<PromptSet>,
}

impl EngineBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            llm: None,
            booker_llm: None,
            prompts: None,
        }
    }

    /// 编排者与 Search 使用的 LLM（未设置 booker_llm 时 Booker 也用它）
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_booker_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.booker_llm = Some(llm);
        self
    }

    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = Some(prompts);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 组装引擎；未注入 LLM 时按配置创建
    pub fn build(self, db: Arc<TravelDatabase>) -> Result<WorkflowEngine, BuildError> {
        let (llm, booker_llm) = match (self.llm, self.booker_llm) {
            (Some(llm), Some(booker)) => (llm, booker),
            (Some(llm), None) => (Arc::clone(&llm), llm),
            (None, _) => create_llm_from_config(&self.config)?,
        };
        let prompts = Arc::new(self.prompts.unwrap_or_else(PromptSet::discover));
        let cfg = &self.config;

        let orchestrator = Orchestrator::new(
            Arc::clone(&llm),
            Arc::clone(&prompts),
            cfg.workflow.orchestrator_retries,
        );
        let search = Worker::new(
            WorkerKind::Search,
            llm,
            Arc::clone(&prompts),
            ToolExecutor::new(
                search_registry(Arc::clone(&db), cfg.tools.search.default_max_results),
                cfg.tools.tool_timeout_secs,
            ),
            cfg.workflow.freshness_window,
        );
        let booker = Worker::new(
            WorkerKind::Booker,
            booker_llm,
            prompts,
            ToolExecutor::new(
                booker_registry(db, Duration::from_secs(cfg.tools.tool_timeout_secs)),
                cfg.tools.tool_timeout_secs,
            ),
            cfg.workflow.freshness_window,
        );

        Ok(WorkflowEngine::new(
            orchestrator,
            search,
            booker,
            cfg.workflow.max_steps,
        ))
    }
}
