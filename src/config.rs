//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `WAYFARER__*` 覆盖（双下划线表示嵌套，如 `WAYFARER__WORKFLOW__MAX_STEPS=80`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub workflow: WorkflowSection,
    pub tools: ToolsSection,
    pub database: DatabaseSection,
}

/// [app] 段
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [llm] 段：后端、模型分级、超时与重试
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    #[serde(default = "default_provider")]
    pub provider: String,
    /// 编排者与 Search 使用的模型
    #[serde(default = "default_model")]
    pub model: String,
    /// Booker 使用的模型（未设置时与 model 相同）
    pub booker_model: Option<String>,
    pub base_url: Option<String>,
    /// 未设置时读取 OPENAI_API_KEY
    pub api_key: Option<String>,
    /// 单次请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry: LlmRetrySection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            booker_model: None,
            base_url: None,
            api_key: None,
            timeout_secs: default_request_timeout(),
            retry: LlmRetrySection::default(),
        }
    }
}

impl LlmSection {
    /// 配置中的 key 优先，其次 OPENAI_API_KEY
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

/// [llm.retry] 段：瞬时错误的指数退避
#[derive(Debug, Clone, Deserialize)]
pub struct LlmRetrySection {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for LlmRetrySection {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    2
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    8000
}

/// [workflow] 段：步数预算、新鲜度窗口、编排者重试
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowSection {
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default = "default_freshness_window")]
    pub freshness_window: usize,
    #[serde(default = "default_orchestrator_retries")]
    pub orchestrator_retries: u32,
}

impl Default for WorkflowSection {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            freshness_window: default_freshness_window(),
            orchestrator_retries: default_orchestrator_retries(),
        }
    }
}

fn default_max_steps() -> usize {
    50
}

fn default_freshness_window() -> usize {
    8
}

fn default_orchestrator_retries() -> u32 {
    1
}

/// [tools] 段：工具超时与检索默认值
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
    #[serde(default)]
    pub search: SearchSection,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: default_tool_timeout_secs(),
            search: SearchSection::default(),
        }
    }
}

fn default_tool_timeout_secs() -> u64 {
    30
}

/// [tools.search] 段
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSection {
    #[serde(default = "default_max_results")]
    pub default_max_results: u32,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            default_max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> u32 {
    5
}

/// [database] 段：SQLite 文件路径，`:memory:` 为内存库
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSection {
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    ":memory:".to_string()
}

/// 从 config 目录加载配置，环境变量 WAYFARER__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 WAYFARER__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("WAYFARER")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.workflow.max_steps, 50);
        assert_eq!(cfg.workflow.freshness_window, 8);
        assert_eq!(cfg.workflow.orchestrator_retries, 1);
        assert_eq!(cfg.tools.tool_timeout_secs, 30);
        assert_eq!(cfg.tools.search.default_max_results, 5);
        assert_eq!(cfg.database.path, ":memory:");
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wayfarer.toml");
        std::fs::write(
            &path,
            "[workflow]\nmax_steps = 12\n\n[llm]\nmodel = \"gpt-4o-mini\"\nbooker_model = \"gpt-4o-mini\"\n",
        )
        .unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.workflow.max_steps, 12);
        assert_eq!(cfg.workflow.freshness_window, 8);
        assert_eq!(cfg.llm.booker_model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(cfg.llm.retry.max_retries, 2);
    }
}
