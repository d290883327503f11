//! web_search 工具：模拟网页检索（天气、游玩建议等）

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::schema::{parse_args, schema_value};
use crate::tools::Tool;
use crate::travel::{mock_web_search, WebSearchInput};

pub const WEB_SEARCH: &str = "web_search";

/// 检索结果条数上限（含）
const MAX_RESULTS_LIMIT: u32 = 10;

/// 参数缺省或为 null 的 max_results 取 default_max_results（来自配置）
pub struct WebSearchTool {
    default_max_results: u32,
}

impl WebSearchTool {
    pub fn new(default_max_results: u32) -> Self {
        Self { default_max_results }
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new(5)
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        WEB_SEARCH
    }

    fn description(&self) -> &str {
        "Search online for information (weather, travel tips, things to do)."
    }

    fn parameters_schema(&self) -> Value {
        schema_value::<WebSearchInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: WebSearchInput = parse_args(WEB_SEARCH, args)?;
        let max_results = input.max_results.unwrap_or(self.default_max_results);
        if max_results == 0 || max_results > MAX_RESULTS_LIMIT {
            return Err(format!(
                "invalid arguments for {WEB_SEARCH}: max_results must be between 1 and {MAX_RESULTS_LIMIT}"
            ));
        }
        let results = mock_web_search(&input.query, max_results);
        serde_json::to_string(&results).map_err(|e| e.to_string())
    }
}
