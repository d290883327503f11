//! 参数 Schema 生成与校验（schemars 自动生成工具 / 结构化输出 Schema）

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;

/// 类型 T 的 JSON Schema（serde_json::Value 形式），用于工具参数与结构化输出
pub fn schema_value<T: JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schema_for!(T)).unwrap_or_else(|_| serde_json::json!({"type": "object"}))
}

/// 将 tool call 参数反序列化为类型化输入；失败时返回可直接展示给 LLM 的描述
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: serde_json::Value) -> Result<T, String> {
    serde_json::from_value(args).map_err(|e| format!("invalid arguments for {tool}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::travel::{BookingInput, WebSearchInput};

    #[test]
    fn test_booking_schema_lists_enum_and_required() {
        let schema = schema_value::<BookingInput>();
        let text = schema.to_string();
        assert!(text.contains("attraction"));
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "item_id"));
        assert!(!required.iter().any(|v| v == "special_requests"));
    }

    #[test]
    fn test_parse_args_reports_tool_name() {
        let err = parse_args::<WebSearchInput>("web_search", serde_json::json!({"max_results": 3})).unwrap_err();
        assert!(err.starts_with("invalid arguments for web_search"));
        assert!(err.contains("query"));
    }
}
