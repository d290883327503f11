//! 结构化输出解析
//!
//! 模型可能返回纯 JSON、markdown json 代码块，或夹在说明文字中的 JSON 对象；依次尝试这三种形式。

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;

static FENCED_BLOCK_RE: OnceLock<Regex> = OnceLock::new();

fn fenced_block() -> &'static Regex {
    FENCED_BLOCK_RE.get_or_init(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").unwrap())
}

/// 从文本中取出最可能的 JSON 片段
pub fn extract_json(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed);
    }
    if let Some(body) = fenced_block()
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| s.starts_with('{'))
    {
        return Some(body);
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (start < end).then(|| &trimmed[start..=end])
}

/// 提取并反序列化；错误信息可直接放进纠正提示
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    let json = extract_json(text).ok_or_else(|| "reply contains no JSON object".to_string())?;
    serde_json::from_str(json).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Pick {
        next_agent: String,
    }

    #[test]
    fn test_raw_json() {
        let p: Pick = parse_structured(r#" {"next_agent": "search"} "#).unwrap();
        assert_eq!(p.next_agent, "search");
    }

    #[test]
    fn test_fenced_block() {
        let text = "Here you go:\n```json\n{\"next_agent\": \"booker\"}\n```\nThanks";
        let p: Pick = parse_structured(text).unwrap();
        assert_eq!(p.next_agent, "booker");
    }

    #[test]
    fn test_embedded_object() {
        let text = "Decision: {\"next_agent\": \"end\"} done.";
        assert_eq!(extract_json(text), Some("{\"next_agent\": \"end\"}"));
    }

    #[test]
    fn test_no_json() {
        let err = parse_structured::<Pick>("I think we should search next").unwrap_err();
        assert_eq!(err, "reply contains no JSON object");
    }
}
