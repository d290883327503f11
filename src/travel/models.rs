//! 旅行工具的输入 / 输出类型
//!
//! 输入类型同时派生 Deserialize（参数校验）与 JsonSchema（绑定给 LLM 的参数 schema）。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// query_database 的参数
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SqlQueryInput {
    /// SQL SELECT query to execute. Check the tool description for available tables and columns.
    pub query: String,
}

/// query_database 的结果：非 SELECT 或 SQL 错误时 success=false 并带 error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SqlQueryResult {
    pub success: bool,
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    pub row_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SqlQueryResult {
    pub fn ok(rows: Vec<serde_json::Map<String, serde_json::Value>>) -> Self {
        Self {
            success: true,
            row_count: rows.len(),
            rows,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            rows: Vec::new(),
            row_count: 0,
            error: Some(error.into()),
        }
    }
}

/// web_search 的参数
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WebSearchInput {
    /// Search query
    pub query: String,
    /// Maximum number of results (omit for the configured default)
    #[serde(default)]
    #[schemars(range(min = 1, max = 10))]
    pub max_results: Option<u32>,
}

/// 单条网页检索结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebSearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub relevance_score: f64,
}

/// 预订类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    Flight,
    Hotel,
    Attraction,
}

impl BookingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingType::Flight => "flight",
            BookingType::Hotel => "hotel",
            BookingType::Attraction => "attraction",
        }
    }
}

/// create_booking 的参数
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BookingInput {
    /// Type of booking
    pub booking_type: BookingType,
    /// ID of the item to book
    pub item_id: i64,
    /// Name of the customer
    pub customer_name: String,
    /// Email of the customer
    pub customer_email: String,
    /// Special requests, if no special requests don't provide this field
    #[serde(default)]
    pub special_requests: Option<String>,
}

/// 预订成功
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingConfirmation {
    pub success: bool,
    pub booking_id: i64,
    pub confirmation_number: String,
    pub total_price: f64,
    pub status: String,
}

/// 预订失败（领域失败，如 Item not found）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingFailure {
    pub success: bool,
    pub error: String,
}

/// create_booking 的结果
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum BookingOutcome {
    Confirmed(BookingConfirmation),
    Failed(BookingFailure),
}

impl BookingOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        BookingOutcome::Failed(BookingFailure {
            success: false,
            error: error.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BookingOutcome::Confirmed(_))
    }
}
