//! 工具执行器
//!
//! 持有某个 Worker 的 ToolRegistry 与全局超时。execute(tool_name, args) 在超时内调用工具
//! （不可中断的工具除外，它们执行到底并自行限制等待），
//! 未注册的工具、工具失败、超时分别映射为 HallucinatedTool / ToolExecutionFailed / ToolTimeout；
//! 每次调用输出结构化审计日志（JSON）。invoke 把结果（或经 RecoveryEngine 转换的错误）包装成 tool 消息。

use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::core::{AgentError, RecoveryAction, RecoveryEngine};
use crate::llm::ToolSpec;
use crate::memory::{Message, ToolCall};
use crate::tools::ToolRegistry;

/// 工具执行器：对每次调用施加超时，并将结果映射为 AgentError
pub struct ToolExecutor {
    registry: ToolRegistry,
    timeout: Duration,
    recovery: RecoveryEngine,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, timeout_secs: u64) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(timeout_secs),
            recovery: RecoveryEngine::new(),
        }
    }

    /// 执行指定工具；未注册返回 HallucinatedTool，超时返回 ToolTimeout，工具返回 Err 则转为 ToolExecutionFailed
    pub async fn execute(&self, tool_name: &str, args: serde_json::Value) -> Result<String, AgentError> {
        let start = Instant::now();
        let args_preview = args_preview(&args);

        let Some(tool) = self.registry.get(tool_name) else {
            audit(tool_name, false, "unknown_tool", start, &args_preview);
            return Err(AgentError::HallucinatedTool(tool_name.to_string()));
        };

        let result = if tool.interruptible() {
            timeout(self.timeout, tool.execute(args)).await
        } else {
            Ok(tool.execute(args).await)
        };

        let (ok, outcome): (bool, &str) = match &result {
            Ok(Ok(_)) => (true, "ok"),
            Ok(Err(_)) => (false, "error"),
            Err(_) => (false, "timeout"),
        };
        audit(tool_name, ok, outcome, start, &args_preview);

        match result {
            Ok(Ok(content)) => Ok(content),
            Ok(Err(e)) => Err(AgentError::ToolExecutionFailed(e)),
            Err(_) => Err(AgentError::ToolTimeout(tool_name.to_string())),
        }
    }

    /// 执行一次 tool call 并生成回应它的 tool 消息（producer 为工具名，tool_call_id 与之配对）。
    /// 失败不会中断运行，错误文本写入消息内容交由 Worker 观察。
    pub async fn invoke(&self, call: &ToolCall) -> Message {
        let content = match self.execute(&call.tool_name, call.arguments.clone()).await {
            Ok(content) => content,
            Err(err) => match self.recovery.handle(&err) {
                RecoveryAction::Observe(text) => text,
                _ => format!("Error: {err}"),
            },
        };
        Message::tool(call.tool_name.clone(), call.id.clone(), content)
    }

    pub fn tool_specs(&self) -> Vec<ToolSpec> {
        self.registry.tool_specs()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.registry.tool_names()
    }
}

fn audit(tool_name: &str, ok: bool, outcome: &str, start: Instant, args_preview: &str) {
    let audit = serde_json::json!({
        "event": "tool_audit",
        "tool": tool_name,
        "ok": ok,
        "outcome": outcome,
        "duration_ms": start.elapsed().as_millis() as u64,
        "args_preview": args_preview,
    });
    tracing::info!(audit = %audit.to_string(), "tool");
}

fn args_preview(args: &serde_json::Value) -> String {
    let s = args.to_string();
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Role;
    use crate::tools::Tool;
    use async_trait::async_trait;
    use serde_json::Value;

    struct SlowTool;

    #[async_trait]
    impl Tool for SlowTool {
        fn name(&self) -> &str {
            "slow"
        }

        fn description(&self) -> &str {
            "sleeps"
        }

        async fn execute(&self, _args: Value) -> Result<String, String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".to_string())
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "always fails"
        }

        async fn execute(&self, _args: Value) -> Result<String, String> {
            Err("invalid arguments for failing: missing field `query`".to_string())
        }
    }

    fn executor(timeout_secs: u64) -> ToolExecutor {
        let mut registry = ToolRegistry::new();
        registry.register(SlowTool);
        registry.register(FailingTool);
        ToolExecutor::new(registry, timeout_secs)
    }

    #[tokio::test]
    async fn test_unknown_tool_is_hallucinated() {
        let err = executor(1).execute("book_car", Value::Null).await.unwrap_err();
        assert!(matches!(err, AgentError::HallucinatedTool(name) if name == "book_car"));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_tool_timeout() {
        let err = executor(1).execute("slow", Value::Null).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolTimeout(name) if name == "slow"));
    }

    #[tokio::test]
    async fn test_invoke_captures_error_as_tool_message() {
        let call = ToolCall::new("call_7", "failing", serde_json::json!({}));
        let msg = executor(1).invoke(&call).await;
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_7"));
        assert!(msg.is_from("failing"));
        assert!(msg.content.starts_with("Error: "));
        assert!(msg.content.contains("missing field `query`"));
    }

    #[tokio::test]
    async fn test_booking_outlasting_timeout_reports_committed_result() {
        use crate::tools::booker_registry;
        use crate::travel::TravelDatabase;
        use std::sync::Arc;

        let db = Arc::new(TravelDatabase::in_memory().unwrap());
        let executor = ToolExecutor::new(booker_registry(Arc::clone(&db), Duration::from_secs(5)), 1);
        let held = db.hold_connection().await;
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            drop(held);
        });

        let call = ToolCall::new(
            "call_9",
            "create_booking",
            serde_json::json!({
                "booking_type": "flight",
                "item_id": 1,
                "customer_name": "Jane Doe",
                "customer_email": "jane@example.com"
            }),
        );
        let msg = executor.invoke(&call).await;
        let json: Value = serde_json::from_str(&msg.content).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(db.booking_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_booking_on_busy_database_reports_failure_without_writing() {
        use crate::tools::booker_registry;
        use crate::travel::TravelDatabase;
        use std::sync::Arc;

        let db = Arc::new(TravelDatabase::in_memory().unwrap());
        let executor = ToolExecutor::new(booker_registry(Arc::clone(&db), Duration::from_millis(200)), 1);
        let held = db.hold_connection().await;

        let call = ToolCall::new(
            "call_10",
            "create_booking",
            serde_json::json!({
                "booking_type": "hotel",
                "item_id": 1,
                "customer_name": "Jane Doe",
                "customer_email": "jane@example.com"
            }),
        );
        let msg = executor.invoke(&call).await;
        drop(held);

        let json: Value = serde_json::from_str(&msg.content).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().starts_with("Database busy"));
        assert_eq!(db.booking_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool_keeps_pairing() {
        let call = ToolCall::new("call_8", "book_car", serde_json::json!({}));
        let msg = executor(1).invoke(&call).await;
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_8"));
        assert_eq!(msg.content, "Error: Unknown tool: book_car");
    }
}
