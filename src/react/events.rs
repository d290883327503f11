//! 运行过程事件：用于流式展示委派、工具调用、观察与结束

use serde::Serialize;

use crate::core::{NextAgent, Node};

/// 单步过程事件（可序列化为 JSON 供前端展示）
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// 进入节点（step 从 1 开始）
    NodeEntered { step: usize, node: Node },
    /// 编排者的委派决定
    Delegated {
        next_agent: NextAgent,
        instruction: String,
    },
    /// 调用工具
    ToolCall {
        tool: String,
        args: serde_json::Value,
    },
    /// 工具返回（预览，避免过长）
    Observation { tool: String, preview: String },
    /// Booker 新鲜度检查未通过
    GuardTripped,
    /// 到达 END
    Finished { steps: usize },
    /// 运行中止（步数耗尽、解析失败、LLM 错误）
    Aborted { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_is_tagged() {
        let json = serde_json::to_value(WorkflowEvent::NodeEntered {
            step: 3,
            node: Node::SearchTools,
        })
        .unwrap();
        assert_eq!(json["type"], "node_entered");
        assert_eq!(json["node"], "search_tools");

        let json = serde_json::to_value(WorkflowEvent::Delegated {
            next_agent: NextAgent::Booker,
            instruction: "book flight 1".into(),
        })
        .unwrap();
        assert_eq!(json["next_agent"], "booker");
    }
}
