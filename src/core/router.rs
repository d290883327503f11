//! 路由：当前节点 + 状态 -> 下一个节点（纯函数）

use crate::core::{ConversationState, NextAgent, Node};

pub fn route(current: Node, state: &ConversationState) -> Node {
    match current {
        Node::Task => match state.next_agent {
            NextAgent::Search => Node::Search,
            NextAgent::Booker => Node::Booker,
            NextAgent::End => Node::End,
        },
        Node::Search if state.last_has_tool_calls() => Node::SearchTools,
        Node::Booker if state.last_has_tool_calls() => Node::BookerTools,
        Node::Search | Node::Booker => Node::Task,
        Node::SearchTools => Node::Search,
        Node::BookerTools => Node::Booker,
        Node::End => Node::End,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Message, ToolCall};

    fn state_with_last(msg: Message, next: NextAgent) -> ConversationState {
        let mut state = ConversationState::new("trip");
        state.log.append(msg);
        state.next_agent = next;
        state
    }

    #[test]
    fn test_task_routes_by_next_agent() {
        let mut state = ConversationState::new("trip");
        state.next_agent = NextAgent::Search;
        assert_eq!(route(Node::Task, &state), Node::Search);
        state.next_agent = NextAgent::Booker;
        assert_eq!(route(Node::Task, &state), Node::Booker);
        state.next_agent = NextAgent::End;
        assert_eq!(route(Node::Task, &state), Node::End);
    }

    #[test]
    fn test_workers_route_to_tools_only_with_tool_calls() {
        let call = ToolCall::new("c1", "web_search", serde_json::json!({"query": "LA"}));
        let with_call = state_with_last(Message::assistant("").with_tool_calls(vec![call]), NextAgent::Search);
        assert_eq!(route(Node::Search, &with_call), Node::SearchTools);
        assert_eq!(route(Node::Booker, &with_call), Node::BookerTools);

        let plain = state_with_last(Message::assistant("found it").with_producer("search"), NextAgent::Search);
        assert_eq!(route(Node::Search, &plain), Node::Task);
        assert_eq!(route(Node::Booker, &plain), Node::Task);
    }

    #[test]
    fn test_tool_nodes_return_to_their_worker() {
        let state = ConversationState::new("trip");
        assert_eq!(route(Node::SearchTools, &state), Node::Search);
        assert_eq!(route(Node::BookerTools, &state), Node::Booker);
        assert_eq!(route(Node::End, &state), Node::End);
    }
}
