//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 两种模式：按顺序返回预置回复（scripted），或由闭包根据请求动态生成回复（from_fn）。
//! 每次调用的请求都会被记录，便于断言 prompt、绑定的工具与结构化输出 schema。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError, LlmReply, LlmRequest};

type Responder = Box<dyn Fn(&LlmRequest, usize) -> Result<LlmReply, LlmError> + Send + Sync>;

enum Behavior {
    Script(Mutex<VecDeque<Result<LlmReply, LlmError>>>),
    Responder(Responder),
}

/// Mock 客户端：脚本或闭包驱动
pub struct MockLlmClient {
    behavior: Behavior,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    /// 按顺序返回预置结果；脚本耗尽后返回 ScriptExhausted
    pub fn scripted(replies: Vec<Result<LlmReply, LlmError>>) -> Self {
        Self {
            behavior: Behavior::Script(Mutex::new(replies.into())),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 闭包根据请求与调用序号（从 0 开始）生成回复
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&LlmRequest, usize) -> Result<LlmReply, LlmError> + Send + Sync + 'static,
    {
        Self {
            behavior: Behavior::Responder(Box::new(f)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// 已记录的全部请求（克隆）
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmReply, LlmError> {
        let index = {
            let mut recorded = self
                .requests
                .lock()
                .map_err(|_| LlmError::InvalidResponse("mock lock poisoned".into()))?;
            recorded.push(request.clone());
            recorded.len() - 1
        };

        match &self.behavior {
            Behavior::Script(queue) => queue
                .lock()
                .map_err(|_| LlmError::InvalidResponse("mock lock poisoned".into()))?
                .pop_front()
                .unwrap_or(Err(LlmError::ScriptExhausted)),
            Behavior::Responder(f) => f(request, index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Message;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let mock = MockLlmClient::scripted(vec![Ok(LlmReply::text("a")), Ok(LlmReply::text("b"))]);
        let req = LlmRequest::new(vec![Message::user("hi")]);
        assert_eq!(mock.complete(&req).await.unwrap().content, "a");
        assert_eq!(mock.complete(&req).await.unwrap().content, "b");
        assert_eq!(mock.complete(&req).await.unwrap_err(), LlmError::ScriptExhausted);
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_responder_sees_request() {
        let mock = MockLlmClient::from_fn(|req, n| {
            Ok(LlmReply::text(format!("{}:{}", n, req.messages.len())))
        });
        let req = LlmRequest::new(vec![Message::system("s"), Message::user("u")]);
        assert_eq!(mock.complete(&req).await.unwrap().content, "0:2");
        assert_eq!(mock.requests()[0].messages[1].content, "u");
    }
}
