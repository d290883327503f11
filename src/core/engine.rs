//! 工作流引擎：驱动状态机直到 END 或步数预算耗尽
//!
//! 每次运行独占一个 `WorkflowRun`（状态、当前节点、步数计数器）；引擎本身只读共享，
//! 可同时驱动多个运行。步数统计每一次节点执行（编排者、Worker、工具节点），
//! 执行满 `max_steps` 个节点仍未到达 END 时以 StepBudgetExceeded 中止。

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

use crate::core::router::route;
use crate::core::{ConversationState, Node, RunError, StepCounter};
use crate::react::worker::preview;
use crate::react::{Orchestrator, Worker, WorkerOutcome, WorkflowEvent};

/// 单次运行：状态 + 当前节点 + 步数
#[derive(Debug)]
pub struct WorkflowRun {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    state: ConversationState,
    node: Node,
    steps: StepCounter,
}

impl WorkflowRun {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// 下一个要执行的节点
    pub fn node(&self) -> Node {
        self.node
    }

    /// 可克隆的计数器句柄，运行开始前后都可读取
    pub fn step_counter(&self) -> StepCounter {
        self.steps.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.node.is_terminal()
    }

    pub fn into_state(self) -> ConversationState {
        self.state
    }
}

pub struct WorkflowEngine {
    orchestrator: Orchestrator,
    search: Worker,
    booker: Worker,
    max_steps: usize,
    events: Option<mpsc::UnboundedSender<WorkflowEvent>>,
}

impl WorkflowEngine {
    pub fn new(orchestrator: Orchestrator, search: Worker, booker: Worker, max_steps: usize) -> Self {
        Self {
            orchestrator,
            search,
            booker,
            max_steps,
            events: None,
        }
    }

    /// 订阅过程事件（接收端关闭后事件被丢弃）
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<WorkflowEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    fn emit(&self, event: WorkflowEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    /// 以一条用户消息创建运行，停在 task 节点
    pub fn start(&self, request: impl Into<String>) -> Result<WorkflowRun, RunError> {
        let request = request.into();
        if request.trim().is_empty() {
            return Err(RunError::EmptyRequest);
        }
        Ok(WorkflowRun {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            state: ConversationState::new(request),
            node: Node::Task,
            steps: StepCounter::new(),
        })
    }

    /// 执行当前节点并前进一步，返回下一个节点；已到 END 时不做任何事
    pub async fn step(&self, run: &mut WorkflowRun) -> Result<Node, RunError> {
        if run.node.is_terminal() {
            return Ok(run.node);
        }
        if run.steps.get() >= self.max_steps {
            return Err(RunError::StepBudgetExceeded {
                max_steps: self.max_steps,
            });
        }

        let node = run.node;
        let step = run.steps.increment();
        tracing::info!(step, node = %node, "entering node");
        self.emit(WorkflowEvent::NodeEntered { step, node });

        match node {
            Node::Task => {
                let decision = self.orchestrator.run(&mut run.state).await?;
                self.emit(WorkflowEvent::Delegated {
                    next_agent: decision.next_agent,
                    instruction: decision.instruction,
                });
            }
            Node::Search => {
                self.search.act(&mut run.state).await?;
            }
            Node::Booker => {
                if self.booker.act(&mut run.state).await? == WorkerOutcome::GuardTripped {
                    self.emit(WorkflowEvent::GuardTripped);
                }
            }
            Node::SearchTools => self.execute_tools(&self.search, &mut run.state).await,
            Node::BookerTools => self.execute_tools(&self.booker, &mut run.state).await,
            Node::End => {}
        }

        run.node = route(node, &run.state);
        Ok(run.node)
    }

    /// 工具节点：为最新消息的每个 tool call 追加一条 tool 消息
    async fn execute_tools(&self, worker: &Worker, state: &mut ConversationState) {
        let calls = state
            .log
            .last()
            .map(|m| m.tool_calls.clone())
            .unwrap_or_default();
        for call in calls {
            self.emit(WorkflowEvent::ToolCall {
                tool: call.tool_name.clone(),
                args: call.arguments.clone(),
            });
            let message = worker.executor().invoke(&call).await;
            tracing::debug!(
                worker = %worker.kind(),
                tool = %call.tool_name,
                preview = %preview(&message.content),
                "tool result"
            );
            self.emit(WorkflowEvent::Observation {
                tool: call.tool_name.clone(),
                preview: preview(&message.content),
            });
            state.log.append(message);
        }
    }

    /// 驱动运行直到 END；失败时运行被丢弃
    pub async fn drive(&self, mut run: WorkflowRun) -> Result<ConversationState, RunError> {
        let span = tracing::info_span!("run", run_id = %run.run_id);
        async move {
            tracing::info!(started_at = %run.started_at.to_rfc3339(), "run started");
            while !run.is_finished() {
                if let Err(err) = self.step(&mut run).await {
                    tracing::warn!(error = %err, steps = run.steps.get(), "run aborted");
                    self.emit(WorkflowEvent::Aborted {
                        reason: err.to_string(),
                    });
                    return Err(err);
                }
            }
            let steps = run.steps.get();
            let elapsed_ms = (Utc::now() - run.started_at).num_milliseconds();
            tracing::info!(steps, elapsed_ms, "run finished");
            self.emit(WorkflowEvent::Finished { steps });
            Ok(run.into_state())
        }
        .instrument(span)
        .await
    }

    /// start + drive
    pub async fn run(&self, request: impl Into<String>) -> Result<ConversationState, RunError> {
        let run = self.start(request)?;
        self.drive(run).await
    }

    /// 并发执行多条独立请求，结果顺序与输入一致
    pub async fn run_batch<I, S>(&self, requests: I) -> Vec<Result<ConversationState, RunError>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        futures_util::future::join_all(requests.into_iter().map(|r| self.run(r))).await
    }
}
