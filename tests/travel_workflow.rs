//! 工作流集成测试：MockLlmClient 按请求内容扮演编排者 / Search / Booker

use std::sync::Arc;

use regex::Regex;
use serde_json::json;
use tokio::sync::mpsc;

use wayfarer::config::AppConfig;
use wayfarer::core::{EngineBuilder, NextAgent, Node, RunError, WorkflowEngine};
use wayfarer::llm::{LlmError, LlmReply, LlmRequest, MockLlmClient};
use wayfarer::memory::{Message, Role, ToolCall, ORCHESTRATOR_PRODUCER};
use wayfarer::react::{PromptSet, WorkflowEvent, GUARD_REFUSAL, SINGLE_CALL_NOTE};
use wayfarer::travel::TravelDatabase;

const REQUEST: &str = "Find the cheapest JFK to LAX flight on 2025-12-15 and book it for Jane Doe (jane@example.com).";

fn is_orchestrator(req: &LlmRequest) -> bool {
    req.response_schema.is_some()
}

fn binds(req: &LlmRequest, tool: &str) -> bool {
    req.tools.iter().any(|t| t.name == tool)
}

fn instructions(req: &LlmRequest) -> usize {
    req.messages
        .iter()
        .filter(|m| m.is_from(ORCHESTRATOR_PRODUCER))
        .count()
}

fn last(req: &LlmRequest) -> &Message {
    req.messages.last().unwrap()
}

fn decision(next_agent: &str, instruction: &str, verdict: Option<&str>) -> Result<LlmReply, LlmError> {
    let mut body = json!({
        "next_agent": next_agent,
        "instruction": instruction,
        "reasoning": "next step"
    });
    if let Some(v) = verdict {
        body["verdict"] = json!(v);
    }
    Ok(LlmReply::text(body.to_string()))
}

fn tool_call(index: usize, tool: &str, args: serde_json::Value) -> Result<LlmReply, LlmError> {
    Ok(LlmReply::with_tool_calls(
        "",
        vec![ToolCall::new(format!("call_{index}"), tool, args)],
    ))
}

fn engine(config: AppConfig, mock: Arc<MockLlmClient>, db: Arc<TravelDatabase>) -> WorkflowEngine {
    EngineBuilder::new(config)
        .with_llm(mock)
        .with_prompts(PromptSet::default())
        .build(db)
        .unwrap()
}

/// 完整流程：查最便宜航班 -> 预订 -> 结束
fn travel_agency(req: &LlmRequest, index: usize) -> Result<LlmReply, LlmError> {
    if is_orchestrator(req) {
        return match instructions(req) {
            0 => decision("search", "Find the cheapest flight from JFK to LAX on 2025-12-15", None),
            1 => decision(
                "booker",
                "Book flight_id 1 for Jane Doe, jane@example.com",
                None,
            ),
            _ => {
                let confirmation = req
                    .messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::Tool && m.is_from("create_booking"))
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                decision("end", "", Some(&format!("Booked flight SH101: {confirmation}")))
            }
        };
    }

    let latest = last(req);
    if binds(req, "query_database") {
        if latest.role == Role::Tool {
            return Ok(LlmReply::text(format!("Cheapest flight: {}", latest.content)));
        }
        return tool_call(
            index,
            "query_database",
            json!({"query": "SELECT * FROM flights WHERE origin_airport='JFK' AND destination_airport='LAX' \
                AND departure_date='2025-12-15' ORDER BY base_price LIMIT 1"}),
        );
    }

    if latest.role == Role::Tool {
        return Ok(LlmReply::text(format!("Booking done: {}", latest.content)));
    }
    tool_call(
        index,
        "create_booking",
        json!({
            "booking_type": "flight",
            "item_id": 1,
            "customer_name": "Jane Doe",
            "customer_email": "jane@example.com"
        }),
    )
}

#[tokio::test]
async fn test_end_to_end_cheapest_flight_booking() {
    let db = Arc::new(TravelDatabase::in_memory().unwrap());
    let mock = Arc::new(MockLlmClient::from_fn(travel_agency));
    let engine = engine(AppConfig::default(), Arc::clone(&mock), Arc::clone(&db));

    let run = engine.start(REQUEST).unwrap();
    let counter = run.step_counter();
    assert_eq!(counter.get(), 0);

    let state = engine.drive(run).await.unwrap();

    // task, search, search_tools, search, task, booker, booker_tools, booker, task
    assert_eq!(counter.get(), 9);
    assert_eq!(mock.call_count(), 7);
    assert_eq!(state.next_agent, NextAgent::End);
    assert_eq!(db.booking_count().await.unwrap(), 1);

    let sql_result = state
        .log
        .messages()
        .iter()
        .find(|m| m.is_from("query_database"))
        .unwrap();
    assert!(sql_result.content.contains("299.99"));
    assert!(sql_result.content.contains("SH101"));

    let booking = state
        .log
        .messages()
        .iter()
        .find(|m| m.is_from("create_booking"))
        .unwrap();
    assert_eq!(booking.tool_call_id.as_deref(), Some("call_4"));
    let payload: serde_json::Value = serde_json::from_str(&booking.content).unwrap();
    assert_eq!(payload["success"], true);
    assert_eq!(payload["total_price"], 299.99);

    let conf = Regex::new(r"CONF-\d{6}").unwrap();
    assert!(conf.is_match(payload["confirmation_number"].as_str().unwrap()));
    assert!(conf.is_match(state.verdict.as_deref().unwrap()));
}

#[tokio::test]
async fn test_log_grows_every_step_and_freezes_at_end() {
    let db = Arc::new(TravelDatabase::in_memory().unwrap());
    let mock = Arc::new(MockLlmClient::from_fn(travel_agency));
    let engine = engine(AppConfig::default(), mock, db);

    let mut run = engine.start(REQUEST).unwrap();
    let mut previous = run.state().log.len();
    let mut visited = vec![run.node()];
    while !run.is_finished() {
        let next = engine.step(&mut run).await.unwrap();
        let len = run.state().log.len();
        assert!(len > previous, "log must grow on every node");
        previous = len;
        visited.push(next);
    }

    assert_eq!(
        visited,
        vec![
            Node::Task,
            Node::Search,
            Node::SearchTools,
            Node::Search,
            Node::Task,
            Node::Booker,
            Node::BookerTools,
            Node::Booker,
            Node::Task,
            Node::End,
        ]
    );

    let frozen = run.state().log.len();
    let steps = run.step_counter().get();
    assert_eq!(engine.step(&mut run).await.unwrap(), Node::End);
    assert_eq!(run.state().log.len(), frozen);
    assert_eq!(run.step_counter().get(), steps);
}

#[tokio::test]
async fn test_always_search_aborts_after_exact_budget() {
    let db = Arc::new(TravelDatabase::in_memory().unwrap());
    let mock = Arc::new(MockLlmClient::from_fn(|req, _| {
        if is_orchestrator(req) {
            decision("search", "Look for more options", None)
        } else {
            Ok(LlmReply::text("Nothing new"))
        }
    }));
    let engine = engine(AppConfig::default(), Arc::clone(&mock), db);

    let run = engine.start(REQUEST).unwrap();
    let counter = run.step_counter();
    let err = engine.drive(run).await.unwrap_err();

    assert!(matches!(err, RunError::StepBudgetExceeded { max_steps: 50 }));
    assert_eq!(err.to_string(), "Exceeded maximum steps (50)");
    assert_eq!(counter.get(), 50);
    assert_eq!(mock.call_count(), 50);
}

#[tokio::test]
async fn test_stale_instruction_trips_booker_guard() {
    let db = Arc::new(TravelDatabase::in_memory().unwrap());
    let mock = Arc::new(MockLlmClient::from_fn(|req, index| {
        if is_orchestrator(req) {
            return if instructions(req) == 0 {
                decision("booker", "Book attraction 999 for Jane Doe, jane@example.com", None)
            } else {
                decision("end", "", Some("Could not book"))
            };
        }
        // Booker 一直重试不存在的条目，直到指令滑出窗口
        tool_call(
            index,
            "create_booking",
            json!({
                "booking_type": "attraction",
                "item_id": 999,
                "customer_name": "Jane Doe",
                "customer_email": "jane@example.com"
            }),
        )
    }));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let engine = engine(AppConfig::default(), Arc::clone(&mock), Arc::clone(&db)).with_events(tx);

    let state = engine.run(REQUEST).await.unwrap();

    // 1 次编排 + 4 次 booker 调用 + 1 次编排；第 5 次 booker 回合被拦截，未调用 LLM
    assert_eq!(mock.call_count(), 6);
    let refusal = state
        .log
        .messages()
        .iter()
        .find(|m| m.content == GUARD_REFUSAL)
        .unwrap();
    assert!(refusal.is_from("booker"));
    assert!(!refusal.has_tool_calls());
    assert_eq!(db.booking_count().await.unwrap(), 0);
    assert_eq!(state.verdict.as_deref(), Some("Could not book"));

    drop(engine);
    let mut tripped = 0;
    let mut finished = false;
    while let Some(event) = rx.recv().await {
        match event {
            WorkflowEvent::GuardTripped => tripped += 1,
            WorkflowEvent::Finished { .. } => finished = true,
            _ => {}
        }
    }
    assert_eq!(tripped, 1);
    assert!(finished);
}

#[tokio::test]
async fn test_three_tool_calls_execute_only_first() {
    let db = Arc::new(TravelDatabase::in_memory().unwrap());
    let mock = Arc::new(MockLlmClient::from_fn(|req, _| {
        if is_orchestrator(req) {
            return if instructions(req) == 0 {
                decision("search", "Check LA weather, flights and hotels", None)
            } else {
                decision("end", "", Some("Done"))
            };
        }
        if last(req).role == Role::Tool {
            return Ok(LlmReply::text("Sunny in LA"));
        }
        Ok(LlmReply::with_tool_calls(
            "Let me look these up",
            vec![
                ToolCall::new("a", "web_search", json!({"query": "weather Los Angeles"})),
                ToolCall::new("b", "query_database", json!({"query": "SELECT * FROM flights LIMIT 3"})),
                ToolCall::new("c", "query_database", json!({"query": "SELECT * FROM hotels LIMIT 3"})),
            ],
        ))
    }));
    let engine = engine(AppConfig::default(), Arc::clone(&mock), db);

    let state = engine.run(REQUEST).await.unwrap();

    let messages = state.log.messages();
    let request_msg = messages.iter().find(|m| m.has_tool_calls()).unwrap();
    assert_eq!(request_msg.tool_calls.len(), 1);
    assert_eq!(request_msg.tool_calls[0].id, "a");
    assert!(request_msg.content.ends_with(SINGLE_CALL_NOTE));

    let tool_results: Vec<_> = messages.iter().filter(|m| m.role == Role::Tool).collect();
    assert_eq!(tool_results.len(), 1);
    assert!(tool_results[0].is_from("web_search"));
    assert_eq!(tool_results[0].tool_call_id.as_deref(), Some("a"));

    // 收到 web_search 结果后 Search 切换到对应提示词
    let requests = mock.requests();
    let follow_up = requests
        .iter()
        .filter(|r| !is_orchestrator(r))
        .nth(1)
        .unwrap();
    assert_eq!(follow_up.messages[0].content, PromptSet::default().search_after_web);
}

#[tokio::test]
async fn test_hallucinated_tool_is_observed_not_raised() {
    let db = Arc::new(TravelDatabase::in_memory().unwrap());
    let mock = Arc::new(MockLlmClient::from_fn(|req, index| {
        if is_orchestrator(req) {
            return if instructions(req) == 0 {
                decision("search", "Find hotels in Los Angeles", None)
            } else {
                decision("end", "", Some("No hotels found"))
            };
        }
        if last(req).role == Role::Tool {
            return Ok(LlmReply::text("That tool does not exist"));
        }
        tool_call(index, "create_booking", json!({"booking_type": "hotel", "item_id": 1}))
    }));
    let engine = engine(AppConfig::default(), mock, Arc::clone(&db));

    let state = engine.run(REQUEST).await.unwrap();

    let observed = state
        .log
        .messages()
        .iter()
        .find(|m| m.role == Role::Tool)
        .unwrap();
    assert_eq!(observed.content, "Error: Unknown tool: create_booking");
    assert_eq!(db.booking_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unparseable_delegation_fails_distinguishably() {
    let db = Arc::new(TravelDatabase::in_memory().unwrap());
    let mock = Arc::new(MockLlmClient::from_fn(|_, _| {
        Ok(LlmReply::text(r#"{"next_agent": "hotel", "instruction": "book it"}"#))
    }));
    let mut config = AppConfig::default();
    config.workflow.orchestrator_retries = 0;
    let engine = engine(config, Arc::clone(&mock), db);

    let err = engine.run(REQUEST).await.unwrap_err();
    match err {
        RunError::DelegationParse { attempts, detail } => {
            assert_eq!(attempts, 1);
            assert!(detail.contains("hotel"));
        }
        other => panic!("expected DelegationParse, got {other:?}"),
    }
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_empty_request_is_rejected() {
    let db = Arc::new(TravelDatabase::in_memory().unwrap());
    let mock = Arc::new(MockLlmClient::scripted(vec![]));
    let engine = engine(AppConfig::default(), Arc::clone(&mock), db);

    assert!(matches!(engine.run("   ").await, Err(RunError::EmptyRequest)));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_batch_runs_are_independent() {
    let db = Arc::new(TravelDatabase::in_memory().unwrap());
    let mock = Arc::new(MockLlmClient::from_fn(|req, _| {
        let request = req.messages[1].content.clone();
        decision("end", "", Some(&format!("handled: {request}")))
    }));
    let engine = engine(AppConfig::default(), mock, db);

    let results = engine
        .run_batch(vec!["Trip to Miami", "Trip to Los Angeles"])
        .await;

    assert_eq!(results.len(), 2);
    let verdicts: Vec<String> = results
        .into_iter()
        .map(|r| r.unwrap().verdict.unwrap())
        .collect();
    assert_eq!(verdicts, vec!["handled: Trip to Miami", "handled: Trip to Los Angeles"]);
}
