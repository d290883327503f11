//! Wayfarer 命令行入口
//!
//! 用法：`wayfarer [--config <file>] <旅行需求>`。
//! 初始化日志、加载配置、打开旅行库、构建引擎并运行一次请求，最后打印结论与完整对话。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use wayfarer::config::load_config;
use wayfarer::core::EngineBuilder;
use wayfarer::travel::TravelDatabase;

const DEFAULT_REQUEST: &str = "I need to find the cheapest vacation package to LA for a family of 4 living in New York, \
we are flexible with the dates and the destination. Book the cheapest vacation package for us, \
including flights there and back and hotel stay. After that add 2 attractions to the vacation package.";

fn parse_args() -> anyhow::Result<(Option<PathBuf>, String)> {
    let mut config_path = None;
    let mut words = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            let path = args.next().context("--config requires a file path")?;
            config_path = Some(PathBuf::from(path));
        } else {
            words.push(arg);
        }
    }
    let request = if words.is_empty() {
        DEFAULT_REQUEST.to_string()
    } else {
        words.join(" ")
    };
    Ok((config_path, request))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wayfarer::observability::init();

    let (config_path, request) = parse_args()?;
    let cfg = load_config(config_path).context("Failed to load config")?;
    if cfg.llm.resolve_api_key().is_none() {
        bail!("No API key: set OPENAI_API_KEY or WAYFARER__LLM__API_KEY");
    }

    let db = Arc::new(
        TravelDatabase::open(&cfg.database.path)
            .with_context(|| format!("Failed to open travel database at {}", cfg.database.path))?,
    );
    let engine = EngineBuilder::new(cfg)
        .build(db)
        .context("Failed to build workflow engine")?;

    let state = engine.run(request).await.context("Run failed")?;

    for message in state.log.messages() {
        let who = message.producer.as_deref().unwrap_or(message.role.as_str());
        println!("[{who}] {}", message.content);
        for call in &message.tool_calls {
            println!("    -> {}({})", call.tool_name, call.arguments);
        }
    }
    println!();
    match state.verdict {
        Some(verdict) => println!("Verdict: {verdict}"),
        None => println!("Verdict: (none)"),
    }
    Ok(())
}
