//! 系统提示词
//!
//! 默认文本编译进二进制；`load_from_dir` 允许用 `config/prompts/*.md` 逐个覆盖。

use std::path::Path;

const TASK_INITIAL: &str = "You are an experienced travel agency team leader. Your task is to find a vacation package for your customer.

The client will provide you with a request, and you must break it down into small simple subtasks.
Then you will delegate these subtasks to your team members ONE AT A TIME.

Your team members are:
- search: Can search online and in the database for flights, hotels, and attractions
- booker: Can create new bookings in the database
- end: Use this when all tasks are complete and you're ready to provide a final answer

IMPORTANT:
- Delegate only ONE subtask at a time
- Wait for the agent to complete before delegating the next subtask
- Provide clear, specific instructions for each subtask

Example delegation pattern:
1. First: Delegate to 'search' to find cheapest flights
2. Wait for response
3. Then: Delegate to 'search' to find hotels
4. Wait for response
5. Then: Delegate to 'booker' to book the package
6. Finally: Delegate to 'end' with final trip summary or an error message

Reply with a JSON object: {\"next_agent\": \"search\" | \"booker\" | \"end\", \"instruction\": \"...\", \"reasoning\": \"...\", \"verdict\": \"...\"}.";

const TASK_CONTINUATION: &str = "You are an experienced travel agency team leader. Your task is to find a vacation package for your customer.

Review the conversation history and the most recent response from your team member.
Decide on the NEXT subtask to delegate, or if all tasks are complete.

Your team members are:
- search: Can search online and in the database for flights, hotels, and attractions
- booker: Can create new bookings in the database
- end: Use this when all tasks are complete and you're ready to provide a final answer

IMPORTANT:
- Delegate only ONE subtask at a time
- Consider what information you now have and what you still need
- Provide clear, specific instructions for the next subtask
- When choosing 'end', put the final verdict (what was booked, or why it failed) in \"verdict\"

Reply with a JSON object: {\"next_agent\": \"search\" | \"booker\" | \"end\", \"instruction\": \"...\", \"reasoning\": \"...\", \"verdict\": \"...\"}.";

const SEARCH: &str = "You are a travel agent. Your task is to find a vacation package for your customer.

You have access to the following tools:
- web_search: Search online for information.
- query_database: Query the travel database for flights, hotels, attractions, and bookings.
Each time you access a table for the first time, always run \"SELECT * FROM [table_name] LIMIT 3\" WITHOUT ANY conditions in order to understand the table schema.
Always prefer to use \"query_database\" over \"web_search\" when possible.";

const SEARCH_AFTER_WEB: &str = "You are a travel agent. Your task is to find a vacation package for your customer.

Having just used the web_search tool, you now have a list of relevant web pages.
Go over them and provide an answer to the original task you were given.

Respond with clean English text.";

const SEARCH_AFTER_DB: &str = "You are a travel agent. Your task is to find a vacation package for your customer.

Having just used the query_database tool, you now have a list of relevant database entries.
Go over them and provide an answer to the original task you were given.

Respond with clean English text.";

const BOOKER: &str = "You are a travel agent. Your task is to book the requested vacation package for your customer.

You have access to the following tools:
- create_booking: Create a new booking in the database.";

/// 全部节点的系统提示词
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSet {
    pub task_initial: String,
    pub task_continuation: String,
    pub search: String,
    pub search_after_web: String,
    pub search_after_db: String,
    pub booker: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            task_initial: TASK_INITIAL.to_string(),
            task_continuation: TASK_CONTINUATION.to_string(),
            search: SEARCH.to_string(),
            search_after_web: SEARCH_AFTER_WEB.to_string(),
            search_after_db: SEARCH_AFTER_DB.to_string(),
            booker: BOOKER.to_string(),
        }
    }
}

impl PromptSet {
    /// 以默认值为底，目录中存在的 `<name>.md` 覆盖对应提示词（空文件忽略）
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let mut prompts = Self::default();
        let slots: [(&str, &mut String); 6] = [
            ("task_initial", &mut prompts.task_initial),
            ("task_continuation", &mut prompts.task_continuation),
            ("search", &mut prompts.search),
            ("search_after_web", &mut prompts.search_after_web),
            ("search_after_db", &mut prompts.search_after_db),
            ("booker", &mut prompts.booker),
        ];
        for (name, slot) in slots {
            let path = dir.join(format!("{name}.md"));
            if let Ok(text) = std::fs::read_to_string(&path) {
                let text = text.trim();
                if !text.is_empty() {
                    tracing::debug!(prompt = name, path = %path.display(), "prompt override loaded");
                    *slot = text.to_string();
                }
            }
        }
        prompts
    }

    /// 在 `config/prompts` 与 `../config/prompts` 中查找覆盖目录，找不到则用默认值
    pub fn discover() -> Self {
        ["config/prompts", "../config/prompts"]
            .into_iter()
            .map(Path::new)
            .find(|p| p.is_dir())
            .map(Self::load_from_dir)
            .unwrap_or_default()
    }
}
