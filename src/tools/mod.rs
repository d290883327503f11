pub mod create_booking;
pub mod executor;
pub mod query_database;
pub mod registry;
pub mod schema;
pub mod web_search;

use std::sync::Arc;
use std::time::Duration;

use crate::travel::TravelDatabase;

pub use create_booking::{CreateBookingTool, CREATE_BOOKING};
pub use executor::ToolExecutor;
pub use query_database::{QueryDatabaseTool, QUERY_DATABASE};
pub use registry::{Tool, ToolRegistry};
pub use schema::{parse_args, schema_value};
pub use web_search::{WebSearchTool, WEB_SEARCH};

/// Search Worker 的工具集：web_search + query_database
pub fn search_registry(db: Arc<TravelDatabase>, default_max_results: u32) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(WebSearchTool::new(default_max_results));
    registry.register(QueryDatabaseTool::new(db));
    registry
}

/// Booker Worker 的工具集：仅 create_booking；lock_wait 为预订等待数据库连接的上限
pub fn booker_registry(db: Arc<TravelDatabase>, lock_wait: Duration) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(CreateBookingTool::new(db).with_lock_wait(lock_wait));
    registry
}
