//! 旅行领域的外部协作者：SQLite 旅行库与模拟网页检索

pub mod database;
pub mod models;
pub mod seed;
pub mod web;

pub use database::{DatabaseError, TravelDatabase, ITEM_NOT_FOUND_ERROR, ONLY_SELECT_ERROR};
pub use models::{
    BookingConfirmation, BookingFailure, BookingInput, BookingOutcome, BookingType, SqlQueryInput,
    SqlQueryResult, WebSearchInput, WebSearchResult,
};
pub use web::mock_web_search;
