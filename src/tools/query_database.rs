//! query_database 工具：对旅行库执行 SELECT

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::schema::{parse_args, schema_value};
use crate::tools::Tool;
use crate::travel::{SqlQueryInput, TravelDatabase};

pub const QUERY_DATABASE: &str = "query_database";

const DESCRIPTION: &str = "Query the travel database for flights, hotels, attractions, and bookings.

Available tables and columns:
- flights: flight_id, airline, flight_number, origin_airport, destination_airport,
  departure_date, departure_time, arrival_time, duration_minutes, base_price,
  cabin_class, available_seats, aircraft_type
- hotels: hotel_id, name, city, address, rating, price_per_night,
  distance_to_center_km, available_rooms, has_wifi, has_pool, has_gym,
  has_parking, has_spa, has_restaurant, has_bar, has_breakfast_included
- attractions: attraction_id, name, city, category, rating, description,
  average_visit_hours, entry_fee, website
- bookings: booking_id, booking_type, item_id, customer_name, customer_email,
  booking_date, status, confirmation_number, total_price, special_requests

Write a SELECT query to retrieve the information needed.";

pub struct QueryDatabaseTool {
    db: Arc<TravelDatabase>,
}

impl QueryDatabaseTool {
    pub fn new(db: Arc<TravelDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for QueryDatabaseTool {
    fn name(&self) -> &str {
        QUERY_DATABASE
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> Value {
        schema_value::<SqlQueryInput>()
    }

    /// 非 SELECT 与 SQL 错误都以 success=false 的结构化结果返回，不视为工具失败
    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: SqlQueryInput = parse_args(QUERY_DATABASE, args)?;
        let result = self.db.execute_query(&input.query).await;
        serde_json::to_string(&result).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::travel::SqlQueryResult;

    #[tokio::test]
    async fn test_non_select_is_structured_failure() {
        let tool = QueryDatabaseTool::new(Arc::new(TravelDatabase::in_memory().unwrap()));
        let out = tool
            .execute(serde_json::json!({"query": "DELETE FROM hotels"}))
            .await
            .unwrap();
        let result: SqlQueryResult = serde_json::from_str(&out).unwrap();
        assert_eq!(result, SqlQueryResult::failed("Only SELECT queries are allowed"));
    }
}
