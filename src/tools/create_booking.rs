//! create_booking 工具：在旅行库中创建预订（唯一的写操作）

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::schema::{parse_args, schema_value};
use crate::tools::Tool;
use crate::travel::{BookingInput, TravelDatabase};

pub const CREATE_BOOKING: &str = "create_booking";

const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(30);

/// 写入一旦开始就不会被中断；连接被占用时最多等待 lock_wait
pub struct CreateBookingTool {
    db: Arc<TravelDatabase>,
    lock_wait: Duration,
}

impl CreateBookingTool {
    pub fn new(db: Arc<TravelDatabase>) -> Self {
        Self {
            db,
            lock_wait: DEFAULT_LOCK_WAIT,
        }
    }

    pub fn with_lock_wait(mut self, lock_wait: Duration) -> Self {
        self.lock_wait = lock_wait;
        self
    }
}

#[async_trait]
impl Tool for CreateBookingTool {
    fn name(&self) -> &str {
        CREATE_BOOKING
    }

    fn description(&self) -> &str {
        "Create a new booking in the database. booking_type is flight, hotel or attraction; \
         item_id is the id of the item as stored in the database."
    }

    fn parameters_schema(&self) -> Value {
        schema_value::<BookingInput>()
    }

    fn interruptible(&self) -> bool {
        false
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: BookingInput = parse_args(CREATE_BOOKING, args)?;
        let outcome = self.db.create_booking_within(input, self.lock_wait).await;
        serde_json::to_string(&outcome).map_err(|e| e.to_string())
    }
}
