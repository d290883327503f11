//! 旅行数据库：显式持有的句柄，单连接 + Mutex 串行化写入
//!
//! 所有 SQLite 访问都在 tokio 的阻塞线程池上执行；查询仅允许 SELECT，预订按条目类型查价后写入 bookings。
//! 连接锁在进入阻塞线程池之前异步获取：预订的等待时限只作用于取锁，一旦拿到锁写入必定执行完毕，
//! 调用方看到的结果与库中状态一致。

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::travel::models::{BookingConfirmation, BookingInput, BookingOutcome, BookingType, SqlQueryResult};
use crate::travel::seed::seed_if_empty;

pub const ONLY_SELECT_ERROR: &str = "Only SELECT queries are allowed";
pub const ITEM_NOT_FOUND_ERROR: &str = "Item not found";

/// 数据库层错误
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database busy: connection not available within {0:?}")]
    Busy(Duration),

    #[error("Blocking task failed: {0}")]
    Join(String),
}

type Row = serde_json::Map<String, serde_json::Value>;

/// 旅行数据库句柄；克隆共享同一连接
#[derive(Clone)]
pub struct TravelDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl TravelDatabase {
    /// 打开数据库（`:memory:` 或文件路径），必要时建表并灌入初始库存
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let mut conn = if path.as_os_str() == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        seed_if_empty(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, DatabaseError> {
        Self::open(":memory:")
    }

    /// 等待连接锁后在阻塞线程池上执行 f
    async fn with_conn<F, R>(&self, f: F) -> Result<R, DatabaseError>
    where
        F: FnOnce(&mut Connection) -> Result<R, DatabaseError> + Send + 'static,
        R: Send + 'static,
    {
        let guard = Arc::clone(&self.conn).lock_owned().await;
        run_locked(guard, f).await
    }

    /// 同 with_conn，但取锁最多等待 wait；超时返回 Busy 且 f 不会执行
    async fn with_conn_within<F, R>(&self, wait: Duration, f: F) -> Result<R, DatabaseError>
    where
        F: FnOnce(&mut Connection) -> Result<R, DatabaseError> + Send + 'static,
        R: Send + 'static,
    {
        let guard = tokio::time::timeout(wait, Arc::clone(&self.conn).lock_owned())
            .await
            .map_err(|_| DatabaseError::Busy(wait))?;
        run_locked(guard, f).await
    }

    #[cfg(test)]
    pub(crate) async fn hold_connection(&self) -> OwnedMutexGuard<Connection> {
        Arc::clone(&self.conn).lock_owned().await
    }

    /// 执行只读查询；非 SELECT 在执行前拒绝，SQL 错误转为 success=false
    pub async fn execute_query(&self, query: &str) -> SqlQueryResult {
        if !is_select(query) {
            tracing::warn!(query = %query, "rejected non-SELECT query");
            return SqlQueryResult::failed(ONLY_SELECT_ERROR);
        }
        let query = query.to_string();
        match self.with_conn(move |conn| run_select(conn, &query).map_err(DatabaseError::from)).await {
            Ok(rows) => SqlQueryResult::ok(rows),
            Err(DatabaseError::Sqlite(e)) => SqlQueryResult::failed(e.to_string()),
            Err(e) => SqlQueryResult::failed(e.to_string()),
        }
    }

    /// 创建预订：查价 -> 生成确认号 -> 写入 bookings（同一事务）
    pub async fn create_booking(&self, input: BookingInput) -> BookingOutcome {
        let result = self
            .with_conn(move |conn| insert_booking(conn, &input).map_err(DatabaseError::from))
            .await;
        booking_outcome(result)
    }

    /// 同 create_booking，但取锁最多等待 lock_wait；超时则不写入并返回失败
    pub async fn create_booking_within(&self, input: BookingInput, lock_wait: Duration) -> BookingOutcome {
        let result = self
            .with_conn_within(lock_wait, move |conn| insert_booking(conn, &input).map_err(DatabaseError::from))
            .await;
        booking_outcome(result)
    }

    /// bookings 表行数
    pub async fn booking_count(&self) -> Result<i64, DatabaseError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM bookings", [], |r| r.get(0))
                .map_err(DatabaseError::from)
        })
        .await
    }
}

async fn run_locked<F, R>(guard: OwnedMutexGuard<Connection>, f: F) -> Result<R, DatabaseError>
where
    F: FnOnce(&mut Connection) -> Result<R, DatabaseError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = guard;
        f(&mut guard)
    })
    .await
    .map_err(|e| DatabaseError::Join(e.to_string()))?
}

fn booking_outcome(result: Result<BookingOutcome, DatabaseError>) -> BookingOutcome {
    match result {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(error = %e, "booking failed");
            BookingOutcome::failed(e.to_string())
        }
    }
}

fn is_select(query: &str) -> bool {
    query.trim().to_uppercase().starts_with("SELECT")
}

fn value_to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(n) => serde_json::Value::from(n),
        ValueRef::Real(f) => serde_json::Value::from(f),
        ValueRef::Text(t) => serde_json::Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => serde_json::Value::String(format!("<blob {} bytes>", b.len())),
    }
}

fn run_select(conn: &Connection, query: &str) -> rusqlite::Result<Vec<Row>> {
    let mut stmt = conn.prepare(query)?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut obj = Row::new();
        for (i, name) in names.iter().enumerate() {
            obj.insert(name.clone(), value_to_json(row.get_ref(i)?));
        }
        out.push(obj);
    }
    Ok(out)
}

fn price_query(booking_type: BookingType) -> &'static str {
    match booking_type {
        BookingType::Flight => "SELECT base_price FROM flights WHERE flight_id = ?1",
        // 酒店按一晚计价
        BookingType::Hotel => "SELECT price_per_night FROM hotels WHERE hotel_id = ?1",
        BookingType::Attraction => "SELECT COALESCE(entry_fee, 0.0) FROM attractions WHERE attraction_id = ?1",
    }
}

fn new_confirmation_number() -> String {
    format!("CONF-{}", rand::thread_rng().gen_range(100000..=999999))
}

fn insert_booking(conn: &mut Connection, input: &BookingInput) -> rusqlite::Result<BookingOutcome> {
    let tx = conn.transaction()?;

    let price: Option<f64> = tx
        .query_row(price_query(input.booking_type), params![input.item_id], |r| r.get(0))
        .optional()?;
    let Some(total_price) = price else {
        return Ok(BookingOutcome::failed(ITEM_NOT_FOUND_ERROR));
    };

    let mut confirmation = new_confirmation_number();
    while tx
        .query_row(
            "SELECT 1 FROM bookings WHERE confirmation_number = ?1",
            params![confirmation],
            |_| Ok(()),
        )
        .optional()?
        .is_some()
    {
        confirmation = new_confirmation_number();
    }

    tx.execute(
        "INSERT INTO bookings (booking_type, item_id, customer_name, customer_email,
                               confirmation_number, total_price, special_requests)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            input.booking_type.as_str(),
            input.item_id,
            input.customer_name,
            input.customer_email,
            confirmation,
            total_price,
            input.special_requests,
        ],
    )?;
    let booking_id = tx.last_insert_rowid();
    tx.commit()?;

    tracing::info!(
        booking_id,
        booking_type = input.booking_type.as_str(),
        item_id = input.item_id,
        confirmation = %confirmation,
        "booking created"
    );
    Ok(BookingOutcome::Confirmed(BookingConfirmation {
        success: true,
        booking_id,
        confirmation_number: confirmation,
        total_price,
        status: "confirmed".to_string(),
    }))
}
