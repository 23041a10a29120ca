//! Mock driver and connector shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use dbutil::db::{Connector, Driver, PoolLimits};
use dbutil::models::{DbType, QueryParam, Row};
use dbutil::{DbError, DbResult};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One statement seen by the mock driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

/// Driver that records statements and answers with queued row sets.
#[derive(Debug)]
pub struct MockDriver {
    db_type: DbType,
    pub statements: Mutex<Vec<Recorded>>,
    responses: Mutex<VecDeque<DbResult<Vec<Row>>>>,
    pub closed: AtomicBool,
    pub delay: Option<Duration>,
}

impl MockDriver {
    pub fn new(db_type: DbType) -> Self {
        Self {
            db_type,
            statements: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
            closed: AtomicBool::new(false),
            delay: None,
        }
    }

    /// Queue the rows returned by the next `query`.
    pub fn respond(&self, rows: Vec<Value>) {
        let rows = rows
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect();
        self.responses.lock().unwrap().push_back(Ok(rows));
    }

    /// Queue an error returned by the next `query`.
    pub fn fail(&self, err: DbError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn statements(&self) -> Vec<Recorded> {
        self.statements.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn record(&self, sql: &str, params: &[QueryParam]) -> DbResult<()> {
        if self.is_closed() {
            return Err(DbError::connection("Connection pool is closed", "Open the database again"));
        }
        self.statements.lock().unwrap().push(Recorded {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        Ok(())
    }
}

#[async_trait]
impl Driver for MockDriver {
    fn db_type(&self) -> DbType {
        self.db_type
    }

    async fn query(&self, sql: &str, params: &[QueryParam]) -> DbResult<Vec<Row>> {
        self.record(sql, params)?;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn execute(&self, sql: &str, params: &[QueryParam]) -> DbResult<u64> {
        self.record(sql, params)?;
        Ok(0)
    }

    async fn ping(&self) -> DbResult<()> {
        self.record("SELECT 1", &[])
    }

    async fn close(&self) -> DbResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Connector handing out one prepared driver per open and counting opens.
#[derive(Default)]
pub struct MockConnector {
    pub opens: AtomicUsize,
    pub open_delay: Option<Duration>,
    pub fail_with: Mutex<Option<DbError>>,
    pub drivers: Mutex<Vec<Arc<MockDriver>>>,
    pub query_delay: Option<Duration>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_open_delay(delay: Duration) -> Self {
        Self {
            open_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Driver created by the most recent open.
    pub fn last_driver(&self) -> Arc<MockDriver> {
        self.drivers.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn open(
        &self,
        db_type: DbType,
        _dsn: &str,
        _limits: &PoolLimits,
    ) -> DbResult<Arc<dyn Driver>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.open_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.fail_with.lock().unwrap().take() {
            return Err(err);
        }
        let mut driver = MockDriver::new(db_type);
        driver.delay = self.query_delay;
        let driver = Arc::new(driver);
        self.drivers.lock().unwrap().push(driver.clone());
        Ok(driver)
    }
}

pub fn table_row(schema: &str, table: &str, comment: Option<&str>) -> Value {
    json!({"table_schema": schema, "table_name": table, "comments": comment})
}

pub fn column_row(schema: &str, table: &str, column: &str, data_type: &str) -> Value {
    json!({
        "table_schema": schema,
        "table_name": table,
        "column_name": column,
        "data_type": data_type,
        "comments": null,
    })
}
