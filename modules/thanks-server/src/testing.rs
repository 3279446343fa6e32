//! In-memory stand-ins for the Graph API and the thanks table.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use graph_client::GraphError;
use thanks_store::{NewThanks, ThankRecord, ThanksRepository, WEEKLY_WINDOW_DAYS};

use crate::pipeline::GraphApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphCall {
    Acknowledge(String),
    Managers(Vec<String>),
    Reply { item_id: String, message: String },
}

/// Records every call; answers manager lookups from a fixed table.
#[derive(Default)]
pub struct RecordingGraph {
    calls: Mutex<Vec<GraphCall>>,
    managers: HashMap<String, String>,
    fail: bool,
}

impl RecordingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a network error (after being recorded).
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_manager(mut self, user: &str, manager: &str) -> Self {
        self.managers.insert(user.to_string(), manager.to_string());
        self
    }

    pub fn calls(&self) -> Vec<GraphCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: GraphCall) -> graph_client::Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(GraphError::Network("graph unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl GraphApi for RecordingGraph {
    async fn acknowledge(&self, item_id: &str) -> graph_client::Result<()> {
        self.record(GraphCall::Acknowledge(item_id.to_string()))
    }

    async fn managers(&self, user_ids: &[String]) -> graph_client::Result<HashMap<String, String>> {
        self.record(GraphCall::Managers(user_ids.to_vec()))?;
        Ok(user_ids
            .iter()
            .filter_map(|id| self.managers.get(id).map(|m| (id.clone(), m.clone())))
            .collect())
    }

    async fn reply(&self, item_id: &str, message: &str) -> graph_client::Result<()> {
        self.record(GraphCall::Reply {
            item_id: item_id.to_string(),
            message: message.to_string(),
        })
    }
}

/// Vec-backed thanks table with the same window semantics as Postgres.
#[derive(Default)]
pub struct MemoryThanks {
    rows: Mutex<Vec<ThankRecord>>,
    fail: bool,
}

impl MemoryThanks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_rows(rows: Vec<ThankRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
            fail: false,
        }
    }

    pub fn rows(&self) -> Vec<ThankRecord> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ThanksRepository for MemoryThanks {
    async fn record_and_read_window(
        &self,
        thanks: NewThanks,
    ) -> Result<Vec<ThankRecord>, sqlx::Error> {
        if self.fail {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let now = Utc::now();
        let cutoff = now - Duration::days(WEEKLY_WINDOW_DAYS);
        let new_rows = thanks.into_records(now);

        let mut rows = self.rows.lock().unwrap();
        let mut window: Vec<ThankRecord> = rows
            .iter()
            .filter(|row| row.create_date > cutoff)
            .cloned()
            .collect();
        window.extend(new_rows.iter().cloned());
        rows.extend(new_rows);
        Ok(window)
    }

    async fn list_all(&self) -> Result<Vec<ThankRecord>, sqlx::Error> {
        if self.fail {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let mut rows = self.rows();
        rows.sort_by(|a, b| b.create_date.cmp(&a.create_date));
        Ok(rows)
    }
}

/// A stored row from `sender` to `recipient`, created `age` ago.
pub fn thank(sender: &str, recipient: &str, age: Duration) -> ThankRecord {
    ThankRecord {
        create_date: Utc::now() - age,
        permalink_url: "https://work.example.com/posts/earlier".to_string(),
        recipient: recipient.to_string(),
        manager: String::new(),
        sender: sender.to_string(),
        message: "valeu!".to_string(),
    }
}
