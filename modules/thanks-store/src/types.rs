use chrono::{DateTime, Utc};
use serde::Serialize;

/// A row of the `thanks` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThankRecord {
    pub create_date: DateTime<Utc>,
    pub permalink_url: String,
    pub recipient: String,
    /// Empty when the recipient's manager could not be resolved.
    pub manager: String,
    pub sender: String,
    pub message: String,
}

/// A tagged user and their manager (empty if unknown).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub id: String,
    pub manager: String,
}

impl Recipient {
    pub fn new(id: impl Into<String>, manager: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            manager: manager.into(),
        }
    }

    pub fn has_manager(&self) -> bool {
        !self.manager.is_empty()
    }
}

/// Everything needed to record one mention. The store assigns `create_date`
/// and writes one row per recipient.
#[derive(Debug, Clone)]
pub struct NewThanks {
    pub sender: String,
    pub message: String,
    pub permalink_url: String,
    pub recipients: Vec<Recipient>,
}

impl NewThanks {
    /// Expand into the rows this mention produces, stamped with `now`.
    pub fn into_records(self, now: DateTime<Utc>) -> Vec<ThankRecord> {
        let NewThanks {
            sender,
            message,
            permalink_url,
            recipients,
        } = self;

        recipients
            .into_iter()
            .map(|r| ThankRecord {
                create_date: now,
                permalink_url: permalink_url.clone(),
                recipient: r.id,
                manager: r.manager,
                sender: sender.clone(),
                message: message.clone(),
            })
            .collect()
    }
}
