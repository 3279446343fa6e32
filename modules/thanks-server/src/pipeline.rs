//! Mention pipeline: acknowledge, resolve managers, record, reply.
//!
//! The like and the reply run as detached tasks; only the manager lookup and
//! the store round trip gate forward progress. No step failure is surfaced to
//! the webhook caller.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use graph_client::GraphClient;
use thanks_store::{NewThanks, Recipient, ThanksRepository};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::payload::Mention;
use crate::summary::compose_summary;

/// The Graph API operations the pipeline needs.
#[async_trait]
pub trait GraphApi: Send + Sync {
    /// Like a post or comment to signal receipt.
    async fn acknowledge(&self, item_id: &str) -> graph_client::Result<()>;

    /// First manager per user, for the users that have one.
    async fn managers(&self, user_ids: &[String]) -> graph_client::Result<HashMap<String, String>>;

    /// Comment under a post or comment.
    async fn reply(&self, item_id: &str, message: &str) -> graph_client::Result<()>;
}

#[async_trait]
impl GraphApi for GraphClient {
    async fn acknowledge(&self, item_id: &str) -> graph_client::Result<()> {
        self.like(item_id).await
    }

    async fn managers(&self, user_ids: &[String]) -> graph_client::Result<HashMap<String, String>> {
        GraphClient::managers(self, user_ids).await
    }

    async fn reply(&self, item_id: &str, message: &str) -> graph_client::Result<()> {
        self.comment(item_id, message).await.map(|_| ())
    }
}

/// What happened to one mention.
#[derive(Debug)]
pub struct MentionOutcome {
    /// Rows written; zero when nothing was persisted.
    pub recorded: usize,
    /// The reply text, when the mention got as far as replying.
    pub summary: Option<String>,
    /// Detached like/reply tasks. Dropping them leaves them running.
    pub background: Vec<JoinHandle<()>>,
}

impl MentionOutcome {
    /// Wait for the detached tasks to finish.
    pub async fn settle(self) {
        for task in self.background {
            let _ = task.await;
        }
    }
}

#[derive(Clone)]
pub struct MentionPipeline {
    graph: Arc<dyn GraphApi>,
    store: Arc<dyn ThanksRepository>,
}

impl MentionPipeline {
    pub fn new(graph: Arc<dyn GraphApi>, store: Arc<dyn ThanksRepository>) -> Self {
        Self { graph, store }
    }

    pub async fn process(&self, mention: Mention) -> MentionOutcome {
        let Mention {
            target_id,
            sender,
            message,
            permalink_url,
            recipients,
        } = mention;

        let mut background = vec![self.spawn_acknowledge(target_id.clone())];

        if recipients.is_empty() {
            info!(item_id = %target_id, "Mention tags no users; nothing to record");
            return MentionOutcome {
                recorded: 0,
                summary: None,
                background,
            };
        }

        let recipients = self.resolve_managers(&recipients).await;
        let thanks = NewThanks {
            sender: sender.clone(),
            message,
            permalink_url,
            recipients: recipients.clone(),
        };

        let window = match self.store.record_and_read_window(thanks).await {
            Ok(window) => window,
            Err(e) => {
                error!(item_id = %target_id, error = %e, "Failed to record thanks");
                return MentionOutcome {
                    recorded: 0,
                    summary: None,
                    background,
                };
            }
        };
        info!(
            item_id = %target_id,
            recipients = recipients.len(),
            window = window.len(),
            "Recorded thanks"
        );

        let summary = compose_summary(&sender, &recipients, &window);
        background.push(self.spawn_reply(target_id, summary.clone()));

        MentionOutcome {
            recorded: recipients.len(),
            summary: Some(summary),
            background,
        }
    }

    /// One batched lookup for every recipient. A failed lookup leaves every
    /// manager empty.
    async fn resolve_managers(&self, user_ids: &[String]) -> Vec<Recipient> {
        let managers = match self.graph.managers(user_ids).await {
            Ok(managers) => managers,
            Err(e) => {
                warn!(error = %e, "Manager lookup failed; continuing without managers");
                HashMap::new()
            }
        };

        user_ids
            .iter()
            .map(|id| Recipient::new(id.clone(), managers.get(id).cloned().unwrap_or_default()))
            .collect()
    }

    fn spawn_acknowledge(&self, item_id: String) -> JoinHandle<()> {
        let graph = self.graph.clone();
        tokio::spawn(async move {
            match graph.acknowledge(&item_id).await {
                Ok(()) => info!(item_id = %item_id, "Liked mention"),
                Err(e) => warn!(item_id = %item_id, error = %e, "Failed to like mention"),
            }
        })
    }

    fn spawn_reply(&self, item_id: String, summary: String) -> JoinHandle<()> {
        let graph = self.graph.clone();
        tokio::spawn(async move {
            match graph.reply(&item_id, &summary).await {
                Ok(()) => info!(item_id = %item_id, "Posted summary reply"),
                Err(e) => warn!(item_id = %item_id, error = %e, "Failed to post summary reply"),
            }
        })
    }
}
