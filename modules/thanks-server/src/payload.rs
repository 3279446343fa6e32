//! Webhook wire types and the mention events derived from them.

use serde::Deserialize;
use thiserror::Error;

pub const MENTION_FIELD: &str = "mention";

/// Top-level webhook delivery.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    pub id: Option<String>,
    #[serde(default)]
    pub changes: Vec<Change>,
}

/// One changed field. `value` is only decoded once the field is known.
#[derive(Debug, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// `value` of a `mention` change.
#[derive(Debug, Deserialize)]
pub struct MentionValue {
    /// `"post"` or `"comment"`.
    pub item: Option<String>,
    pub post_id: Option<String>,
    pub comment_id: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub message_tags: Vec<MessageTag>,
    pub from: Option<Author>,
    #[serde(default)]
    pub permalink_url: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageTag {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
}

impl MessageTag {
    pub fn is_user(&self) -> bool {
        self.kind.as_deref() == Some("user")
    }
}

#[derive(Debug, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum MentionError {
    #[error("mention value is missing {0}")]
    MissingField(&'static str),

    #[error("mention value could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A validated mention: who tagged whom, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    /// The comment id for comment mentions, the post id otherwise.
    pub target_id: String,
    pub sender: String,
    pub message: String,
    pub permalink_url: String,
    /// Tagged users in tag order. Page and group tags are dropped.
    pub recipients: Vec<String>,
}

impl TryFrom<MentionValue> for Mention {
    type Error = MentionError;

    fn try_from(value: MentionValue) -> Result<Self, Self::Error> {
        let target_id = if value.item.as_deref() == Some("comment") {
            value.comment_id.ok_or(MentionError::MissingField("comment_id"))?
        } else {
            value.post_id.ok_or(MentionError::MissingField("post_id"))?
        };
        let sender = value.from.ok_or(MentionError::MissingField("from"))?.id;

        let recipients = value
            .message_tags
            .into_iter()
            .filter(MessageTag::is_user)
            .filter_map(|tag| tag.id)
            .collect();

        Ok(Mention {
            target_id,
            sender,
            message: value.message,
            permalink_url: value.permalink_url,
            recipients,
        })
    }
}

impl WebhookPayload {
    /// Mentions in delivery order. Changes to any other field are skipped.
    pub fn mentions(self) -> impl Iterator<Item = Result<Mention, MentionError>> {
        self.entry
            .into_iter()
            .flat_map(|entry| entry.changes)
            .filter(|change| change.field == MENTION_FIELD)
            .map(|change| {
                let value: MentionValue = serde_json::from_value(change.value)?;
                Mention::try_from(value)
            })
    }
}
