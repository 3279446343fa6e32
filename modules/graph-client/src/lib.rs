pub mod error;
pub mod types;

pub use error::{GraphError, Result};
pub use types::{CommentResponse, Edge, NodeRef, UserManagers};

use std::collections::HashMap;

use serde::de::DeserializeOwned;

pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com";

/// Bearer-authenticated client bound to a single Graph API endpoint.
#[derive(Clone)]
pub struct GraphClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl GraphClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    pub fn with_base_url(base_url: &str, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Like a post or comment.
    pub async fn like(&self, item_id: &str) -> Result<()> {
        let url = self.url(&format!("{item_id}/likes"));
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        check_status(resp).await?;
        tracing::debug!(item_id, "Liked item");
        Ok(())
    }

    /// Resolve `fields` for many ids in one call using `?ids=` batching.
    ///
    /// Ids the API returns nothing for are absent from the map. An empty id
    /// list short-circuits without touching the network.
    pub async fn bulk_fetch<T: DeserializeOwned>(
        &self,
        ids: &[String],
        fields: &[&str],
    ) -> Result<HashMap<String, T>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let url = self.url("/");
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("ids", ids.join(",")), ("fields", fields.join(","))])
            .send()
            .await?;

        let resp = check_status(resp).await?;
        let body = resp.text().await?;
        let parsed: HashMap<String, T> = serde_json::from_str(&body)?;
        tracing::debug!(requested = ids.len(), resolved = parsed.len(), "Bulk fetch complete");
        Ok(parsed)
    }

    /// First manager per user id, for the users that have one.
    pub async fn managers(&self, ids: &[String]) -> Result<HashMap<String, String>> {
        let users: HashMap<String, UserManagers> = self.bulk_fetch(ids, &["managers"]).await?;
        Ok(users
            .into_iter()
            .filter_map(|(id, user)| user.first_manager().map(|m| (id, m.to_string())))
            .collect())
    }

    /// Post a text comment under a post or comment. Returns the new comment id.
    pub async fn comment(&self, item_id: &str, message: &str) -> Result<String> {
        let url = self.url(&format!("{item_id}/comments"));
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .query(&[("message", message)])
            .send()
            .await?;

        let resp = check_status(resp).await?;
        let created: CommentResponse = resp.json().await?;
        Ok(created.id)
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GraphError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(resp)
}
