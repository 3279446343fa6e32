use serde::Deserialize;

/// A paged edge as returned by the Graph API: `{ "data": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Bare object reference, the minimal shape of any node in an edge.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeRef {
    pub id: String,
}

/// Response shape for `?ids=...&fields=managers`, one per requested id.
#[derive(Debug, Clone, Deserialize)]
pub struct UserManagers {
    pub id: Option<String>,
    pub managers: Option<Edge<NodeRef>>,
}

impl UserManagers {
    /// The first listed manager, if the user has any.
    pub fn first_manager(&self) -> Option<&str> {
        self.managers
            .as_ref()
            .and_then(|edge| edge.data.first())
            .map(|node| node.id.as_str())
    }
}

/// Response body of a created comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentResponse {
    pub id: String,
}
