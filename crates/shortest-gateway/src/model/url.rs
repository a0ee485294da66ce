use serde::{Deserialize, Serialize};

/// Body of both `/encode` and `/decode`, in requests and responses alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlPayload {
    pub url: String,
}
