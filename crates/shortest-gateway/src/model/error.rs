use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Canonical reason phrase of the HTTP status, e.g. `Not Found`.
    pub status: String,
    pub error: String,
}
