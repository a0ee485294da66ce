use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl HealthResponse {
    /// The process is up and serving requests.
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}
