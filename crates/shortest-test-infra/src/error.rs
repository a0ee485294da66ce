use thiserror::Error;

#[derive(Debug, Error)]
pub enum TestInfraError {
    /// Starting, inspecting, or stopping a fixture container failed.
    #[error("fixture container failed: {0}")]
    Container(#[from] testcontainers::TestcontainersError),
}

pub type Result<T> = std::result::Result<T, TestInfraError>;
