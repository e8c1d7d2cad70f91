use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

impl InfraError {
    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_error_names_the_failed_step() {
        let err = InfraError::telemetry("subscriber already set");
        assert_eq!(
            err.to_string(),
            "telemetry initialization failed: subscriber already set"
        );
    }
}
