use tandcode_core::CatalogError;
use tandcode_llm::LlmError;
use thiserror::Error;

/// Failures that end a coding request. Parse failures, timeouts and summary
/// failures are not here: they degrade to a successful response.
#[derive(Error, Debug)]
pub enum CodingError {
    #[error("invalid input: {0}")]
    Input(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("language model request failed: {0}")]
    Upstream(#[source] LlmError),
}

impl CodingError {
    /// HTTP-style status a service front end would answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Input(_) => 400,
            Self::Configuration(_) => 503,
            Self::Upstream(_) => 502,
        }
    }
}

impl From<LlmError> for CodingError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingCredentials => Self::Configuration(e.to_string()),
            other => Self::Upstream(other),
        }
    }
}

impl From<CatalogError> for CodingError {
    fn from(e: CatalogError) -> Self {
        Self::Configuration(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_errors_map_by_kind() {
        let missing: CodingError = LlmError::MissingCredentials.into();
        assert!(matches!(missing, CodingError::Configuration(_)));
        assert_eq!(missing.status_code(), 503);

        let server: CodingError = LlmError::Server {
            status: 500,
            body: "overloaded".into(),
        }
        .into();
        assert!(matches!(server, CodingError::Upstream(_)));
        assert_eq!(server.status_code(), 502);
    }

    #[test]
    fn catalog_errors_are_configuration() {
        let e: CodingError = CatalogError::Empty.into();
        assert_eq!(e.status_code(), 503);
        assert_eq!(CodingError::Input("x".into()).status_code(), 400);
    }
}
