/// Errors raised by the service core.
///
/// The variants group into the classes the rest of the service reasons about:
/// transport (`Transport`, `UnexpectedStatus`), decode (`Decode`), domain payload
/// (`MissingField`, `NotFound`), request input (`Validation`) and startup (`Config`).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no access token available")]
    TokenUnavailable,

    #[error("FHIR error: {0}")]
    Fhir(fhir::FhirError),
}

impl From<fhir::FhirError> for CoreError {
    fn from(err: fhir::FhirError) -> Self {
        match err {
            fhir::FhirError::MissingField(field) => CoreError::MissingField(field),
            other => CoreError::Fhir(other),
        }
    }
}

impl CoreError {
    /// Whether the error came from an HTTP dependency (network failure or non-2xx status).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CoreError::Transport(_) | CoreError::UnexpectedStatus { .. }
        )
    }

    /// The HTTP status returned by a dependency, if the error carries one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            CoreError::UnexpectedStatus { status, .. } => Some(*status),
            CoreError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
