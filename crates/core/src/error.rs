use fhir::FhirError;
use hl7::Hl7Error;
use mllp::MllpError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Every failure the interoperability façade reports.
///
/// Codec and transport errors are folded into these four kinds at the façade boundary,
/// keeping the original error as the `source` for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum InteropError {
    /// A required key, segment or component is absent.
    #[error("missing required field: {path}")]
    MissingField { path: String },

    /// The payload is present but not valid (bad UUID, wrong shape, unparseable text).
    #[error("malformed payload: {reason}")]
    MalformedPayload {
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Connecting, sending or receiving over MLLP failed.
    #[error("transport error: {0}")]
    Transport(#[source] MllpError),

    /// Building an outbound document failed.
    #[error("conversion error: {reason}")]
    Conversion {
        reason: String,
        #[source]
        source: Option<BoxError>,
    },
}

/// The reported kind of an [`InteropError`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingField,
    MalformedPayload,
    Transport,
    Conversion,
}

impl ErrorKind {
    /// True when the caller's input was at fault (missing or malformed), as opposed to
    /// a failure on the server side (transport or conversion).
    pub fn is_client_error(self) -> bool {
        matches!(self, Self::MissingField | Self::MalformedPayload)
    }
}

impl InteropError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField { .. } => ErrorKind::MissingField,
            Self::MalformedPayload { .. } => ErrorKind::MalformedPayload,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Conversion { .. } => ErrorKind::Conversion,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
            source: Some(source.into()),
        }
    }
}

impl From<FhirError> for InteropError {
    fn from(err: FhirError) -> Self {
        match err {
            FhirError::MissingField { path } => Self::MissingField { path },
            FhirError::Translation(_) => Self::Conversion {
                reason: err.to_string(),
                source: Some(err.into()),
            },
            other => Self::malformed(other.to_string(), other),
        }
    }
}

impl From<Hl7Error> for InteropError {
    fn from(err: Hl7Error) -> Self {
        match err {
            Hl7Error::MissingField { path } => Self::MissingField { path },
            other => Self::malformed(other.to_string(), other),
        }
    }
}

impl From<MllpError> for InteropError {
    fn from(err: MllpError) -> Self {
        Self::Transport(err)
    }
}

pub type InteropResult<T> = std::result::Result<T, InteropError>;
