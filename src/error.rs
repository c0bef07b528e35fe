use crate::payload::SourceKind;

/// Errors raised synchronously by window and registry mutators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OverlayError {
    #[error("opacity {value} is outside [0.1, 1.0]")]
    OpacityOutOfRange { value: f32 },

    #[error("a window named `{0}` is already registered")]
    DuplicateName(String),

    #[error("no window named `{0}`")]
    UnknownWindow(String),
}

/// Outcome of a failed poll cycle. These never leave the dispatch drain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PollError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("i/o failure: {0}")]
    Io(String),

    #[error("request failed: {0}")]
    Http(String),

    #[error("malformed payload: {0}")]
    Parse(String),

    #[error("short line with {fields} field(s)")]
    ShortLine { fields: usize },

    #[error("{0} support is not available in this build")]
    Unavailable(SourceKind),

    #[error("poll cycle panicked: {0}")]
    Panicked(String),
}

impl PollError {
    /// Transient errors are expected to clear up on a later cycle.
    pub fn is_transient(&self) -> bool {
        !matches!(self, PollError::Unavailable(_) | PollError::Panicked(_))
    }
}

impl From<std::io::Error> for PollError {
    fn from(err: std::io::Error) -> Self {
        PollError::Io(err.to_string())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for PollError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PollError::Parse(err.to_string())
        } else {
            PollError::Http(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("`{got}` payload cannot be rendered by a {expected} window")]
    ShapeMismatch {
        expected: &'static str,
        got: &'static str,
    },

    #[error("invalid payload: {0}")]
    Invalid(String),
}
