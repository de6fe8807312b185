//! Error types for tubeforge.

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort a download job.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool is missing or misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The target directory or file state prevents the job from running.
    #[error("filesystem error: {0}")]
    Filesystem(String),

    /// An external tool failed.
    #[error("{tool} failed: {message}")]
    Process { tool: String, message: String },

    /// Tool or service output could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Create a tool execution error.
    pub fn process(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Process {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
