use thiserror::Error;

/// Shown when the form is submitted with an empty file input.
pub const NO_FILE_MESSAGE: &str = "Please select an image file.";

/// Last-resort text for failures that carry no message at all.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Please select an image file.")]
    NoFileSelected,

    /// Non-2xx response whose body carried an `error` string.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Non-2xx response without a usable `error` string.
    #[error("Server error {0}")]
    Status(u16),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid server url: {0}")]
    InvalidServerUrl(String),

    #[error("missing element #{0}")]
    MissingElement(&'static str),
}

impl UploadError {
    /// Text rendered into the error panel for this failure.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }

    /// HTTP status attached to the failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Status(status) => Some(*status),
            _ => None,
        }
    }
}
