use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubgenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Please select a file first.")]
    NoFileSelected,

    #[error("Unsupported media type '{0}': please choose an audio or video file")]
    UnsupportedMedia(String),

    #[error("No API key configured: run `subgen key set <KEY>` or set the API key environment variable")]
    MissingCredential,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unknown target language: {0}")]
    UnknownLanguage(String),

    #[error("A generation attempt is already in progress")]
    Busy,

    #[error("Model request failed: {0}")]
    Model(String),

    #[error("Audio transcription failed: {0}")]
    Transcription(String),

    #[error("Subtitle translation failed: {0}")]
    Translation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SubgenError {
    /// Input-validation errors are raised before any network activity.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NoFileSelected
                | Self::UnsupportedMedia(_)
                | Self::MissingCredential
                | Self::FileNotFound(_)
                | Self::UnknownLanguage(_)
                | Self::Busy
        )
    }
}

pub type Result<T> = std::result::Result<T, SubgenError>;
