use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::{Result, SubgenError};

const FALLBACK_MIME: &str = "application/octet-stream";

/// Base name used for artifacts when the source has no usable stem.
const FALLBACK_BASE_NAME: &str = "subtitles";

/// Extension → declared media type.
const MEDIA_TYPES: &[(&str, &str)] = &[
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("flac", "audio/flac"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("opus", "audio/opus"),
    ("weba", "audio/webm"),
    ("aif", "audio/aiff"),
    ("aiff", "audio/aiff"),
    ("mp4", "video/mp4"),
    ("m4v", "video/mp4"),
    ("mov", "video/quicktime"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("wmv", "video/x-ms-wmv"),
    ("flv", "video/x-flv"),
    ("mpeg", "video/mpeg"),
    ("mpg", "video/mpeg"),
    ("3gp", "video/3gpp"),
    ("txt", "text/plain"),
    ("srt", "application/x-subrip"),
    ("vtt", "text/vtt"),
    ("json", "application/json"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("pdf", "application/pdf"),
];

/// Declared media type for a path, from its extension.
pub fn detect_mime_type(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .and_then(|ext| {
            MEDIA_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, mime)| *mime)
        })
        .unwrap_or(FALLBACK_MIME)
}

/// Only audio and video inputs are accepted.
pub fn is_supported_media_type(mime_type: &str) -> bool {
    let mime_type = mime_type.trim().to_lowercase();
    mime_type.starts_with("audio/") || mime_type.starts_with("video/")
}

/// A user-selected audio or video file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    path: PathBuf,
    mime_type: String,
}

impl MediaFile {
    /// Open a file for the pipeline, rejecting anything that is not audio/video.
    ///
    /// `mime_override` replaces extension-based detection.
    pub fn open<P: AsRef<Path>>(path: P, mime_override: Option<&str>) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(SubgenError::FileNotFound(path.display().to_string()));
        }

        let mime_type = match mime_override {
            Some(mime) => mime.trim().to_lowercase(),
            None => detect_mime_type(path).to_string(),
        };

        if !is_supported_media_type(&mime_type) {
            return Err(SubgenError::UnsupportedMedia(mime_type));
        }

        debug!("Selected {} ({})", path.display(), mime_type);

        Ok(Self {
            path: path.to_path_buf(),
            mime_type,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// File name without its final extension.
    pub fn base_name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| FALLBACK_BASE_NAME.to_string())
    }

    /// Read the whole file and encode it for an inline request payload.
    pub async fn read_base64(&self) -> Result<String> {
        let bytes = fs::read(&self.path).await?;
        debug!("Read {} bytes from {}", bytes.len(), self.path.display());
        Ok(STANDARD.encode(bytes))
    }
}
