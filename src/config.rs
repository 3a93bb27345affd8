use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, SubgenError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub credential: CredentialConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of the Generative Language API
    pub endpoint: String,
    /// Model used for transcription and translation
    pub model: String,
    /// Request timeout in seconds; audio uploads can take a while
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// File holding the saved API key
    pub path: PathBuf,
    /// Environment variable checked before the key file
    pub env_var: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Target language code used when `--lang` is not given
    pub default_language: String,
    /// Output mode used when `--mode` is not given
    pub mode: OutputMode,
}

/// What the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Timed entries written as SRT, with a VTT preview track
    #[default]
    Subtitles,
    /// One plain-text paragraph
    Text,
}

impl OutputMode {
    /// File extension of the downloadable artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Subtitles => "srt",
            Self::Text => "txt",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subtitles => write!(f, "subtitles"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl FromStr for OutputMode {
    type Err = SubgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "subtitles" | "srt" => Ok(Self::Subtitles),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(SubgenError::Config(format!(
                "Invalid output mode '{}'. Valid modes: subtitles, text",
                s
            ))),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-pro".to_string(),
            timeout_secs: 300,
        }
    }
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".subgen").join("credential"),
            env_var: "GEMINI_API_KEY".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_language: crate::languages::ORIGINAL_CODE.to_string(),
            mode: OutputMode::Subtitles,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubgenError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubgenError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_takes_defaults() {
        let config: Config = toml::from_str(
            r#"
            [model]
            model = "gemini-2.5-flash"

            [output]
            mode = "text"
            "#,
        )
        .unwrap();

        assert_eq!(config.model.model, "gemini-2.5-flash");
        assert_eq!(config.model.timeout_secs, 300);
        assert_eq!(config.output.mode, OutputMode::Text);
        assert_eq!(config.output.default_language, "original");
        assert_eq!(config.credential.env_var, "GEMINI_API_KEY");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.output.default_language = "ja".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.output.default_language, "ja");
        assert_eq!(loaded.model.endpoint, config.model.endpoint);
    }

    #[test]
    fn test_invalid_file_is_toml_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = [").unwrap();

        assert!(matches!(Config::from_file(&path), Err(SubgenError::Toml(_))));
        assert!(matches!(
            Config::from_file(dir.path().join("missing.toml")),
            Err(SubgenError::Io(_))
        ));
    }

    #[test]
    fn test_output_mode_parsing() {
        assert_eq!("SRT".parse::<OutputMode>().unwrap(), OutputMode::Subtitles);
        assert_eq!("text".parse::<OutputMode>().unwrap(), OutputMode::Text);
        assert!("vtt".parse::<OutputMode>().is_err());
        assert_eq!(OutputMode::Text.extension(), "txt");
    }
}
