use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::CredentialConfig;
use crate::error::{Result, SubgenError};

/// Opaque API key. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Trims the key; blank input is not a credential.
    pub fn new(key: impl AsRef<str>) -> Option<Self> {
        let key = key.as_ref().trim();
        if key.is_empty() {
            None
        } else {
            Some(Self(key.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<redacted>)")
    }
}

/// Where a resolved credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Environment(String),
    File(PathBuf),
}

/// Single-key store persisted to a local file.
pub struct CredentialStore {
    path: PathBuf,
    env_var: Option<String>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env_var: None,
        }
    }

    pub fn from_config(config: &CredentialConfig) -> Self {
        Self {
            path: config.path.clone(),
            env_var: Some(config.env_var.clone()).filter(|v| !v.is_empty()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve the key: environment variable first, then the saved file.
    pub fn resolve(&self) -> Result<Option<(Credential, CredentialSource)>> {
        if let Some(var) = &self.env_var {
            if let Some(credential) = std::env::var(var).ok().and_then(Credential::new) {
                debug!("Using API key from environment variable {}", var);
                return Ok(Some((credential, CredentialSource::Environment(var.clone()))));
            }
        }

        Ok(self
            .load()?
            .map(|credential| (credential, CredentialSource::File(self.path.clone()))))
    }

    /// Load the saved key, if any.
    pub fn load(&self) -> Result<Option<Credential>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Credential::new(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SubgenError::Config(format!(
                "Failed to read credential file {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Save the key, replacing any previous one.
    pub fn save(&self, credential: &Credential) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        // Write next to the target and rename so a crash never leaves half a key.
        let mut staged = tempfile::NamedTempFile::new_in(&dir)?;
        staged.write_all(credential.expose().as_bytes())?;
        staged.flush()?;
        restrict_permissions(staged.path())?;
        staged
            .persist(&self.path)
            .map_err(|e| SubgenError::Io(e.error))?;

        info!("API key saved to {}", self.path.display());
        Ok(())
    }

    /// Remove the saved key. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("API key removed from {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
