use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;
use super::MediaFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Playable reference to the selected input file
    MediaPreview,
    /// Generated WebVTT track for the preview
    SubtitleTrack,
}

/// Revocable reference to a transient local resource.
///
/// Not `Clone`: releasing consumes the handle, so a released handle cannot be
/// used again.
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceHandle {
    id: Uuid,
    kind: ResourceKind,
    path: PathBuf,
    content_type: String,
}

impl ResourceHandle {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

/// Allocator for the pipeline's preview resources.
pub trait ResourceStore: Send {
    /// Reference the selected media file for playback.
    fn acquire_media(&mut self, file: &MediaFile) -> Result<ResourceHandle>;

    /// Materialize generated text (e.g. a VTT track) as a resource.
    fn acquire_text(&mut self, text: &str, content_type: &str) -> Result<ResourceHandle>;

    /// Revoke a handle and free whatever backs it.
    fn release(&mut self, handle: ResourceHandle);

    /// Number of handles acquired and not yet released.
    fn live_count(&self) -> usize;
}

struct LiveResource {
    path: PathBuf,
    owned: bool,
}

/// Resource store backed by a private temporary directory.
///
/// Media previews point at the original file; text resources are written
/// into the directory and deleted on release. Dropping the store removes the
/// directory and anything still in it.
pub struct TempResourceStore {
    dir: TempDir,
    live: HashMap<Uuid, LiveResource>,
}

impl TempResourceStore {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("subgen-preview-").tempdir()?;
        debug!("Preview resources in {}", dir.path().display());
        Ok(Self {
            dir,
            live: HashMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    fn handle(&mut self, kind: ResourceKind, path: PathBuf, content_type: &str, owned: bool) -> ResourceHandle {
        let id = Uuid::new_v4();
        self.live.insert(
            id,
            LiveResource {
                path: path.clone(),
                owned,
            },
        );
        ResourceHandle {
            id,
            kind,
            path,
            content_type: content_type.to_string(),
        }
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "text/vtt" => "vtt",
        "application/x-subrip" => "srt",
        _ => "txt",
    }
}

impl ResourceStore for TempResourceStore {
    fn acquire_media(&mut self, file: &MediaFile) -> Result<ResourceHandle> {
        let handle = self.handle(
            ResourceKind::MediaPreview,
            file.path().to_path_buf(),
            file.mime_type(),
            false,
        );
        debug!("Acquired media preview {} for {}", handle.id, file.path().display());
        Ok(handle)
    }

    fn acquire_text(&mut self, text: &str, content_type: &str) -> Result<ResourceHandle> {
        let id = Uuid::new_v4();
        let path = self
            .dir
            .path()
            .join(format!("{}.{}", id, extension_for(content_type)));
        std::fs::write(&path, text)?;

        let handle = self.handle(ResourceKind::SubtitleTrack, path, content_type, true);
        debug!("Acquired text resource {} at {}", handle.id, handle.path.display());
        Ok(handle)
    }

    fn release(&mut self, handle: ResourceHandle) {
        let Some(resource) = self.live.remove(&handle.id) else {
            warn!("Release of unknown resource {}", handle.id);
            return;
        };

        if resource.owned {
            if let Err(e) = std::fs::remove_file(&resource.path) {
                warn!("Failed to remove {}: {}", resource.path.display(), e);
            }
        }
        debug!("Released resource {}", handle.id);
    }

    fn live_count(&self) -> usize {
        self.live.len()
    }
}
