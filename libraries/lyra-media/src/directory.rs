//! Filesystem-backed media library
//!
//! Serves the audio files under a root directory as pages in a stable,
//! path-sorted order. The cursor is the offset of the next file.

use crate::error::{MediaError, Result};
use crate::library::{AudioAsset, AudioPage, MediaLibrary, PageRequest, PermissionStatus};
use async_trait::async_trait;
use lofty::AudioFile;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Supported audio file extensions
const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "aac", "m4a", "opus"];

/// Audio files under a directory
#[derive(Debug, Clone)]
pub struct DirectoryLibrary {
    root: PathBuf,
    follow_links: bool,
}

impl DirectoryLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_links: false,
        }
    }

    /// Set whether to follow symbolic links
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn permission(&self) -> PermissionStatus {
        match std::fs::read_dir(&self.root) {
            Ok(_) => PermissionStatus::Granted,
            Err(e) => {
                debug!(root = %self.root.display(), error = %e, "Music directory not readable");
                PermissionStatus::Denied
            }
        }
    }
}

#[async_trait]
impl MediaLibrary for DirectoryLibrary {
    async fn check_permission(&self) -> Result<PermissionStatus> {
        Ok(self.permission())
    }

    /// There is nothing to prompt for; readable means granted
    async fn request_permission(&self) -> Result<PermissionStatus> {
        Ok(self.permission())
    }

    async fn list_audio(&self, request: PageRequest) -> Result<AudioPage> {
        let offset = match request.cursor.as_deref() {
            None => 0,
            Some(cursor) => cursor
                .parse::<usize>()
                .map_err(|_| MediaError::InvalidCursor(cursor.to_string()))?,
        };

        let root = self.root.clone();
        let follow_links = self.follow_links;
        let page_size = request.page_size.max(1);

        tokio::task::spawn_blocking(move || list_page(&root, follow_links, offset, page_size))
            .await
            .map_err(|e| MediaError::Task(e.to_string()))?
    }
}

fn list_page(root: &Path, follow_links: bool, offset: usize, page_size: usize) -> Result<AudioPage> {
    let files = scan_directory(root, follow_links)?;
    let total_count = files.len();

    let start = offset.min(total_count);
    let end = start.saturating_add(page_size).min(total_count);
    let base = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

    let items: Vec<AudioAsset> = files[start..end]
        .iter()
        .map(|relative| to_asset(&base, relative))
        .collect();

    debug!(
        root = %root.display(),
        offset = start,
        count = items.len(),
        total = total_count,
        "Listed audio page"
    );

    Ok(AudioPage {
        items,
        next_cursor: Some(end.to_string()),
        has_more: end < total_count,
        total_count,
    })
}

/// Audio files under `root`, relative to it, sorted by path
fn scan_directory(root: &Path, follow_links: bool) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(MediaError::NotADirectory(root.display().to_string()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(follow_links).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                trace!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        if entry.file_type().is_dir() || !is_audio_file(path) {
            continue;
        }

        if let Ok(relative) = path.strip_prefix(root) {
            files.push(relative.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

fn to_asset(base: &Path, relative: &Path) -> AudioAsset {
    let absolute = base.join(relative);
    let id = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let filename = relative
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    AudioAsset {
        uri: format!("file://{}", absolute.display()),
        duration: probe_duration(&absolute),
        id,
        filename,
    }
}

/// Duration in seconds from the file's audio properties, 0 when unreadable
fn probe_duration(path: &Path) -> f64 {
    match lofty::read_from_path(path) {
        Ok(tagged_file) => tagged_file.properties().duration().as_secs_f64(),
        Err(e) => {
            trace!(path = %path.display(), error = %e, "Could not probe duration");
            0.0
        }
    }
}

/// Check if a file is a supported audio file
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}
