//! Paginated device audio browser
//!
//! Holds what a track picker needs: the tracks loaded so far, whether more
//! pages exist and the permission state. Permission problems are state,
//! never errors; a page that fails to load marks access as denied.

use crate::library::{asset_to_track, MediaLibrary, PageRequest, PermissionStatus, DEFAULT_PAGE_SIZE};
use lyra_core::Track;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Browser state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceAudioState {
    pub tracks: Vec<Track>,
    pub is_loading: bool,
    pub has_more: bool,
    pub permission_status: PermissionStatus,
    pub total_count: usize,
}

struct Inner {
    state: DeviceAudioState,
    cursor: Option<String>,
}

/// Device audio browser over a [`MediaLibrary`]
pub struct DeviceAudio<L: MediaLibrary + ?Sized> {
    library: Arc<L>,
    page_size: usize,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<DeviceAudioState>,
}

impl<L: MediaLibrary + ?Sized> DeviceAudio<L> {
    pub fn new(library: Arc<L>) -> Self {
        Self::with_page_size(library, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(library: Arc<L>, page_size: usize) -> Self {
        let (state_tx, _) = watch::channel(DeviceAudioState::default());
        Self {
            library,
            page_size: page_size.max(1),
            inner: Mutex::new(Inner {
                state: DeviceAudioState::default(),
                cursor: None,
            }),
            state_tx,
        }
    }

    pub fn state(&self) -> DeviceAudioState {
        self.lock().state.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DeviceAudioState> {
        self.state_tx.subscribe()
    }

    pub fn tracks(&self) -> Vec<Track> {
        self.lock().state.tracks.clone()
    }

    pub fn permission_status(&self) -> PermissionStatus {
        self.lock().state.permission_status
    }

    /// Check the current permission and load the first page if granted
    pub async fn init(&self) {
        let status = match self.library.check_permission().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Permission check failed");
                PermissionStatus::Undetermined
            }
        };

        self.update(|inner| inner.state.permission_status = status);
        if status.is_granted() {
            self.fetch_page(None).await;
        }
    }

    /// Ask for permission; anything short of a grant counts as denied
    pub async fn request_permission(&self) {
        let status = match self.library.request_permission().await {
            Ok(PermissionStatus::Granted) => PermissionStatus::Granted,
            Ok(_) => PermissionStatus::Denied,
            Err(e) => {
                warn!(error = %e, "Permission request failed");
                PermissionStatus::Denied
            }
        };

        info!(status = ?status, "Media permission");
        self.update(|inner| inner.state.permission_status = status);
        if status.is_granted() {
            self.fetch_page(None).await;
        }
    }

    /// Append the next page
    ///
    /// Does nothing while a page is loading or when there are no more pages.
    pub async fn load_more(&self) {
        let cursor = {
            let inner = self.lock();
            if inner.state.is_loading || !inner.state.has_more {
                debug!("Nothing more to load");
                return;
            }
            inner.cursor.clone()
        };
        self.fetch_page(cursor).await;
    }

    /// Reload from the first page, replacing the loaded tracks
    pub async fn refresh(&self) {
        self.update(|inner| inner.cursor = None);
        self.fetch_page(None).await;
    }

    /// Load one page. Without a cursor the loaded tracks are replaced,
    /// otherwise the page is appended.
    async fn fetch_page(&self, cursor: Option<String>) {
        self.update(|inner| inner.state.is_loading = true);

        let appending = cursor.is_some();
        let request = PageRequest {
            page_size: self.page_size,
            cursor,
        };

        match self.library.list_audio(request).await {
            Ok(page) => {
                let tracks: Vec<Track> = page.items.iter().map(asset_to_track).collect();
                debug!(
                    loaded = tracks.len(),
                    total = page.total_count,
                    has_more = page.has_more,
                    "Loaded audio page"
                );

                self.update(|inner| {
                    if appending {
                        inner.state.tracks.extend(tracks);
                    } else {
                        inner.state.tracks = tracks;
                    }
                    inner.cursor = page.next_cursor;
                    inner.state.has_more = page.has_more;
                    inner.state.total_count = page.total_count;
                    inner.state.is_loading = false;
                });
            }
            Err(e) => {
                warn!(error = %e, "Failed to list audio, treating access as denied");
                self.update(|inner| {
                    inner.state.permission_status = PermissionStatus::Denied;
                    inner.state.is_loading = false;
                });
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut Inner)) {
        let mut inner = self.lock();
        f(&mut inner);
        let snapshot = inner.state.clone();
        drop(inner);
        self.state_tx.send_replace(snapshot);
    }
}
