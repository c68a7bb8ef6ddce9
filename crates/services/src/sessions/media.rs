//! Media lifecycle for the current question slot.
//!
//! [`MediaSlot`] is the bookkeeping owned by the session: at most one playback
//! handle and at most one recording handle, never both. Leaving a question moves
//! the handles out as [`ReleasedMedia`], which [`MediaLifecycle`] hands back to the
//! device through a [`MediaBackend`].

use std::sync::Arc;

use async_trait::async_trait;
use practice_core::model::MediaUri;
use tracing::{debug, warn};

use crate::error::{MediaError, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(u64);

impl PlaybackHandle {
    #[must_use]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordingHandle(u64);

impl RecordingHandle {
    #[must_use]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Status delivered by the device for a playback handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackStatus {
    pub is_playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub did_just_finish: bool,
}

/// What a playback handle is rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackSource {
    /// The exercise's own media (listening clip, speaking example).
    Exercise,
    /// The learner's finished recording for this question.
    Recording,
}

/// Receives status updates for playback handles created by the backend.
pub type StatusSink = Arc<dyn Fn(PlaybackHandle, PlaybackStatus) + Send + Sync>;

/// Device audio primitives.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Load `uri` and start playing it. Status updates go to `status`.
    async fn create_and_play(
        &self,
        uri: &MediaUri,
        status: StatusSink,
    ) -> Result<PlaybackHandle, MediaError>;
    async fn pause(&self, handle: PlaybackHandle) -> Result<(), MediaError>;
    async fn resume(&self, handle: PlaybackHandle) -> Result<(), MediaError>;
    async fn unload(&self, handle: PlaybackHandle) -> Result<(), MediaError>;
    async fn request_recording_permission(&self) -> Result<bool, MediaError>;
    async fn start_recording(&self) -> Result<RecordingHandle, MediaError>;
    /// Stop, unload, and return the URI of the captured audio.
    async fn stop_recording(&self, handle: RecordingHandle) -> Result<MediaUri, MediaError>;
}

//
// ─── SLOT BOOKKEEPING ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playback {
    pub handle: PlaybackHandle,
    pub source: PlaybackSource,
    pub status: PlaybackStatus,
}

/// Handles moved out of a slot; they must be handed to [`MediaLifecycle::release`].
#[derive(Debug, Default, PartialEq, Eq)]
#[must_use = "released handles must be returned to the media backend"]
pub struct ReleasedMedia {
    pub playback: Option<PlaybackHandle>,
    pub recording: Option<RecordingHandle>,
}

impl ReleasedMedia {
    pub fn is_empty(&self) -> bool {
        self.playback.is_none() && self.recording.is_none()
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MediaSlot {
    playback: Option<Playback>,
    recording: Option<RecordingHandle>,
}

impl MediaSlot {
    #[must_use]
    pub fn playback(&self) -> Option<&Playback> {
        self.playback.as_ref()
    }

    #[must_use]
    pub fn recording(&self) -> Option<RecordingHandle> {
        self.recording
    }

    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Install a new playback handle. Returns the handle it replaces, if any.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyRecording` while a recording is active.
    pub fn attach_playback(
        &mut self,
        handle: PlaybackHandle,
        source: PlaybackSource,
    ) -> Result<Option<PlaybackHandle>, SessionError> {
        if self.recording.is_some() {
            return Err(SessionError::AlreadyRecording);
        }
        let previous = self.playback.replace(Playback {
            handle,
            source,
            status: PlaybackStatus {
                is_playing: true,
                ..PlaybackStatus::default()
            },
        });
        Ok(previous.map(|p| p.handle))
    }

    /// Install a recording handle, evicting any playback handle.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyRecording` if a recording is already active.
    pub fn attach_recording(
        &mut self,
        handle: RecordingHandle,
    ) -> Result<Option<PlaybackHandle>, SessionError> {
        if self.recording.is_some() {
            return Err(SessionError::AlreadyRecording);
        }
        self.recording = Some(handle);
        Ok(self.playback.take().map(|p| p.handle))
    }

    /// # Errors
    ///
    /// Returns `SessionError::NotRecording` if `handle` is not the active recording.
    pub fn detach_recording(&mut self, handle: RecordingHandle) -> Result<(), SessionError> {
        if self.recording != Some(handle) {
            return Err(SessionError::NotRecording);
        }
        self.recording = None;
        Ok(())
    }

    /// Apply a status update. Returns `false` (and changes nothing) for a stale handle.
    pub fn apply_status(&mut self, handle: PlaybackHandle, status: PlaybackStatus) -> bool {
        let Some(playback) = self.playback.as_mut().filter(|p| p.handle == handle) else {
            return false;
        };
        playback.status = status;
        if status.did_just_finish {
            playback.status.is_playing = false;
            playback.status.position_ms = 0;
        }
        true
    }

    pub fn set_playing(&mut self, handle: PlaybackHandle, is_playing: bool) {
        if let Some(playback) = self.playback.as_mut().filter(|p| p.handle == handle) {
            playback.status.is_playing = is_playing;
        }
    }

    /// Move every handle out, leaving the slot empty.
    pub fn release_all(&mut self) -> ReleasedMedia {
        ReleasedMedia {
            playback: self.playback.take().map(|p| p.handle),
            recording: self.recording.take(),
        }
    }
}

//
// ─── LIFECYCLE ADAPTER ─────────────────────────────────────────────────────────
//

/// Wraps backend calls, logging failures instead of propagating them.
#[derive(Clone)]
pub struct MediaLifecycle {
    backend: Arc<dyn MediaBackend>,
}

impl MediaLifecycle {
    #[must_use]
    pub fn new(backend: Arc<dyn MediaBackend>) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn MediaBackend> {
        &self.backend
    }

    /// Return released handles to the device. Never fails; errors are logged.
    pub async fn release(&self, released: ReleasedMedia) {
        if let Some(handle) = released.recording {
            match self.backend.stop_recording(handle).await {
                Ok(uri) => debug!(%uri, "discarded unfinished recording"),
                Err(err) => warn!(handle = handle.value(), error = %err, "failed to stop recording"),
            }
        }
        if let Some(handle) = released.playback {
            if let Err(err) = self.backend.unload(handle).await {
                warn!(handle = handle.value(), error = %err, "failed to unload playback");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_evicts_playback() {
        let mut slot = MediaSlot::default();
        slot.attach_playback(PlaybackHandle::new(1), PlaybackSource::Exercise)
            .unwrap();

        let evicted = slot.attach_recording(RecordingHandle::new(7)).unwrap();
        assert_eq!(evicted, Some(PlaybackHandle::new(1)));
        assert!(slot.playback().is_none());
        assert!(slot.is_recording());
    }

    #[test]
    fn concurrent_recording_and_playback_are_rejected() {
        let mut slot = MediaSlot::default();
        slot.attach_recording(RecordingHandle::new(1)).unwrap();
        assert_eq!(
            slot.attach_recording(RecordingHandle::new(2)),
            Err(SessionError::AlreadyRecording)
        );
        assert_eq!(
            slot.attach_playback(PlaybackHandle::new(3), PlaybackSource::Recording),
            Err(SessionError::AlreadyRecording)
        );
    }

    #[test]
    fn replacing_playback_returns_previous_handle() {
        let mut slot = MediaSlot::default();
        assert_eq!(
            slot.attach_playback(PlaybackHandle::new(1), PlaybackSource::Exercise),
            Ok(None)
        );
        assert_eq!(
            slot.attach_playback(PlaybackHandle::new(2), PlaybackSource::Recording),
            Ok(Some(PlaybackHandle::new(1)))
        );
    }

    #[test]
    fn status_for_stale_handle_is_ignored() {
        let mut slot = MediaSlot::default();
        slot.attach_playback(PlaybackHandle::new(5), PlaybackSource::Exercise)
            .unwrap();
        let status = PlaybackStatus {
            is_playing: true,
            position_ms: 400,
            duration_ms: 2_000,
            did_just_finish: false,
        };
        assert!(!slot.apply_status(PlaybackHandle::new(4), status));
        assert!(slot.apply_status(PlaybackHandle::new(5), status));
        assert_eq!(slot.playback().unwrap().status.position_ms, 400);

        let finished = PlaybackStatus {
            is_playing: true,
            position_ms: 2_000,
            duration_ms: 2_000,
            did_just_finish: true,
        };
        slot.apply_status(PlaybackHandle::new(5), finished);
        let status = slot.playback().unwrap().status;
        assert!(!status.is_playing);
        assert_eq!(status.position_ms, 0);
        assert_eq!(status.duration_ms, 2_000);
    }

    #[test]
    fn release_all_empties_slot() {
        let mut slot = MediaSlot::default();
        slot.attach_recording(RecordingHandle::new(9)).unwrap();
        let released = slot.release_all();
        assert_eq!(released.recording, Some(RecordingHandle::new(9)));
        assert!(slot.release_all().is_empty());
    }
}
