//! Single-threaded event loop around an [`ExerciseSession`].
//!
//! Every input (taps, timer ticks, delayed advances, media status callbacks) is an
//! [`SessionEvent`] on one channel, handled to completion before the next one. Timer
//! and callback events carry the run and position they were issued for, so events
//! that arrive after the session moved on are dropped.

use std::sync::Arc;

use practice_core::model::SessionResults;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::media::{
    MediaLifecycle, PlaybackHandle, PlaybackSource, PlaybackStatus, ReleasedMedia, StatusSink,
};
use super::progress::SessionProgress;
use super::service::{Advance, AdvanceTicket, ExerciseSession, FinishReason, TimerTick};
use super::timers::{TICK_PERIOD, Ticker};
use crate::Clock;
use crate::error::MediaError;
use crate::verification::SpeakingVerifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SelectChoice(String),
    /// Play or pause the current exercise's media.
    TogglePlayback,
    /// Play or pause the learner's finished recording.
    ToggleRecordingPlayback,
    StartRecording,
    StopRecording,
    SubmitSpeaking,
    Advance,
    Restart,
    CountdownTick { run: u32 },
    RecordingTick { run: u32, position: usize },
    AdvanceDue(AdvanceTicket),
    PlaybackStatus {
        handle: PlaybackHandle,
        status: PlaybackStatus,
    },
    Shutdown,
}

/// Receiving half of a driver's event channel, consumed by [`SessionDriver::run`].
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Something the host should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    Presented(SessionProgress),
    Answered {
        correct: bool,
        feedback: &'static str,
    },
    Countdown { remaining: u32 },
    RecordingStarted,
    RecordingElapsed { secs: u32 },
    RecordingStopped { duration_secs: u32 },
    Playback {
        source: PlaybackSource,
        is_playing: bool,
    },
    /// Recording permission was refused; nothing changed.
    PermissionDenied,
    MediaFailed(String),
    VerificationFailed(String),
    Finished {
        results: SessionResults,
        reason: FinishReason,
    },
}

pub struct SessionDriver {
    session: ExerciseSession,
    media: MediaLifecycle,
    verifier: Arc<dyn SpeakingVerifier>,
    clock: Clock,
    events: mpsc::UnboundedSender<SessionEvent>,
    countdown: Ticker,
    recording_clock: Ticker,
    pending_advance: Option<JoinHandle<()>>,
}

impl SessionDriver {
    /// Wrap a started session and arm its countdown. Must be called inside a tokio
    /// runtime. The returned receiver feeds [`SessionDriver::run`].
    pub fn new(
        session: ExerciseSession,
        media: MediaLifecycle,
        verifier: Arc<dyn SpeakingVerifier>,
        clock: Clock,
    ) -> (Self, EventReceiver) {
        let (events, rx) = mpsc::unbounded_channel();
        let mut driver = Self {
            session,
            media,
            verifier,
            clock,
            events,
            countdown: Ticker::idle(),
            recording_clock: Ticker::idle(),
            pending_advance: None,
        };
        driver.arm_countdown();
        (driver, rx)
    }

    /// Sender for host input.
    #[must_use]
    pub fn sender(&self) -> mpsc::UnboundedSender<SessionEvent> {
        self.events.clone()
    }

    #[must_use]
    pub fn session(&self) -> &ExerciseSession {
        &self.session
    }

    /// What the host should show before any event arrives.
    #[must_use]
    pub fn opening_notice(&self) -> SessionNotice {
        match self.session.finish_reason() {
            Some(reason) => self.finished_notice(reason),
            None => SessionNotice::Presented(self.session.progress()),
        }
    }

    /// Process events until `Shutdown` or until the notice receiver goes away.
    /// Returns the session in its final state.
    pub async fn run(
        mut self,
        mut rx: EventReceiver,
        notices: mpsc::UnboundedSender<SessionNotice>,
    ) -> ExerciseSession {
        while let Some(event) = rx.recv().await {
            let stop = event == SessionEvent::Shutdown;
            let mut host_gone = false;
            for notice in self.handle(event).await {
                if notices.send(notice).is_err() {
                    host_gone = true;
                    break;
                }
            }
            if stop || host_gone {
                break;
            }
        }
        self.shutdown().await;
        self.into_session()
    }

    /// Apply one event and report what changed.
    pub async fn handle(&mut self, event: SessionEvent) -> Vec<SessionNotice> {
        let mut notices = Vec::new();
        match event {
            SessionEvent::SelectChoice(choice) => match self.session.select_choice(&choice) {
                Ok(ticket) => {
                    self.push_answered(&mut notices);
                    self.schedule_advance(ticket);
                }
                Err(err) => debug!(error = %err, "choice ignored"),
            },
            SessionEvent::Advance => {
                self.cancel_pending_advance();
                match self.session.advance() {
                    Ok(advance) => self.after_advance(advance, &mut notices).await,
                    Err(err) => debug!(error = %err, "advance ignored"),
                }
            }
            SessionEvent::AdvanceDue(ticket) => {
                self.pending_advance = None;
                match self.session.advance_due(&ticket) {
                    Ok(advance) => self.after_advance(advance, &mut notices).await,
                    Err(err) => debug!(error = %err, "scheduled advance dropped"),
                }
            }
            SessionEvent::CountdownTick { run } => {
                if run == self.session.run() {
                    self.on_countdown_tick(&mut notices).await;
                }
            }
            SessionEvent::RecordingTick { run, position } => {
                if run == self.session.run() && position == self.session.position() {
                    if let Some(secs) = self.session.tick_recording() {
                        notices.push(SessionNotice::RecordingElapsed { secs });
                    }
                }
            }
            SessionEvent::StartRecording => self.start_recording(&mut notices).await,
            SessionEvent::StopRecording => self.stop_recording(&mut notices).await,
            SessionEvent::SubmitSpeaking => self.submit_speaking(&mut notices).await,
            SessionEvent::TogglePlayback => {
                self.toggle_playback(PlaybackSource::Exercise, &mut notices)
                    .await;
            }
            SessionEvent::ToggleRecordingPlayback => {
                self.toggle_playback(PlaybackSource::Recording, &mut notices)
                    .await;
            }
            SessionEvent::PlaybackStatus { handle, status } => {
                if self.session.apply_playback_status(handle, status) && status.did_just_finish {
                    if let Some(playback) = self.session.media().playback() {
                        notices.push(SessionNotice::Playback {
                            source: playback.source,
                            is_playing: false,
                        });
                    }
                }
            }
            SessionEvent::Restart => match self.session.restart() {
                Ok(()) => {
                    self.cancel_pending_advance();
                    self.arm_countdown();
                    info!(run = self.session.run(), "session restarted");
                    notices.push(self.opening_notice());
                }
                Err(err) => debug!(error = %err, "restart ignored"),
            },
            SessionEvent::Shutdown => self.shutdown().await,
        }
        notices
    }

    /// Stop all timers and return every media handle. Safe to call repeatedly.
    pub async fn shutdown(&mut self) {
        self.countdown.stop();
        self.recording_clock.stop();
        self.cancel_pending_advance();
        let released = self.session.release_media();
        self.media.release(released).await;
    }

    #[must_use]
    pub fn into_session(mut self) -> ExerciseSession {
        let config = *self.session.config();
        std::mem::replace(&mut self.session, ExerciseSession::new(config))
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    fn push_answered(&self, notices: &mut Vec<SessionNotice>) {
        if let Some(attempt) = self.session.attempt() {
            notices.push(SessionNotice::Answered {
                correct: attempt.correct,
                feedback: attempt.feedback(),
            });
        }
    }

    async fn after_advance(&mut self, advance: Advance, notices: &mut Vec<SessionNotice>) {
        self.recording_clock.stop();
        let finished = advance.is_finished();
        self.media.release(advance.into_released()).await;

        if finished {
            self.on_finished(FinishReason::Completed, notices);
        } else {
            notices.push(SessionNotice::Presented(self.session.progress()));
        }
    }

    async fn on_countdown_tick(&mut self, notices: &mut Vec<SessionNotice>) {
        match self.session.tick_countdown() {
            TimerTick::Idle => self.countdown.stop(),
            TimerTick::Running { remaining } => {
                notices.push(SessionNotice::Countdown { remaining });
            }
            TimerTick::Expired { released } => {
                self.cancel_pending_advance();
                self.recording_clock.stop();
                self.media.release(released).await;
                notices.push(SessionNotice::Countdown { remaining: 0 });
                self.on_finished(FinishReason::TimedOut, notices);
            }
        }
    }

    fn on_finished(&mut self, reason: FinishReason, notices: &mut Vec<SessionNotice>) {
        self.countdown.stop();
        let results = self.session.results();
        info!(
            ?reason,
            total_score = results.total_score(),
            correct = results.correct(),
            questions = results.question_count(),
            "session finished"
        );
        notices.push(self.finished_notice(reason));
    }

    fn finished_notice(&self, reason: FinishReason) -> SessionNotice {
        SessionNotice::Finished {
            results: *self.session.results(),
            reason,
        }
    }

    //
    // ─── SCHEDULING ────────────────────────────────────────────────────────────
    //

    fn arm_countdown(&mut self) {
        if !self.session.is_in_progress() {
            self.countdown.stop();
            return;
        }
        let events = self.events.clone();
        let run = self.session.run();
        self.countdown.start(TICK_PERIOD, move || {
            events.send(SessionEvent::CountdownTick { run }).is_ok()
        });
    }

    fn arm_recording_clock(&mut self) {
        let events = self.events.clone();
        let run = self.session.run();
        let position = self.session.position();
        self.recording_clock.start(TICK_PERIOD, move || {
            events
                .send(SessionEvent::RecordingTick { run, position })
                .is_ok()
        });
    }

    fn schedule_advance(&mut self, ticket: AdvanceTicket) {
        self.cancel_pending_advance();
        let events = self.events.clone();
        self.pending_advance = Some(tokio::spawn(async move {
            tokio::time::sleep(ticket.delay()).await;
            let _ = events.send(SessionEvent::AdvanceDue(ticket));
        }));
    }

    fn cancel_pending_advance(&mut self) {
        if let Some(task) = self.pending_advance.take() {
            task.abort();
        }
    }

    //
    // ─── MEDIA ─────────────────────────────────────────────────────────────────
    //

    async fn start_recording(&mut self, notices: &mut Vec<SessionNotice>) {
        if !self.session.can_start_recording() {
            debug!("recording start ignored");
            return;
        }
        let backend = Arc::clone(self.media.backend());

        match backend.request_recording_permission().await {
            Ok(true) => {}
            Ok(false) | Err(MediaError::PermissionDenied) => {
                notices.push(SessionNotice::PermissionDenied);
                return;
            }
            Err(err) => {
                warn!(error = %err, "recording permission request failed");
                notices.push(SessionNotice::MediaFailed(err.to_string()));
                return;
            }
        }

        let handle = match backend.start_recording().await {
            Ok(handle) => handle,
            Err(err) => {
                warn!(error = %err, "failed to start recording");
                notices.push(SessionNotice::MediaFailed(err.to_string()));
                return;
            }
        };

        match self.session.begin_recording(handle, self.clock.now()) {
            Ok(evicted) => {
                self.media
                    .release(ReleasedMedia {
                        playback: evicted,
                        recording: None,
                    })
                    .await;
                self.arm_recording_clock();
                notices.push(SessionNotice::RecordingStarted);
            }
            Err(err) => {
                debug!(error = %err, "recording rejected");
                self.media
                    .release(ReleasedMedia {
                        playback: None,
                        recording: Some(handle),
                    })
                    .await;
            }
        }
    }

    async fn stop_recording(&mut self, notices: &mut Vec<SessionNotice>) {
        let Some(handle) = self.session.media().recording() else {
            debug!("no recording to stop");
            return;
        };
        let uri = match self.media.backend().stop_recording(handle).await {
            Ok(uri) => uri,
            Err(err) => {
                warn!(error = %err, "failed to stop recording");
                notices.push(SessionNotice::MediaFailed(err.to_string()));
                return;
            }
        };
        self.recording_clock.stop();
        match self.session.finish_recording(handle, uri) {
            Ok(recording) => {
                let duration_secs = recording.duration_secs().unwrap_or_default();
                let wall_secs = self.clock.seconds_since(recording.started_at());
                debug!(duration_secs, wall_secs, "recording finished");
                notices.push(SessionNotice::RecordingStopped { duration_secs });
            }
            Err(err) => debug!(error = %err, "recording stop ignored"),
        }
    }

    async fn submit_speaking(&mut self, notices: &mut Vec<SessionNotice>) {
        let submission = match self.session.submit_speaking_attempt() {
            Ok(submission) => submission,
            Err(err) => {
                debug!(error = %err, "speaking submission ignored");
                return;
            }
        };
        let verdict = self
            .verifier
            .verify(submission.exercise(), submission.recording())
            .await;

        match verdict {
            Ok(correct) => match self.session.record_speaking_verdict(&submission, correct) {
                Ok(ticket) => {
                    self.push_answered(notices);
                    self.schedule_advance(ticket);
                }
                Err(err) => debug!(error = %err, "verdict dropped"),
            },
            Err(err) => {
                warn!(error = %err, "speaking verification failed");
                if self.session.cancel_speaking_submission(&submission).is_ok() {
                    notices.push(SessionNotice::VerificationFailed(err.to_string()));
                }
            }
        }
    }

    async fn toggle_playback(&mut self, source: PlaybackSource, notices: &mut Vec<SessionNotice>) {
        let current = self
            .session
            .media()
            .playback()
            .filter(|playback| playback.source == source)
            .map(|playback| (playback.handle, playback.status.is_playing));

        if let Some((handle, is_playing)) = current {
            let backend = self.media.backend();
            let result = if is_playing {
                backend.pause(handle).await
            } else {
                backend.resume(handle).await
            };
            match result {
                Ok(()) => {
                    self.session.set_playing(handle, !is_playing);
                    notices.push(SessionNotice::Playback {
                        source,
                        is_playing: !is_playing,
                    });
                }
                Err(err) => {
                    warn!(error = %err, "playback toggle failed");
                    notices.push(SessionNotice::MediaFailed(err.to_string()));
                }
            }
            return;
        }

        if self.session.media().is_recording() {
            debug!("playback ignored while recording");
            return;
        }
        let uri = match self.session.playback_uri(source) {
            Ok(uri) => uri,
            Err(err) => {
                debug!(error = %err, "nothing to play");
                return;
            }
        };

        let handle = match self
            .media
            .backend()
            .create_and_play(&uri, self.status_sink())
            .await
        {
            Ok(handle) => handle,
            Err(err) => {
                warn!(%uri, error = %err, "failed to start playback");
                notices.push(SessionNotice::MediaFailed(err.to_string()));
                return;
            }
        };

        match self.session.attach_playback(handle, source) {
            Ok(previous) => {
                self.media
                    .release(ReleasedMedia {
                        playback: previous,
                        recording: None,
                    })
                    .await;
                notices.push(SessionNotice::Playback {
                    source,
                    is_playing: true,
                });
            }
            Err(err) => {
                debug!(error = %err, "playback rejected");
                self.media
                    .release(ReleasedMedia {
                        playback: Some(handle),
                        recording: None,
                    })
                    .await;
            }
        }
    }

    fn status_sink(&self) -> StatusSink {
        let events = self.events.clone();
        Arc::new(move |handle, status| {
            let _ = events.send(SessionEvent::PlaybackStatus { handle, status });
        })
    }
}

impl Drop for SessionDriver {
    fn drop(&mut self) {
        self.cancel_pending_advance();
        if self.session.media().playback().is_some() || self.session.media().is_recording() {
            warn!("session driver dropped without shutdown; media handles leaked");
        }
    }
}
