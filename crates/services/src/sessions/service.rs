use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

use practice_core::model::{Category, Exercise, MediaUri, SessionResults};

use super::media::{
    MediaSlot, PlaybackHandle, PlaybackSource, PlaybackStatus, RecordingHandle, ReleasedMedia,
};
use super::progress::SessionProgress;
use super::timers::{Countdown, CountdownTick, ElapsedClock};
use crate::error::SessionError;

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Knobs fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub countdown_secs: u32,
    pub advance_delay: Duration,
    /// How many exercises of each category a mixed quiz pulls.
    pub quiz_per_category: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 20 * 60,
            advance_delay: Duration::from_secs(2),
            quiz_per_category: 5,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_countdown_secs(mut self, secs: u32) -> Self {
        self.countdown_secs = secs;
        self
    }

    #[must_use]
    pub fn with_advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay = delay;
        self
    }

    #[must_use]
    pub fn with_quiz_per_category(mut self, count: u32) -> Self {
        self.quiz_per_category = count;
        self
    }
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionPhase {
    /// Waiting for a choice or a recording.
    Presented,
    /// A speaking attempt is with the verifier.
    Submitting,
    /// Verdict recorded; waiting for the advance.
    Answered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress(QuestionPhase),
    Finished(FinishReason),
}

impl SessionState {
    fn label(self) -> &'static str {
        match self {
            SessionState::NotStarted => "not started",
            SessionState::InProgress(QuestionPhase::Presented) => "presenting a question",
            SessionState::InProgress(QuestionPhase::Submitting) => "submitting an attempt",
            SessionState::InProgress(QuestionPhase::Answered) => "showing feedback",
            SessionState::Finished(_) => "finished",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Completed,
    TimedOut,
    /// Started with no exercises.
    Empty,
}

//
// ─── PER-QUESTION STATE ────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Choice(String),
    Recording(MediaUri),
}

/// The learner's answer to the current question and its verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerAttempt {
    pub response: Response,
    pub correct: bool,
}

impl AnswerAttempt {
    #[must_use]
    pub fn feedback(&self) -> &'static str {
        if self.correct {
            "Correct! ✅"
        } else {
            "Incorrect ❌"
        }
    }

    #[must_use]
    pub fn selected_choice(&self) -> Option<&str> {
        match &self.response {
            Response::Choice(choice) => Some(choice),
            Response::Recording(_) => None,
        }
    }
}

/// The speaking capture for the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    started_at: DateTime<Utc>,
    clock: ElapsedClock,
    duration_secs: Option<u32>,
    uri: Option<MediaUri>,
}

impl Recording {
    fn begin(started_at: DateTime<Utc>) -> Self {
        let mut clock = ElapsedClock::default();
        clock.start();
        Self {
            started_at,
            clock,
            duration_secs: None,
            uri: None,
        }
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Seconds counted while recording; zero once stopped.
    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.clock.elapsed()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.clock.is_running()
    }

    /// Length of the finished recording.
    #[must_use]
    pub fn duration_secs(&self) -> Option<u32> {
        self.duration_secs
    }

    #[must_use]
    pub fn uri(&self) -> Option<&MediaUri> {
        self.uri.as_ref()
    }
}

/// Scheduled automatic advance. Carries the question it was issued for so a late
/// delivery can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceTicket {
    run: u32,
    position: usize,
    delay: Duration,
}

impl AdvanceTicket {
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }
}

/// A speaking attempt handed to the verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakingSubmission {
    run: u32,
    position: usize,
    exercise: Exercise,
    recording: MediaUri,
}

impl SpeakingSubmission {
    #[must_use]
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    #[must_use]
    pub fn recording(&self) -> &MediaUri {
        &self.recording
    }
}

/// Result of leaving the current question.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "released handles must be returned to the media backend"]
pub enum Advance {
    Next {
        position: usize,
        released: ReleasedMedia,
    },
    Finished {
        released: ReleasedMedia,
    },
}

impl Advance {
    pub fn into_released(self) -> ReleasedMedia {
        match self {
            Advance::Next { released, .. } | Advance::Finished { released } => released,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Advance::Finished { .. })
    }
}

/// Outcome of one countdown tick.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an expiry releases media handles"]
pub enum TimerTick {
    Idle,
    Running { remaining: u32 },
    Expired { released: ReleasedMedia },
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One run through an ordered exercise list, from start to finish or timeout.
///
/// The session never performs I/O. Operations that give up media handles return
/// them; timers are advanced by explicit ticks; the automatic advance is an
/// [`AdvanceTicket`] the caller schedules and hands back.
pub struct ExerciseSession {
    config: SessionConfig,
    exercises: Vec<Exercise>,
    position: usize,
    state: SessionState,
    run: u32,
    /// Questions with a recorded verdict in this run.
    answered: usize,
    results: SessionResults,
    countdown: Countdown,
    attempt: Option<AnswerAttempt>,
    recording: Option<Recording>,
    media: MediaSlot,
}

impl ExerciseSession {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            exercises: Vec::new(),
            position: 0,
            state: SessionState::NotStarted,
            run: 0,
            answered: 0,
            results: SessionResults::default(),
            countdown: Countdown::new(config.countdown_secs),
            attempt: None,
            recording: None,
            media: MediaSlot::default(),
        }
    }

    /// Begin the session with an already ordered exercise list.
    ///
    /// An empty list finishes immediately with zero results, and a zero countdown
    /// budget finishes immediately as timed out.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the session is `NotStarted`.
    pub fn start(&mut self, exercises: Vec<Exercise>) -> Result<(), SessionError> {
        if self.state != SessionState::NotStarted {
            return Err(self.reject("start"));
        }
        self.exercises = exercises;
        self.begin_run();
        Ok(())
    }

    /// Run the same exercises again, in the same order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the session is `Finished`.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        if !self.is_finished() {
            return Err(self.reject("restart"));
        }
        self.begin_run();
        Ok(())
    }

    fn begin_run(&mut self) {
        self.run = self.run.wrapping_add(1);
        self.position = 0;
        self.answered = 0;
        self.attempt = None;
        self.recording = None;
        self.results = SessionResults::new(u32::try_from(self.exercises.len()).unwrap_or(u32::MAX));
        self.countdown = Countdown::new(self.config.countdown_secs);

        if self.exercises.is_empty() {
            self.state = SessionState::Finished(FinishReason::Empty);
            return;
        }
        if self.countdown.budget() == 0 {
            self.state = SessionState::Finished(FinishReason::TimedOut);
            return;
        }
        self.countdown.start();
        self.state = SessionState::InProgress(QuestionPhase::Presented);
    }

    /// Answer a Writing or Listening question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Presented` (double taps land
    /// here) and `SessionError::NotChoiceBased` for speaking questions.
    pub fn select_choice(&mut self, choice: &str) -> Result<AdvanceTicket, SessionError> {
        self.require_phase(QuestionPhase::Presented, "select a choice")?;
        let exercise = self.current_exercise().ok_or(SessionError::NoMedia)?;
        if !exercise.category().is_choice_based() {
            return Err(SessionError::NotChoiceBased);
        }
        let correct = exercise.is_correct(choice);
        let category = exercise.category();

        Ok(self.record_verdict(Response::Choice(choice.to_string()), category, correct))
    }

    /// Hand the finished recording of a speaking question to verification.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Presented`,
    /// `SessionError::NotSpeaking` for other categories and
    /// `SessionError::NoRecording` when no recording has been finalized.
    pub fn submit_speaking_attempt(&mut self) -> Result<SpeakingSubmission, SessionError> {
        self.require_phase(QuestionPhase::Presented, "submit a recording")?;
        let exercise = self.current_exercise().ok_or(SessionError::NoRecording)?;
        if exercise.category() != Category::Speaking {
            return Err(SessionError::NotSpeaking);
        }
        let recording = self
            .recording
            .as_ref()
            .and_then(Recording::uri)
            .cloned()
            .ok_or(SessionError::NoRecording)?;

        let submission = SpeakingSubmission {
            run: self.run,
            position: self.position,
            exercise: exercise.clone(),
            recording,
        };
        self.state = SessionState::InProgress(QuestionPhase::Submitting);
        Ok(submission)
    }

    /// Apply the verifier's verdict for `submission`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StaleCallback` if the session moved past the submission.
    pub fn record_speaking_verdict(
        &mut self,
        submission: &SpeakingSubmission,
        correct: bool,
    ) -> Result<AdvanceTicket, SessionError> {
        self.require_pending(submission)?;
        Ok(self.record_verdict(
            Response::Recording(submission.recording.clone()),
            Category::Speaking,
            correct,
        ))
    }

    /// Verification failed: return to `Presented` so the learner can resubmit.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StaleCallback` if the session moved past the submission.
    pub fn cancel_speaking_submission(
        &mut self,
        submission: &SpeakingSubmission,
    ) -> Result<(), SessionError> {
        self.require_pending(submission)?;
        self.state = SessionState::InProgress(QuestionPhase::Presented);
        Ok(())
    }

    fn require_pending(&self, submission: &SpeakingSubmission) -> Result<(), SessionError> {
        if submission.run != self.run
            || submission.position != self.position
            || self.state != SessionState::InProgress(QuestionPhase::Submitting)
        {
            return Err(SessionError::StaleCallback {
                run: submission.run,
                position: submission.position,
            });
        }
        Ok(())
    }

    fn record_verdict(
        &mut self,
        response: Response,
        category: Category,
        correct: bool,
    ) -> AdvanceTicket {
        if correct {
            self.results.record_correct(category);
        }
        self.answered += 1;
        self.attempt = Some(AnswerAttempt { response, correct });
        self.state = SessionState::InProgress(QuestionPhase::Answered);
        AdvanceTicket {
            run: self.run,
            position: self.position,
            delay: self.config.advance_delay,
        }
    }

    /// Leave the answered question: move on, or finish after the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the question is `Answered`,
    /// so a second call for the same question is rejected.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        self.require_phase(QuestionPhase::Answered, "advance")?;
        let released = self.clear_question();

        if self.position + 1 >= self.exercises.len() {
            self.finish(FinishReason::Completed);
            return Ok(Advance::Finished { released });
        }

        self.position += 1;
        self.state = SessionState::InProgress(QuestionPhase::Presented);
        Ok(Advance::Next {
            position: self.position,
            released,
        })
    }

    /// Advance on behalf of a scheduled ticket.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StaleCallback` if the ticket belongs to an earlier
    /// question or run, or if the question was already advanced manually.
    pub fn advance_due(&mut self, ticket: &AdvanceTicket) -> Result<Advance, SessionError> {
        if ticket.run != self.run
            || ticket.position != self.position
            || self.state != SessionState::InProgress(QuestionPhase::Answered)
        {
            return Err(SessionError::StaleCallback {
                run: ticket.run,
                position: ticket.position,
            });
        }
        self.advance()
    }

    /// Countdown reached zero: finish now, keeping the score so far.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the session is in progress.
    pub fn expire_by_timeout(&mut self) -> Result<ReleasedMedia, SessionError> {
        if !self.is_in_progress() {
            return Err(self.reject("expire"));
        }
        let released = self.clear_question();
        self.finish(FinishReason::TimedOut);
        Ok(released)
    }

    /// Advance the session countdown by one second.
    pub fn tick_countdown(&mut self) -> TimerTick {
        if !self.is_in_progress() {
            self.countdown.stop();
            return TimerTick::Idle;
        }
        match self.countdown.tick() {
            CountdownTick::Idle => TimerTick::Idle,
            CountdownTick::Running { remaining } => TimerTick::Running { remaining },
            CountdownTick::Expired => {
                let released = self.clear_question();
                self.finish(FinishReason::TimedOut);
                TimerTick::Expired { released }
            }
        }
    }

    fn finish(&mut self, reason: FinishReason) {
        self.countdown.stop();
        self.state = SessionState::Finished(reason);
    }

    /// Drop per-question state and move the media handles out.
    fn clear_question(&mut self) -> ReleasedMedia {
        self.attempt = None;
        self.recording = None;
        self.media.release_all()
    }

    //
    // ─── RECORDING ─────────────────────────────────────────────────────────────
    //

    /// Whether a new recording may start for the current question.
    #[must_use]
    pub fn can_start_recording(&self) -> bool {
        self.state == SessionState::InProgress(QuestionPhase::Presented)
            && self
                .current_exercise()
                .is_some_and(|e| e.category() == Category::Speaking)
            && !self.media.is_recording()
    }

    /// Attach a freshly started recording. Any previous take for this question is
    /// discarded. Returns the playback handle evicted by the recording.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyRecording` for a concurrent start, or the
    /// errors of [`ExerciseSession::can_start_recording`]'s conditions.
    pub fn begin_recording(
        &mut self,
        handle: RecordingHandle,
        started_at: DateTime<Utc>,
    ) -> Result<Option<PlaybackHandle>, SessionError> {
        self.require_phase(QuestionPhase::Presented, "start recording")?;
        if self
            .current_exercise()
            .is_none_or(|e| e.category() != Category::Speaking)
        {
            return Err(SessionError::NotSpeaking);
        }
        let evicted = self.media.attach_recording(handle)?;
        self.recording = Some(Recording::begin(started_at));
        Ok(evicted)
    }

    /// Record the stopped capture's URI.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRecording` if `handle` is not the active recording.
    pub fn finish_recording(
        &mut self,
        handle: RecordingHandle,
        uri: MediaUri,
    ) -> Result<&Recording, SessionError> {
        self.media.detach_recording(handle)?;
        let recording = self.recording.as_mut().ok_or(SessionError::NotRecording)?;
        recording.duration_secs = Some(recording.clock.stop());
        recording.uri = Some(uri);
        Ok(recording)
    }

    /// Advance the recording clock by one second. `None` when nothing is recording.
    pub fn tick_recording(&mut self) -> Option<u32> {
        self.recording.as_mut()?.clock.tick()
    }

    //
    // ─── PLAYBACK ──────────────────────────────────────────────────────────────
    //

    /// What a playback request for `source` would play on the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoMedia` when there is nothing to play.
    pub fn playback_uri(&self, source: PlaybackSource) -> Result<MediaUri, SessionError> {
        if !self.is_in_progress() {
            return Err(self.reject("play audio"));
        }
        let uri = match source {
            PlaybackSource::Exercise => self.current_exercise().and_then(Exercise::media),
            PlaybackSource::Recording => self.recording.as_ref().and_then(Recording::uri),
        };
        uri.cloned().ok_or(SessionError::NoMedia)
    }

    /// Install a playback handle for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` when not in progress and
    /// `SessionError::AlreadyRecording` while recording.
    pub fn attach_playback(
        &mut self,
        handle: PlaybackHandle,
        source: PlaybackSource,
    ) -> Result<Option<PlaybackHandle>, SessionError> {
        if !self.is_in_progress() {
            return Err(self.reject("play audio"));
        }
        self.media.attach_playback(handle, source)
    }

    /// Apply a device status callback. Stale handles are ignored.
    pub fn apply_playback_status(&mut self, handle: PlaybackHandle, status: PlaybackStatus) -> bool {
        self.media.apply_status(handle, status)
    }

    pub fn set_playing(&mut self, handle: PlaybackHandle, is_playing: bool) {
        self.media.set_playing(handle, is_playing);
    }

    /// Move every handle out without changing the session state (view teardown).
    pub fn release_media(&mut self) -> ReleasedMedia {
        if self.recording.as_ref().is_some_and(Recording::is_active) {
            self.recording = None;
        }
        self.media.release_all()
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Incremented by every start/restart; stamps timer and callback events.
    #[must_use]
    pub fn run(&self) -> u32 {
        self.run
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn current_exercise(&self) -> Option<&Exercise> {
        if self.is_in_progress() {
            self.exercises.get(self.position)
        } else {
            None
        }
    }

    #[must_use]
    pub fn results(&self) -> &SessionResults {
        &self.results
    }

    #[must_use]
    pub fn attempt(&self) -> Option<&AnswerAttempt> {
        self.attempt.as_ref()
    }

    #[must_use]
    pub fn recording(&self) -> Option<&Recording> {
        self.recording.as_ref()
    }

    #[must_use]
    pub fn media(&self) -> &MediaSlot {
        &self.media
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining()
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        matches!(self.state, SessionState::InProgress(_))
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished(_))
    }

    #[must_use]
    pub fn finish_reason(&self) -> Option<FinishReason> {
        match self.state {
            SessionState::Finished(reason) => Some(reason),
            _ => None,
        }
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.exercises.len(),
            position: self.position,
            answered: self.answered,
            remaining_secs: self.countdown.remaining(),
            is_complete: self.is_finished(),
        }
    }

    fn require_phase(&self, phase: QuestionPhase, action: &'static str) -> Result<(), SessionError> {
        if self.state == SessionState::InProgress(phase) {
            Ok(())
        } else {
            Err(self.reject(action))
        }
    }

    fn reject(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            action,
            state: self.state.label(),
        }
    }
}

impl fmt::Debug for ExerciseSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExerciseSession")
            .field("state", &self.state)
            .field("run", &self.run)
            .field("exercises_len", &self.exercises.len())
            .field("position", &self.position)
            .field("total_score", &self.results.total_score())
            .field("remaining_secs", &self.countdown.remaining())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
