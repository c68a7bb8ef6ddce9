mod driver;
mod media;
mod progress;
mod service;
mod timers;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::{MediaError, SessionError};
pub use driver::{EventReceiver, SessionDriver, SessionEvent, SessionNotice};
pub use media::{
    MediaBackend, MediaLifecycle, MediaSlot, Playback, PlaybackHandle, PlaybackSource,
    PlaybackStatus, RecordingHandle, ReleasedMedia, StatusSink,
};
pub use progress::SessionProgress;
pub use service::{
    Advance, AdvanceTicket, AnswerAttempt, ExerciseSession, FinishReason, QuestionPhase,
    Recording, Response, SessionConfig, SessionState, SpeakingSubmission, TimerTick,
};
pub use timers::{Countdown, CountdownTick, ElapsedClock, TICK_PERIOD, Ticker};
pub use workflow::{SessionLoopService, shuffle_once};
