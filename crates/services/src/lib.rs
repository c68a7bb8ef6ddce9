#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod lesson_service;
pub mod profile_service;
pub mod sessions;
pub mod verification;

pub use practice_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{LessonServiceError, MediaError, SessionError, VerificationError};
pub use lesson_service::LessonService;
pub use profile_service::ProfileService;
pub use verification::{AcceptAllVerifier, SpeakingVerifier};

pub use sessions::{
    ExerciseSession, MediaBackend, MediaLifecycle, SessionConfig, SessionDriver, SessionEvent,
    SessionLoopService, SessionNotice,
};
