use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::lesson_service::LessonService;
use crate::profile_service::ProfileService;
use crate::sessions::{SessionConfig, SessionLoopService};
use crate::verification::{AcceptAllVerifier, SpeakingVerifier};

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    session_loop: Arc<SessionLoopService>,
    lessons: Arc<LessonService>,
    profiles: Arc<ProfileService>,
    verifier: Arc<dyn SpeakingVerifier>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock, config: SessionConfig) -> Self {
        let session_loop = Arc::new(
            SessionLoopService::new(clock, Arc::clone(&storage.exercises)).with_config(config),
        );
        let lessons = Arc::new(LessonService::new(Arc::clone(&storage.lessons)));
        let profiles = Arc::new(ProfileService::new(Arc::clone(&storage.profiles)));

        Self {
            clock,
            session_loop,
            lessons,
            profiles,
            verifier: Arc::new(AcceptAllVerifier),
        }
    }

    /// Replace the default accept-all speaking verifier.
    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn SpeakingVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }

    #[must_use]
    pub fn lessons(&self) -> Arc<LessonService> {
        Arc::clone(&self.lessons)
    }

    #[must_use]
    pub fn profiles(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profiles)
    }

    #[must_use]
    pub fn verifier(&self) -> Arc<dyn SpeakingVerifier> {
        Arc::clone(&self.verifier)
    }
}
