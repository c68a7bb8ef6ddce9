use std::sync::Arc;

use practice_core::model::{UserId, UserProfile};
use services::session::{EventReceiver, ExerciseSession};
use services::{
    Clock, LessonService, MediaLifecycle, ProfileService, SessionDriver, SessionLoopService,
    SpeakingVerifier,
};

/// What a host application hands to the view layer.
pub trait UiApp: Send + Sync {
    fn user_id(&self) -> Option<UserId>;
    fn clock(&self) -> Clock;

    fn session_loop(&self) -> Arc<SessionLoopService>;
    fn lessons(&self) -> Arc<LessonService>;
    fn profiles(&self) -> Arc<ProfileService>;
    fn verifier(&self) -> Arc<dyn SpeakingVerifier>;
    fn media(&self) -> MediaLifecycle;
}

/// Explicit state shared by every screen: signed-in user, their profile, and the
/// services. Passed by reference instead of living in globals.
#[derive(Clone)]
pub struct AppContext {
    user_id: Option<UserId>,
    profile: UserProfile,
    clock: Clock,

    session_loop: Arc<SessionLoopService>,
    lessons: Arc<LessonService>,
    profiles: Arc<ProfileService>,
    verifier: Arc<dyn SpeakingVerifier>,
    media: MediaLifecycle,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            user_id: app.user_id(),
            profile: UserProfile::default(),
            clock: app.clock(),
            session_loop: app.session_loop(),
            lessons: app.lessons(),
            profiles: app.profiles(),
            verifier: app.verifier(),
            media: app.media(),
        }
    }

    /// Re-read the profile; failures leave the default profile in place.
    pub async fn refresh_profile(&mut self) -> &UserProfile {
        self.profile = self.profiles.load(self.user_id.as_ref()).await;
        &self.profile
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    #[must_use]
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }

    #[must_use]
    pub fn lessons(&self) -> Arc<LessonService> {
        Arc::clone(&self.lessons)
    }

    /// Wrap a started session in a driver wired to this context's media backend,
    /// verifier and clock.
    pub fn drive(
        &self,
        session: ExerciseSession,
    ) -> (SessionDriver, EventReceiver) {
        SessionDriver::new(
            session,
            self.media.clone(),
            Arc::clone(&self.verifier),
            self.clock,
        )
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
