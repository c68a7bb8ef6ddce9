use std::sync::Arc;

use practice_core::model::{UserId, UserProfile};
use storage::repository::ProfileRepository;
use tracing::{debug, warn};

/// Read-only access to the signed-in user's profile.
#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(repo: Arc<dyn ProfileRepository>) -> Self {
        Self { repo }
    }

    /// Load the profile for `user`, or the default profile when signed out, when the
    /// document is missing, or when the fetch fails.
    pub async fn load(&self, user: Option<&UserId>) -> UserProfile {
        let Some(user) = user else {
            return UserProfile::default();
        };
        match self.repo.get_profile(user).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                debug!(user = %user, "profile missing, using defaults");
                UserProfile::default()
            }
            Err(err) => {
                warn!(user = %user, error = %err, "profile fetch failed");
                UserProfile::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn known_user_loads_stored_profile() {
        let repo = InMemoryRepository::new();
        let user = UserId::new("u1");
        repo.upsert_profile(
            user.clone(),
            UserProfile {
                username: Some("Amani".into()),
                streak_count: 4,
                xp: 120,
                ..UserProfile::default()
            },
        )
        .unwrap();

        let service = ProfileService::new(Arc::new(repo));
        let profile = service.load(Some(&user)).await;
        assert_eq!(profile.display_name(), "Amani");
        assert_eq!(profile.streak_count, 4);
    }

    #[tokio::test]
    async fn signed_out_or_unknown_user_gets_defaults() {
        let service = ProfileService::new(Arc::new(InMemoryRepository::new()));
        assert_eq!(service.load(None).await, UserProfile::default());

        let profile = service.load(Some(&UserId::new("ghost"))).await;
        assert_eq!(profile.display_name(), "User");
        assert_eq!(profile.xp, 0);
    }
}
