use crate::model::media::MediaUri;

pub const DEFAULT_DISPLAY_NAME: &str = "User";

/// Read-only user profile consumed for display (greeting, streak, XP).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub username: Option<String>,
    pub avatar: Option<MediaUri>,
    pub streak_count: u32,
    pub xp: u32,
}

impl UserProfile {
    /// Username, or the generic fallback when the profile has none.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_uses_fallback_name() {
        let profile = UserProfile::default();
        assert_eq!(profile.display_name(), "User");
        assert_eq!(profile.streak_count, 0);
        assert_eq!(profile.xp, 0);
    }

    #[test]
    fn blank_username_falls_back() {
        let profile = UserProfile {
            username: Some("  ".into()),
            ..UserProfile::default()
        };
        assert_eq!(profile.display_name(), "User");
    }
}
