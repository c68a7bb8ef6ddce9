use practice_core::model::{Category, UserProfile};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AvatarVm {
    Image(String),
    /// First letter of the display name when no photo is set.
    Initial(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileHeaderVm {
    pub greeting: String,
    pub streak_label: String,
    pub xp_label: String,
    pub avatar: AvatarVm,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTileVm {
    pub category: Category,
    pub title: &'static str,
    pub subtitle: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HomeVm {
    pub header: ProfileHeaderVm,
    pub tiles: Vec<CategoryTileVm>,
}

#[must_use]
pub fn map_profile_header(profile: &UserProfile) -> ProfileHeaderVm {
    let name = profile.display_name();
    let avatar = profile.avatar.as_ref().map_or_else(
        || {
            AvatarVm::Initial(
                name.chars()
                    .next()
                    .map_or_else(|| "?".to_string(), |ch| ch.to_uppercase().to_string()),
            )
        },
        |uri| AvatarVm::Image(uri.as_str().to_string()),
    );

    let streak_label = if profile.streak_count == 1 {
        "1 day streak".to_string()
    } else {
        format!("{} day streak", profile.streak_count)
    };

    ProfileHeaderVm {
        greeting: format!("Hello {name}"),
        streak_label,
        xp_label: format!("{} XP", profile.xp),
        avatar,
    }
}

#[must_use]
pub fn map_home(profile: &UserProfile) -> HomeVm {
    let tiles = Category::ALL
        .into_iter()
        .map(|category| CategoryTileVm {
            category,
            title: category.as_str(),
            subtitle: match category {
                Category::Writing => "Pick the right translation",
                Category::Speaking => "Record yourself saying it",
                Category::Listening => "Listen and choose",
            },
        })
        .collect();

    HomeVm {
        header: map_profile_header(profile),
        tiles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use practice_core::model::MediaUri;

    #[test]
    fn signed_out_header_uses_fallbacks() {
        let header = map_profile_header(&UserProfile::default());
        assert_eq!(header.greeting, "Hello User");
        assert_eq!(header.streak_label, "0 day streak");
        assert_eq!(header.xp_label, "0 XP");
        assert_eq!(header.avatar, AvatarVm::Initial("U".into()));
    }

    #[test]
    fn avatar_uri_is_used_when_present() {
        let profile = UserProfile {
            username: Some("zawadi".into()),
            avatar: Some(MediaUri::parse("//img.example.net/z.png").unwrap()),
            streak_count: 1,
            xp: 55,
        };
        let home = map_home(&profile);
        assert_eq!(home.header.greeting, "Hello zawadi");
        assert_eq!(home.header.streak_label, "1 day streak");
        assert_eq!(
            home.header.avatar,
            AvatarVm::Image("https://img.example.net/z.png".into())
        );
        assert_eq!(home.tiles.len(), 3);
        assert_eq!(home.tiles[0].title, "Writing");
    }
}
