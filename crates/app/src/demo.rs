//! Built-in content for `--offline` runs and for when no content space is configured.

use practice_core::model::{
    Category, ExerciseDraft, LessonDraft, MediaUri, UserId, UserProfile,
};
use storage::repository::{InMemoryRepository, StorageError};

pub const DEMO_USER: &str = "demo";

struct Choice {
    id: &'static str,
    category: Category,
    lesson: &'static str,
    prompt: &'static str,
    answer: &'static str,
    choices: &'static [&'static str],
    media: Option<&'static str>,
}

const EXERCISES: &[Choice] = &[
    Choice {
        id: "w-habari",
        category: Category::Writing,
        lesson: "Greetings",
        prompt: "How do you say \"Good morning\"?",
        answer: "Habari za asubuhi",
        choices: &["Habari za asubuhi", "Usiku mwema", "Kwaheri"],
        media: None,
    },
    Choice {
        id: "w-asante",
        category: Category::Writing,
        lesson: "Greetings",
        prompt: "Translate \"Thank you\"",
        answer: "Asante",
        choices: &["Karibu", "Asante", "Pole"],
        media: None,
    },
    Choice {
        id: "w-maji",
        category: Category::Writing,
        lesson: "Food & Drink",
        prompt: "Which word means \"water\"?",
        answer: "Maji",
        choices: &["Chai", "Maji", "Maziwa"],
        media: None,
    },
    Choice {
        id: "s-jambo",
        category: Category::Speaking,
        lesson: "Greetings",
        prompt: "Say \"Jambo, habari gani?\"",
        answer: "",
        choices: &[],
        media: Some("//assets.example.net/audio/jambo.mp3"),
    },
    Choice {
        id: "s-jina",
        category: Category::Speaking,
        lesson: "Introductions",
        prompt: "Say \"Jina langu ni ...\"",
        answer: "",
        choices: &[],
        media: Some("//assets.example.net/audio/jina-langu.mp3"),
    },
    Choice {
        id: "l-kwaheri",
        category: Category::Listening,
        lesson: "Greetings",
        prompt: "What did you hear?",
        answer: "Kwaheri",
        choices: &["Karibu", "Kwaheri", "Samahani"],
        media: Some("//assets.example.net/audio/kwaheri.mp3"),
    },
    Choice {
        id: "l-tatu",
        category: Category::Listening,
        lesson: "Numbers",
        prompt: "Which number was spoken?",
        answer: "Tatu",
        choices: &["Moja", "Mbili", "Tatu"],
        media: Some("//assets.example.net/audio/tatu.mp3"),
    },
];

/// Repository preloaded with a handful of exercises, lessons and a demo profile.
///
/// # Errors
///
/// Returns `StorageError` if the in-memory store rejects a record.
pub fn repository() -> Result<InMemoryRepository, StorageError> {
    let repo = InMemoryRepository::new();

    for item in EXERCISES {
        let draft = ExerciseDraft {
            lesson: Some(item.lesson.to_string()),
            prompt: Some(item.prompt.to_string()),
            correct_answer: Some(item.answer.to_string()),
            choices: item.choices.iter().map(ToString::to_string).collect(),
            media: item.media.and_then(|raw| MediaUri::parse(raw).ok()),
            ..ExerciseDraft::new(item.id, item.category)
        };
        let exercise = draft
            .validate()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        repo.push_exercise(exercise)?;
    }

    let lessons = [
        LessonDraft {
            id: "greetings".into(),
            title: Some("Greetings".into()),
            lesson_type: Some("Speaking".into()),
            content: Some(
                "## Salamu\n\nSwahili greetings are a conversation.\n\n\
                 - **Jambo** - hello\n- **Habari gani?** - how are you?\n- **Nzuri** - fine"
                    .into(),
            ),
            audio: MediaUri::parse("//assets.example.net/audio/salamu.mp3").ok(),
            ..LessonDraft::default()
        },
        LessonDraft {
            id: "numbers".into(),
            title: Some("Numbers 1-10".into()),
            lesson_type: Some("Listening".into()),
            content: Some("Moja, mbili, tatu, nne, tano, sita, saba, nane, tisa, kumi.".into()),
            ..LessonDraft::default()
        },
        LessonDraft {
            id: "food".into(),
            title: Some("Food & Drink".into()),
            lesson_type: Some("Writing".into()),
            level: Some("Elementary".into()),
            ..LessonDraft::default()
        },
    ];
    for draft in lessons {
        let lesson = draft
            .validate()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        repo.push_lesson(lesson)?;
    }

    repo.upsert_profile(
        UserId::new(DEMO_USER),
        UserProfile {
            username: Some("Msafiri".into()),
            avatar: None,
            streak_count: 3,
            xp: 120,
        },
    )?;

    Ok(repo)
}
