//! Mapping from content-delivery JSON into domain records.
//!
//! Entries carry loosely typed `fields`. Asset references come in two shapes:
//! already-resolved assets (`{ "fields": { "file": { "url": .. } } }`) and links
//! (`{ "sys": { "id": .. } }`) that must be looked up in `includes.Asset`.

use std::collections::HashMap;

use practice_core::model::{Category, Exercise, ExerciseDraft, Lesson, LessonDraft, MediaUri};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EntryCollection {
    #[serde(default)]
    pub items: Vec<Entry>,
    #[serde(default)]
    pub includes: Includes,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Includes {
    #[serde(default, rename = "Asset")]
    pub assets: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Entry {
    pub sys: Sys,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Sys {
    pub id: String,
}

/// Asset id → absolute file URL.
pub(crate) struct AssetIndex(HashMap<String, MediaUri>);

impl AssetIndex {
    pub fn new(includes: &Includes) -> Self {
        let index = includes
            .assets
            .iter()
            .filter_map(|asset| {
                let uri = file_url(&asset.fields)?;
                Some((asset.sys.id.clone(), uri))
            })
            .collect();
        Self(index)
    }

    /// Resolve the first asset referenced by an entry field.
    fn resolve(&self, value: Option<&Value>) -> Option<MediaUri> {
        let first = match value? {
            Value::Array(items) => items.first()?,
            other => other,
        };
        let object = first.as_object()?;

        if let Some(fields) = object.get("fields").and_then(Value::as_object) {
            if let Some(uri) = file_url(fields) {
                return Some(uri);
            }
        }

        let id = object.get("sys")?.get("id")?.as_str()?;
        self.0.get(id).cloned()
    }
}

fn file_url(fields: &Map<String, Value>) -> Option<MediaUri> {
    let raw = fields.get("file")?.get("url")?.as_str()?;
    match MediaUri::parse(raw) {
        Ok(uri) => Some(uri),
        Err(err) => {
            warn!(url = raw, error = %err, "ignoring unusable asset url");
            None
        }
    }
}

/// Coerce a scalar field to text the way the provider's editors expect.
fn text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_list(fields: &Map<String, Value>, key: &str) -> Vec<String> {
    let Some(Value::Array(items)) = fields.get(key) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect()
}

/// Map an exercise entry. Entries with an unknown category or a blank id are skipped.
pub(crate) fn exercise_from_entry(entry: &Entry, assets: &AssetIndex) -> Option<Exercise> {
    let fields = &entry.fields;
    let raw_category = text(fields, "typeOfExercise").unwrap_or_default();
    let category = match raw_category.parse::<Category>() {
        Ok(category) => category,
        Err(err) => {
            warn!(entry = %entry.sys.id, error = %err, "skipping exercise entry");
            return None;
        }
    };

    let media = assets
        .resolve(fields.get("videosimagesaudio"))
        .or_else(|| assets.resolve(fields.get("media")));

    let draft = ExerciseDraft {
        id: entry.sys.id.clone(),
        category,
        lesson: text(fields, "lessonTitle"),
        prompt: text(fields, "questionprompt"),
        correct_answer: text(fields, "correctAnswer"),
        choices: text_list(fields, "multipleChoice"),
        media,
    };

    match draft.validate() {
        Ok(exercise) => Some(exercise),
        Err(err) => {
            warn!(entry = %entry.sys.id, error = %err, "skipping invalid exercise entry");
            None
        }
    }
}

pub(crate) fn exercises_from_collection(collection: &EntryCollection) -> Vec<Exercise> {
    let assets = AssetIndex::new(&collection.includes);
    collection
        .items
        .iter()
        .filter_map(|entry| exercise_from_entry(entry, &assets))
        .collect()
}

pub(crate) fn lesson_from_entry(entry: &Entry, assets: &AssetIndex) -> Option<Lesson> {
    let fields = &entry.fields;
    let draft = LessonDraft {
        id: entry.sys.id.clone(),
        title: text(fields, "lessonTitle"),
        language: text(fields, "language"),
        level: text(fields, "level"),
        lesson_type: text(fields, "typeOfLesson"),
        content: text(fields, "lessonContent"),
        audio: assets.resolve(fields.get("audio")),
        video: assets.resolve(fields.get("video")),
    };

    match draft.validate() {
        Ok(lesson) => Some(lesson),
        Err(err) => {
            warn!(entry = %entry.sys.id, error = %err, "skipping invalid lesson entry");
            None
        }
    }
}

pub(crate) fn lessons_from_collection(collection: &EntryCollection) -> Vec<Lesson> {
    let assets = AssetIndex::new(&collection.includes);
    collection
        .items
        .iter()
        .filter_map(|entry| lesson_from_entry(entry, &assets))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection(value: Value) -> EntryCollection {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn inline_asset_url_is_normalized() {
        let c = collection(json!({
            "items": [{
                "sys": { "id": "w1" },
                "fields": {
                    "typeOfExercise": "Writing",
                    "questionprompt": "Translate: Hello",
                    "correctAnswer": "Jambo",
                    "multipleChoice": ["Jambo", "Kwaheri"],
                    "media": { "fields": { "file": { "url": "//images.example.net/hello.png" } } }
                }
            }]
        }));

        let exercises = exercises_from_collection(&c);
        assert_eq!(exercises.len(), 1);
        let exercise = &exercises[0];
        assert_eq!(exercise.choices(), ["Jambo", "Kwaheri"]);
        assert_eq!(
            exercise.media().map(MediaUri::as_str),
            Some("https://images.example.net/hello.png")
        );
        assert_eq!(exercise.lesson(), "Unknown Lesson");
    }

    #[test]
    fn linked_asset_resolves_through_includes() {
        let c = collection(json!({
            "items": [{
                "sys": { "id": "s1" },
                "fields": {
                    "typeOfExercise": "Speaking",
                    "videosimagesaudio": [{ "sys": { "type": "Link", "linkType": "Asset", "id": "a9" } }]
                }
            }],
            "includes": {
                "Asset": [{
                    "sys": { "id": "a9" },
                    "fields": { "file": { "url": "//assets.example.net/habari.mp3" } }
                }]
            }
        }));

        let exercises = exercises_from_collection(&c);
        assert_eq!(
            exercises[0].media().map(MediaUri::as_str),
            Some("https://assets.example.net/habari.mp3")
        );
        assert_eq!(exercises[0].prompt(), "No prompt available");
    }

    #[test]
    fn unknown_category_and_dangling_links_are_tolerated() {
        let c = collection(json!({
            "items": [
                { "sys": { "id": "x" }, "fields": { "typeOfExercise": "Reading" } },
                {
                    "sys": { "id": "l1" },
                    "fields": {
                        "typeOfExercise": "Listening",
                        "correctAnswer": 3,
                        "videosimagesaudio": [{ "sys": { "id": "missing" } }]
                    }
                }
            ]
        }));

        let exercises = exercises_from_collection(&c);
        assert_eq!(exercises.len(), 1);
        assert_eq!(exercises[0].correct_answer(), "3");
        assert!(exercises[0].media().is_none());
    }

    #[test]
    fn lesson_entry_maps_audio_and_defaults() {
        let c = collection(json!({
            "items": [{
                "sys": { "id": "lesson-1" },
                "fields": {
                    "lessonTitle": "Salamu",
                    "typeOfLesson": "Speaking",
                    "audio": [{ "fields": { "file": { "url": "https://cdn.example.net/salamu.mp3" } } }]
                }
            }]
        }));

        let lessons = lessons_from_collection(&c);
        assert_eq!(lessons.len(), 1);
        let lesson = &lessons[0];
        assert_eq!(lesson.title(), "Salamu");
        assert_eq!(lesson.level(), "Beginner");
        assert_eq!(lesson.category(), Some(Category::Speaking));
        assert!(lesson.audio().is_some());
        assert!(lesson.video().is_none());
    }
}
