//! Read-only client for the hosted content-delivery API.

use std::env;

use async_trait::async_trait;
use practice_core::model::{Category, Exercise, Lesson, LessonId};
use reqwest::Client;
use tracing::debug;

use crate::repository::{ExerciseQuery, ExerciseRepository, LessonRepository, StorageError};

mod mapping;

use mapping::EntryCollection;

const DEFAULT_BASE_URL: &str = "https://cdn.contentful.com";
const EXERCISE_CONTENT_TYPE: &str = "kiswahiliExerciseCollection";
const LESSON_CONTENT_TYPE: &str = "kiswahiliLessonCollection";

#[derive(Clone, Debug)]
pub struct ContentConfig {
    pub base_url: String,
    pub space_id: String,
    pub environment: String,
    pub access_token: String,
}

impl ContentConfig {
    /// Read configuration from the environment. `None` unless space and token are set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let space_id = env::var("PRACTICE_CONTENT_SPACE").ok()?;
        let access_token = env::var("PRACTICE_CONTENT_TOKEN").ok()?;
        if space_id.trim().is_empty() || access_token.trim().is_empty() {
            return None;
        }
        let environment =
            env::var("PRACTICE_CONTENT_ENVIRONMENT").unwrap_or_else(|_| "master".into());
        let base_url =
            env::var("PRACTICE_CONTENT_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Some(Self {
            base_url,
            space_id,
            environment,
            access_token,
        })
    }

    fn entries_url(&self) -> String {
        format!(
            "{}/spaces/{}/environments/{}/entries",
            self.base_url.trim_end_matches('/'),
            self.space_id,
            self.environment
        )
    }
}

#[derive(Clone)]
pub struct ContentClient {
    client: Client,
    config: ContentConfig,
}

impl ContentClient {
    #[must_use]
    pub fn new(config: ContentConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn fetch_entries(
        &self,
        params: &[(&str, String)],
    ) -> Result<EntryCollection, StorageError> {
        let response = self
            .client
            .get(self.config.entries_url())
            .bearer_auth(&self.config.access_token)
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::HttpStatus(response.status()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

pub(crate) fn exercise_params(query: &ExerciseQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("content_type", EXERCISE_CONTENT_TYPE.to_string()),
        ("include", "1".to_string()),
    ];
    if let Some(category) = query.category {
        params.push(("fields.typeOfExercise", category.as_str().to_string()));
    }
    if let Some(lesson) = &query.lesson {
        params.push(("fields.lessonTitle", lesson.clone()));
    }
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    params
}

#[async_trait]
impl ExerciseRepository for ContentClient {
    async fn list_exercises(&self, query: &ExerciseQuery) -> Result<Vec<Exercise>, StorageError> {
        let collection = self.fetch_entries(&exercise_params(query)).await?;
        let exercises = mapping::exercises_from_collection(&collection);
        debug!(
            category = ?query.category,
            fetched = collection.items.len(),
            mapped = exercises.len(),
            "fetched exercises"
        );
        Ok(exercises)
    }
}

#[async_trait]
impl LessonRepository for ContentClient {
    async fn list_lessons(&self, category: Option<Category>) -> Result<Vec<Lesson>, StorageError> {
        let mut params = vec![
            ("content_type", LESSON_CONTENT_TYPE.to_string()),
            ("include", "1".to_string()),
        ];
        if let Some(category) = category {
            params.push(("fields.typeOfLesson", category.as_str().to_string()));
        }
        let collection = self.fetch_entries(&params).await?;
        let lessons = mapping::lessons_from_collection(&collection);
        debug!(category = ?category, count = lessons.len(), "fetched lessons");
        Ok(lessons)
    }

    async fn get_lesson(&self, id: &LessonId) -> Result<Lesson, StorageError> {
        // The collection endpoint is used so linked audio/video assets come back in `includes`.
        let params = [
            ("content_type", LESSON_CONTENT_TYPE.to_string()),
            ("sys.id", id.as_str().to_string()),
            ("include", "1".to_string()),
        ];
        let collection = self.fetch_entries(&params).await?;
        mapping::lessons_from_collection(&collection)
            .into_iter()
            .next()
            .ok_or(StorageError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_url_trims_trailing_slash() {
        let config = ContentConfig {
            base_url: "https://cdn.example.com/".into(),
            space_id: "space".into(),
            environment: "master".into(),
            access_token: "token".into(),
        };
        assert_eq!(
            config.entries_url(),
            "https://cdn.example.com/spaces/space/environments/master/entries"
        );
    }

    #[test]
    fn exercise_params_include_filters() {
        let query = ExerciseQuery::category(Category::Listening)
            .with_lesson("Salamu")
            .with_limit(5);
        let params = exercise_params(&query);
        assert!(params.contains(&("fields.typeOfExercise", "Listening".to_string())));
        assert!(params.contains(&("fields.lessonTitle", "Salamu".to_string())));
        assert!(params.contains(&("limit", "5".to_string())));
        assert!(params.contains(&("content_type", EXERCISE_CONTENT_TYPE.to_string())));
    }
}
