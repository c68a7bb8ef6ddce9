use std::sync::Arc;

use practice_core::model::{Category, Exercise};
use rand::Rng;
use rand::seq::SliceRandom;
use storage::repository::{ExerciseQuery, ExerciseRepository};
use tracing::{debug, info, warn};

use super::service::{ExerciseSession, SessionConfig};
use crate::Clock;
use crate::error::SessionError;

/// Loads exercise lists from the content provider and starts sessions over them.
///
/// Fetch failures are not retried: they degrade to an empty list, which starts a
/// session that finishes immediately with zero results.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    exercises: Arc<dyn ExerciseRepository>,
    config: SessionConfig,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(clock: Clock, exercises: Arc<dyn ExerciseRepository>) -> Self {
        Self {
            clock,
            exercises,
            config: SessionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    async fn fetch(&self, query: ExerciseQuery) -> Vec<Exercise> {
        match self.exercises.list_exercises(&query).await {
            Ok(exercises) => {
                debug!(
                    category = ?query.category,
                    count = exercises.len(),
                    "fetched exercises"
                );
                exercises
            }
            Err(err) => {
                warn!(category = ?query.category, error = %err, "exercise fetch failed");
                Vec::new()
            }
        }
    }

    /// All exercises of one category in provider order.
    pub async fn load_practice(&self, category: Category) -> Vec<Exercise> {
        self.fetch(ExerciseQuery::category(category)).await
    }

    /// Exercises of one category within a lesson, in provider order.
    pub async fn load_lesson_practice(&self, category: Category, lesson: &str) -> Vec<Exercise> {
        self.fetch(ExerciseQuery::category(category).with_lesson(lesson))
            .await
    }

    /// Fetch a few exercises per category concurrently and concatenate them as
    /// Writing, Speaking, Listening. The result is not shuffled.
    pub async fn load_quiz(&self) -> Vec<Exercise> {
        let limit = self.config.quiz_per_category;
        let query = |category| ExerciseQuery::category(category).with_limit(limit);

        let (writing, speaking, listening) = tokio::join!(
            self.fetch(query(Category::Writing)),
            self.fetch(query(Category::Speaking)),
            self.fetch(query(Category::Listening)),
        );

        let mut all = writing;
        all.extend(speaking);
        all.extend(listening);
        all
    }

    /// Start a mixed quiz: load, shuffle once, start.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the new session rejects the start.
    pub async fn start_quiz(&self) -> Result<ExerciseSession, SessionError> {
        let mut exercises = self.load_quiz().await;
        shuffle_once(&mut exercises, &mut rand::rng());
        self.start_with(exercises)
    }

    /// Start a category practice session in provider order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the new session rejects the start.
    pub async fn start_practice(
        &self,
        category: Category,
    ) -> Result<ExerciseSession, SessionError> {
        let exercises = self.load_practice(category).await;
        self.start_with(exercises)
    }

    /// Start a practice session restricted to one lesson.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the new session rejects the start.
    pub async fn start_lesson_practice(
        &self,
        category: Category,
        lesson: &str,
    ) -> Result<ExerciseSession, SessionError> {
        let exercises = self.load_lesson_practice(category, lesson).await;
        self.start_with(exercises)
    }

    /// Start a session over an already ordered list.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the new session rejects the start.
    pub fn start_with(&self, exercises: Vec<Exercise>) -> Result<ExerciseSession, SessionError> {
        let mut session = ExerciseSession::new(self.config);
        let count = exercises.len();
        session.start(exercises)?;
        info!(count, started_at = %self.clock.now(), "session started");
        Ok(session)
    }
}

/// Uniform random permutation, applied once before the first question is shown.
pub fn shuffle_once<R: Rng + ?Sized>(exercises: &mut [Exercise], rng: &mut R) {
    exercises.shuffle(rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use practice_core::model::ExerciseDraft;
    use practice_core::time::fixed_clock;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use storage::repository::{InMemoryRepository, StorageError};

    fn exercise(id: &str, category: Category) -> Exercise {
        ExerciseDraft::new(id, category).validate().unwrap()
    }

    fn seeded_repo() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        for i in 0..7 {
            repo.push_exercise(exercise(&format!("l{i}"), Category::Listening))
                .unwrap();
            repo.push_exercise(exercise(&format!("w{i}"), Category::Writing))
                .unwrap();
        }
        repo.push_exercise(exercise("s0", Category::Speaking))
            .unwrap();
        repo
    }

    struct FailingRepo;

    #[async_trait]
    impl ExerciseRepository for FailingRepo {
        async fn list_exercises(
            &self,
            _query: &ExerciseQuery,
        ) -> Result<Vec<Exercise>, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
    }

    #[tokio::test]
    async fn quiz_concatenates_categories_in_fixed_order() {
        let loop_service = SessionLoopService::new(fixed_clock(), Arc::new(seeded_repo()));
        let quiz = loop_service.load_quiz().await;

        let ids: Vec<&str> = quiz.iter().map(|e| e.id().as_str()).collect();
        assert_eq!(
            ids,
            vec!["w0", "w1", "w2", "w3", "w4", "s0", "l0", "l1", "l2", "l3", "l4"]
        );
    }

    #[tokio::test]
    async fn practice_keeps_provider_order() {
        let loop_service = SessionLoopService::new(fixed_clock(), Arc::new(seeded_repo()));
        let session = loop_service
            .start_practice(Category::Listening)
            .await
            .unwrap();
        assert_eq!(session.exercises().len(), 7);
        assert_eq!(session.exercises()[0].id().as_str(), "l0");
        assert_eq!(session.exercises()[6].id().as_str(), "l6");
    }

    #[tokio::test]
    async fn failed_fetch_starts_an_empty_finished_session() {
        let loop_service = SessionLoopService::new(fixed_clock(), Arc::new(FailingRepo));
        let session = loop_service.start_quiz().await.unwrap();
        assert!(session.is_finished());
        assert_eq!(session.results().percentage(), 0);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut exercises: Vec<Exercise> = (0..10)
            .map(|i| exercise(&format!("w{i}"), Category::Writing))
            .collect();
        let original = exercises.clone();

        shuffle_once(&mut exercises, &mut StdRng::seed_from_u64(7));

        let mut sorted: Vec<&str> = exercises.iter().map(|e| e.id().as_str()).collect();
        sorted.sort_unstable();
        let mut expected: Vec<&str> = original.iter().map(|e| e.id().as_str()).collect();
        expected.sort_unstable();
        assert_eq!(sorted, expected);

        let mut again = original.clone();
        shuffle_once(&mut again, &mut StdRng::seed_from_u64(7));
        assert_eq!(again, exercises);
    }
}
