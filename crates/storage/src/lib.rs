#![forbid(unsafe_code)]

pub mod content_api;
pub mod profile_store;
pub mod repository;

pub use repository::{
    ExerciseQuery, ExerciseRepository, InMemoryRepository, LessonRepository, ProfileRepository,
    Storage, StorageError,
};
