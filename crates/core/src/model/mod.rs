mod category;
mod exercise;
mod ids;
mod lesson;
mod media;
mod profile;
mod results;

pub use category::{Category, ParseCategoryError};
pub use exercise::{Exercise, ExerciseDraft, ExerciseError};
pub use ids::{ExerciseId, LessonId, UserId};
pub use lesson::{Lesson, LessonDraft, LessonError};
pub use media::{MediaUri, MediaValidationError};
pub use profile::UserProfile;
pub use results::{CategoryScores, POINTS_PER_QUESTION, SessionResults};
