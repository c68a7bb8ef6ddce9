mod home_vm;
mod lesson_vm;
mod markdown_vm;
mod quiz_vm;
mod results_vm;
mod time_fmt;

pub use home_vm::{AvatarVm, CategoryTileVm, HomeVm, ProfileHeaderVm, map_home, map_profile_header};
pub use lesson_vm::{
    LessonListItemVm, LessonVm, list_lessons, load_lesson, map_lesson_list,
};
pub use markdown_vm::{markdown_to_html, plain_excerpt, sanitize_html};
pub use quiz_vm::{AudioVm, ChoiceState, ChoiceVm, QuestionVm, QuizVm, SpeakingVm, map_quiz};
pub use results_vm::{CategoryScoreVm, ResultsVm, map_results};
pub use time_fmt::{format_clock, format_millis};
