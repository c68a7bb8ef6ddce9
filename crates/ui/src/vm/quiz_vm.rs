use practice_core::model::Category;
use services::session::{ExerciseSession, PlaybackSource, QuestionPhase, SessionState};

use crate::vm::results_vm::{ResultsVm, map_results};
use crate::vm::time_fmt::{format_clock, format_millis};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChoiceState {
    Available,
    /// Picked and matched the answer.
    Correct,
    /// Picked and wrong.
    Incorrect,
    /// Another choice was picked.
    Locked,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceVm {
    pub label: String,
    pub state: ChoiceState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioVm {
    pub is_playing: bool,
    pub position_label: String,
    pub duration_label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeakingVm {
    pub is_recording: bool,
    /// `Recording… 00:04` while capturing.
    pub recording_label: Option<String>,
    pub can_record: bool,
    pub has_recording: bool,
    pub can_submit: bool,
    pub recording_playback: Option<AudioVm>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub header: String,
    pub category_label: &'static str,
    pub lesson: String,
    pub prompt: String,
    pub timer_label: String,
    pub choices: Vec<ChoiceVm>,
    pub has_media: bool,
    pub media_playback: Option<AudioVm>,
    pub speaking: Option<SpeakingVm>,
    pub feedback: Option<&'static str>,
    pub is_submitting: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizVm {
    NotStarted,
    Question(QuestionVm),
    Results(ResultsVm),
}

#[must_use]
pub fn map_quiz(session: &ExerciseSession) -> QuizVm {
    match session.state() {
        SessionState::NotStarted => QuizVm::NotStarted,
        SessionState::Finished(reason) => QuizVm::Results(map_results(session.results(), reason)),
        SessionState::InProgress(phase) => {
            map_question(session, phase).map_or(QuizVm::NotStarted, QuizVm::Question)
        }
    }
}

fn map_question(session: &ExerciseSession, phase: QuestionPhase) -> Option<QuestionVm> {
    let exercise = session.current_exercise()?;
    let progress = session.progress();
    let selected = session.attempt().and_then(|attempt| attempt.selected_choice());

    let choices = if exercise.category().is_choice_based() {
        exercise
            .choices()
            .iter()
            .map(|choice| {
                let state = match selected {
                    None => ChoiceState::Available,
                    Some(picked) if picked == choice.as_str() && exercise.is_correct(choice) => {
                        ChoiceState::Correct
                    }
                    Some(picked) if picked == choice.as_str() => ChoiceState::Incorrect,
                    Some(_) => ChoiceState::Locked,
                };
                ChoiceVm {
                    label: choice.clone(),
                    state,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    let speaking = (exercise.category() == Category::Speaking).then(|| {
        let recording = session.recording();
        let is_recording = recording.is_some_and(|r| r.is_active());
        let has_recording = recording.is_some_and(|r| r.uri().is_some());
        SpeakingVm {
            is_recording,
            recording_label: recording
                .filter(|r| r.is_active())
                .map(|r| format!("Recording… {}", format_clock(r.elapsed_secs()))),
            can_record: session.can_start_recording(),
            has_recording,
            can_submit: has_recording && !is_recording && phase == QuestionPhase::Presented,
            recording_playback: audio_for(session, PlaybackSource::Recording),
        }
    });

    Some(QuestionVm {
        header: format!(
            "Question {} of {}",
            progress.question_number(),
            progress.total
        ),
        category_label: exercise.category().as_str(),
        lesson: exercise.lesson().to_string(),
        prompt: exercise.prompt().to_string(),
        timer_label: format_clock(session.remaining_secs()),
        choices,
        has_media: exercise.media().is_some(),
        media_playback: audio_for(session, PlaybackSource::Exercise),
        speaking,
        feedback: session.attempt().map(|attempt| attempt.feedback()),
        is_submitting: phase == QuestionPhase::Submitting,
    })
}

fn audio_for(session: &ExerciseSession, source: PlaybackSource) -> Option<AudioVm> {
    session
        .media()
        .playback()
        .filter(|playback| playback.source == source)
        .map(|playback| AudioVm {
            is_playing: playback.status.is_playing,
            position_label: format_millis(playback.status.position_ms),
            duration_label: format_millis(playback.status.duration_ms),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use practice_core::model::{Exercise, ExerciseDraft};
    use services::session::SessionConfig;

    fn writing(id: &str, answer: &str, choices: &[&str]) -> Exercise {
        ExerciseDraft {
            prompt: Some(format!("Translate {id}")),
            correct_answer: Some(answer.to_string()),
            choices: choices.iter().map(ToString::to_string).collect(),
            ..ExerciseDraft::new(id, Category::Writing)
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn question_header_and_timer() {
        let mut session = ExerciseSession::new(SessionConfig::default());
        session
            .start(vec![writing("1", "Jambo", &["Jambo", "Kwaheri"])])
            .unwrap();

        let QuizVm::Question(vm) = map_quiz(&session) else {
            panic!("expected a question");
        };
        assert_eq!(vm.header, "Question 1 of 1");
        assert_eq!(vm.timer_label, "20:00");
        assert_eq!(vm.lesson, "Unknown Lesson");
        assert!(vm.speaking.is_none());
        assert!(vm.choices.iter().all(|c| c.state == ChoiceState::Available));
        assert_eq!(vm.feedback, None);
    }

    #[test]
    fn wrong_pick_is_marked_and_others_locked() {
        let mut session = ExerciseSession::new(SessionConfig::default());
        session
            .start(vec![writing("1", "Jambo", &["Jambo", "Kwaheri"])])
            .unwrap();
        let _ticket = session.select_choice("Kwaheri").unwrap();

        let QuizVm::Question(vm) = map_quiz(&session) else {
            panic!("expected a question");
        };
        assert_eq!(vm.choices[0].state, ChoiceState::Locked);
        assert_eq!(vm.choices[1].state, ChoiceState::Incorrect);
        assert_eq!(vm.feedback, Some("Incorrect ❌"));
    }

    #[test]
    fn speaking_question_exposes_recorder() {
        let mut session = ExerciseSession::new(SessionConfig::default());
        session
            .start(vec![
                ExerciseDraft::new("s", Category::Speaking).validate().unwrap(),
            ])
            .unwrap();

        let QuizVm::Question(vm) = map_quiz(&session) else {
            panic!("expected a question");
        };
        let speaking = vm.speaking.unwrap();
        assert!(speaking.can_record);
        assert!(!speaking.can_submit);
        assert!(vm.choices.is_empty());
        assert_eq!(vm.prompt, "No prompt available");
    }

    #[test]
    fn finished_session_maps_to_results() {
        let mut session = ExerciseSession::new(SessionConfig::default());
        session.start(Vec::new()).unwrap();
        assert!(matches!(map_quiz(&session), QuizVm::Results(_)));
    }
}
