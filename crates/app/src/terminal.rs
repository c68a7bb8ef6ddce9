//! Line-oriented host: renders view-models to stdout and turns typed commands
//! into session events.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use practice_core::model::MediaUri;
use services::session::{
    EventReceiver, ExerciseSession, MediaBackend, MediaError, PlaybackHandle, RecordingHandle,
    SessionDriver, SessionEvent, SessionNotice, StatusSink,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::info;
use ui::AppContext;
use ui::vm::{QuizVm, ResultsVm, format_clock, map_quiz, map_results};

/// Media backend for terminals: nothing is audible, but handles and recordings
/// follow the same lifecycle as on a device.
#[derive(Default)]
pub struct TerminalMedia {
    next: AtomicU64,
}

impl TerminalMedia {
    fn next_handle(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl MediaBackend for TerminalMedia {
    async fn create_and_play(
        &self,
        uri: &MediaUri,
        _status: StatusSink,
    ) -> Result<PlaybackHandle, MediaError> {
        let handle = PlaybackHandle::new(self.next_handle());
        info!(%uri, handle = handle.value(), "playing");
        Ok(handle)
    }

    async fn pause(&self, handle: PlaybackHandle) -> Result<(), MediaError> {
        info!(handle = handle.value(), "paused");
        Ok(())
    }

    async fn resume(&self, handle: PlaybackHandle) -> Result<(), MediaError> {
        info!(handle = handle.value(), "resumed");
        Ok(())
    }

    async fn unload(&self, handle: PlaybackHandle) -> Result<(), MediaError> {
        info!(handle = handle.value(), "unloaded");
        Ok(())
    }

    async fn request_recording_permission(&self) -> Result<bool, MediaError> {
        Ok(true)
    }

    async fn start_recording(&self) -> Result<RecordingHandle, MediaError> {
        Ok(RecordingHandle::new(self.next_handle()))
    }

    async fn stop_recording(&self, handle: RecordingHandle) -> Result<MediaUri, MediaError> {
        let path = std::env::temp_dir().join(format!("practice-recording-{}.m4a", handle.value()));
        MediaUri::parse(format!("file://{}", path.display()))
            .map_err(|e| MediaError::Backend(e.to_string()))
    }
}

fn print_help() {
    println!("  1-9  choose an answer      p  play/pause audio");
    println!("  r    start recording       s  stop recording");
    println!("  l    play your recording   u  submit recording");
    println!("  n    next question         a  try again (when finished)");
    println!("  q    quit");
}

fn parse_command(line: &str, session: &ExerciseSession) -> Option<SessionEvent> {
    let line = line.trim();
    if let Ok(index) = line.parse::<usize>() {
        let exercise = session.current_exercise()?;
        let choice = exercise.choices().get(index.checked_sub(1)?)?;
        return Some(SessionEvent::SelectChoice(choice.clone()));
    }
    let event = match line {
        "p" => SessionEvent::TogglePlayback,
        "l" => SessionEvent::ToggleRecordingPlayback,
        "r" => SessionEvent::StartRecording,
        "s" => SessionEvent::StopRecording,
        "u" => SessionEvent::SubmitSpeaking,
        "n" => SessionEvent::Advance,
        "a" => SessionEvent::Restart,
        "q" => SessionEvent::Shutdown,
        _ => return None,
    };
    Some(event)
}

fn render_question(session: &ExerciseSession) {
    let QuizVm::Question(vm) = map_quiz(session) else {
        return;
    };
    println!();
    println!("{}  [{}]  {}", vm.header, vm.category_label, vm.timer_label);
    println!("{}", vm.lesson);
    println!("  {}", vm.prompt);
    for (index, choice) in vm.choices.iter().enumerate() {
        println!("  {}. {}", index + 1, choice.label);
    }
    if vm.has_media {
        println!("  (p to play audio)");
    }
    if vm.speaking.is_some() {
        println!("  (r to record, s to stop, u to submit)");
    }
}

pub fn render_results(vm: &ResultsVm) {
    println!();
    if let Some(notice) = vm.notice {
        println!("{notice}");
    }
    println!("{}", vm.title);
    println!("{}  ({})", vm.total_score_label, vm.percentage_label);
    println!("{}", vm.correct_label);
    for row in &vm.rows {
        println!("  {:<10} {}", row.label, row.score);
    }
    println!("a to try again, q to quit");
}

fn render_notice(notice: &SessionNotice, session: &ExerciseSession) {
    match notice {
        SessionNotice::Presented(_) => render_question(session),
        SessionNotice::Answered { feedback, .. } => println!("{feedback}"),
        SessionNotice::Countdown { remaining } => {
            if remaining % 60 == 0 {
                println!("[{} left]", format_clock(*remaining));
            }
        }
        SessionNotice::RecordingStarted => println!("Recording… 00:00"),
        SessionNotice::RecordingElapsed { secs } => {
            println!("Recording… {}", format_clock(*secs));
        }
        SessionNotice::RecordingStopped { duration_secs } => {
            println!("Recorded {}", format_clock(*duration_secs));
        }
        SessionNotice::Playback { is_playing, .. } => {
            println!("{}", if *is_playing { "Playing" } else { "Paused" });
        }
        SessionNotice::PermissionDenied => {
            println!("Permission to access the microphone is required.");
        }
        SessionNotice::MediaFailed(message) | SessionNotice::VerificationFailed(message) => {
            println!("{message}");
        }
        SessionNotice::Finished { results, reason } => {
            render_results(&map_results(results, *reason));
        }
    }
}

/// Drive `session` from stdin until the learner quits or input ends.
///
/// # Errors
///
/// Returns an I/O error if stdin cannot be read.
pub async fn play(context: &AppContext, session: ExerciseSession) -> std::io::Result<()> {
    let (driver, events) = context.drive(session);
    print_help();
    render_notice(&driver.opening_notice(), driver.session());

    let lines = BufReader::new(tokio::io::stdin()).lines();
    run_until_quit(driver, events, lines).await
}

/// Pump `input` into `driver`, then shut it down whether or not reading failed.
async fn run_until_quit<R>(
    mut driver: SessionDriver,
    mut events: EventReceiver,
    input: Lines<R>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let outcome = pump(&mut driver, &mut events, input).await;
    driver.shutdown().await;
    outcome
}

/// Feed typed commands and driver events into `driver` until the learner quits
/// or `input` ends.
async fn pump<R>(
    driver: &mut SessionDriver,
    events: &mut EventReceiver,
    mut input: Lines<R>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let event = tokio::select! {
            line = input.next_line() => match line? {
                Some(line) => match parse_command(&line, driver.session()) {
                    Some(event) => event,
                    None => {
                        print_help();
                        continue;
                    }
                },
                None => SessionEvent::Shutdown,
            },
            Some(event) = events.recv() => event,
        };

        let quit = event == SessionEvent::Shutdown;
        for notice in driver.handle(event).await {
            render_notice(&notice, driver.session());
        }
        if quit {
            return Ok(());
        }
    }
}
