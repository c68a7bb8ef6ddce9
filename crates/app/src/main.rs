mod demo;
mod terminal;

use std::fmt;
use std::sync::Arc;

use practice_core::model::{Category, LessonId, UserId};
use services::{
    AppServices, Clock, LessonService, MediaLifecycle, ProfileService, SessionConfig,
    SessionLoopService, SpeakingVerifier,
};
use storage::content_api::{ContentClient, ContentConfig};
use storage::profile_store::{ProfileStoreClient, ProfileStoreConfig};
use storage::repository::{ExerciseRepository, LessonRepository, ProfileRepository, Storage};
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::vm::{list_lessons, load_lesson, map_home};
use ui::{UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCategory { raw: String },
    MissingCategory,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCategory { raw } => write!(
                f,
                "invalid --category value: {raw} (expected writing, speaking or listening)"
            ),
            ArgsError::MissingCategory => write!(f, "practice requires --category"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct TerminalApp {
    user_id: Option<UserId>,
    services: AppServices,
    media: MediaLifecycle,
}

impl UiApp for TerminalApp {
    fn user_id(&self) -> Option<UserId> {
        self.user_id.clone()
    }

    fn clock(&self) -> Clock {
        self.services.clock()
    }

    fn session_loop(&self) -> Arc<SessionLoopService> {
        self.services.session_loop()
    }

    fn lessons(&self) -> Arc<LessonService> {
        self.services.lessons()
    }

    fn profiles(&self) -> Arc<ProfileService> {
        self.services.profiles()
    }

    fn verifier(&self) -> Arc<dyn SpeakingVerifier> {
        self.services.verifier()
    }

    fn media(&self) -> MediaLifecycle {
        self.media.clone()
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- quiz     [--user <uid>] [--offline]");
    eprintln!("  cargo run -p app -- practice --category <category> [--lesson <title>] [--offline]");
    eprintln!("  cargo run -p app -- lessons  [--category <category>] [--lesson <id>] [--offline]");
    eprintln!("  cargo run -p app -- profile  [--user <uid>] [--offline]");
    eprintln!();
    eprintln!("Categories: writing, speaking, listening");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PRACTICE_USER_ID");
    eprintln!("  PRACTICE_CONTENT_SPACE, PRACTICE_CONTENT_TOKEN, PRACTICE_CONTENT_ENVIRONMENT");
    eprintln!("  PRACTICE_PROFILE_PROJECT, PRACTICE_PROFILE_API_KEY");
    eprintln!("  RUST_LOG (default: info)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quiz,
    Practice,
    Lessons,
    Profile,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "quiz" => Some(Self::Quiz),
            "practice" => Some(Self::Practice),
            "lessons" => Some(Self::Lessons),
            "profile" => Some(Self::Profile),
            _ => None,
        }
    }
}

struct Args {
    user_id: Option<UserId>,
    category: Option<Category>,
    lesson: Option<String>,
    offline: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            user_id: std::env::var("PRACTICE_USER_ID")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(UserId::new),
            category: None,
            lesson: None,
            offline: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--user" => parsed.user_id = Some(UserId::new(require_value(args, "--user")?)),
                "--category" => {
                    let value = require_value(args, "--category")?;
                    let category = value
                        .parse::<Category>()
                        .map_err(|_| ArgsError::InvalidCategory { raw: value.clone() })?;
                    parsed.category = Some(category);
                }
                "--lesson" => parsed.lesson = Some(require_value(args, "--lesson")?),
                "--offline" => parsed.offline = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Remote collaborators where configured, built-in demo data for the rest.
fn build_storage(args: &mut Args) -> Result<Storage, Box<dyn std::error::Error>> {
    let demo = demo::repository()?;
    let content = ContentConfig::from_env().filter(|_| !args.offline);
    let profiles = ProfileStoreConfig::from_env().filter(|_| !args.offline);

    let (exercises, lessons): (Arc<dyn ExerciseRepository>, Arc<dyn LessonRepository>) =
        if let Some(config) = content {
            info!(space = %config.space_id, "using content delivery API");
            let client = Arc::new(ContentClient::new(config));
            (client.clone(), client)
        } else {
            info!("using built-in demo content");
            (Arc::new(demo.clone()), Arc::new(demo.clone()))
        };

    let profiles: Arc<dyn ProfileRepository> = if let Some(config) = profiles {
        Arc::new(ProfileStoreClient::new(config))
    } else {
        if args.user_id.is_none() {
            args.user_id = Some(UserId::new(demo::DEMO_USER));
        }
        Arc::new(demo)
    };

    Ok(Storage {
        exercises,
        lessons,
        profiles,
    })
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: a mixed quiz when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Quiz,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Quiz,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut args = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if cmd == Command::Practice && args.category.is_none() {
        print_usage();
        return Err(ArgsError::MissingCategory.into());
    }

    init_tracing();

    let storage = build_storage(&mut args)?;
    let clock = Clock::system();
    let services = AppServices::new(&storage, clock, SessionConfig::default());
    let app: Arc<dyn UiApp> = Arc::new(TerminalApp {
        user_id: args.user_id.clone(),
        services,
        media: MediaLifecycle::new(Arc::new(terminal::TerminalMedia::default())),
    });
    let mut context = build_app_context(&app);
    context.refresh_profile().await;

    match cmd {
        Command::Quiz => {
            let session = context.session_loop().start_quiz().await?;
            terminal::play(&context, session).await?;
        }
        Command::Practice => {
            let session_loop = context.session_loop();
            let category = args.category.ok_or(ArgsError::MissingCategory)?;
            let session = match args.lesson.as_deref() {
                Some(lesson) => session_loop.start_lesson_practice(category, lesson).await?,
                None => session_loop.start_practice(category).await?,
            };
            terminal::play(&context, session).await?;
        }
        Command::Lessons => {
            let lessons = context.lessons();
            if let Some(id) = args.lesson {
                match load_lesson(&lessons, &LessonId::new(id)).await {
                    Ok(lesson) => {
                        println!("{}", lesson.title);
                        println!("{}", lesson.meta_label);
                        println!();
                        println!("{}", lesson.content_html);
                        if let Some(audio) = lesson.audio_url {
                            println!("audio: {audio}");
                        }
                        if let Some(video) = lesson.video_url {
                            println!("video: {video}");
                        }
                    }
                    Err(err) => println!("{}", err.message()),
                }
            } else {
                let items = list_lessons(&lessons, args.category).await;
                if items.is_empty() {
                    println!("No lessons available.");
                }
                for item in items {
                    println!("{:<12} {}  ({})", item.id.as_str(), item.title, item.meta_label);
                    println!("             {}", item.excerpt);
                }
            }
        }
        Command::Profile => {
            let home = map_home(context.profile());
            println!("{}", home.header.greeting);
            println!("{} · {}", home.header.streak_label, home.header.xp_label);
            for tile in home.tiles {
                println!("  {:<10} {}", tile.title, tile.subtitle);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
