//! EduFun settings console
//!
//! Runs the parent settings screen in a terminal, against the EduFun server
//! when one is configured and an in-memory demo account otherwise.

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use edufun_audio::{KiraMusic, MusicOutput, SilentOutput, DEFAULT_VOLUME};
use edufun_integration::{
    AuthService, MemoryAuth, MemoryProfileRepository, ProfileRepository, ServerClient, UserInfo,
    UserProfile,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use edufun::console::{self, parse_command};
use edufun::{AppConfig, BackgroundMusic, FilePreferenceStore, Notice, SettingsBus, SettingsSession};

type Output = Box<dyn MusicOutput>;

const DEMO_PASSWORD: &str = "edufun123";

/// Subscriber used while the config file is read, before its log level is known.
fn bootstrap_subscriber() -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .finish()
}

fn init_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Open the configured track, falling back to silence.
fn open_music(config: &AppConfig) -> Output {
    let Some(track) = config.music_track.as_deref() else {
        info!("No music track configured, background music is silent");
        return Box::new(SilentOutput::new());
    };
    match KiraMusic::load(track, DEFAULT_VOLUME) {
        Ok(music) => Box::new(music),
        Err(e) => {
            warn!("Background music unavailable: {}", e);
            Box::new(SilentOutput::new())
        }
    }
}

fn open_preferences() -> FilePreferenceStore {
    let path = FilePreferenceStore::default_path().unwrap_or_else(|| {
        warn!("Could not determine config directory, keeping preferences in the working directory");
        "edufun-preferences.toml".into()
    });
    FilePreferenceStore::open(path)
}

fn demo_backends() -> Result<(MemoryProfileRepository, MemoryAuth)> {
    let profile = UserProfile {
        child_name: Some("Budi".into()),
        child_age: Some(8),
        child_grade: Some("3".into()),
        avatar: Some("🐼".into()),
        points: Some(120),
        created_at: Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).single(),
        ..Default::default()
    };
    let repo = MemoryProfileRepository::with_profile(&profile).context("Failed to build demo profile")?;
    let auth = MemoryAuth::signed_in(
        UserInfo {
            id: "demo".into(),
            email: "parent@edufunkids.id".into(),
        },
        DEMO_PASSWORD,
    );
    Ok((repo, auth))
}

async fn run<R, A>(profiles: R, auth: A, music: BackgroundMusic<Output, FilePreferenceStore>) -> Result<()>
where
    R: ProfileRepository,
    A: AuthService,
{
    let bus = SettingsBus::new();
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            debug!("Settings event: {:?}", event);
        }
    });

    let mut session = SettingsSession::new(profiles, auth, music, bus);

    match session.load().await {
        Ok(settings) => {
            for line in console::describe(&settings) {
                println!("{}", line);
            }
        }
        Err(e) => {
            println!("{}", Notice::from_error(&e, "load settings"));
            if let Some(redirect) = session.state().redirect() {
                println!("redirecting to {}", redirect.path());
                return Ok(());
            }
        }
    }
    println!("type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        let step = console::run_command(&mut session, command).await;
        for line in &step.output {
            println!("{}", line);
        }
        if let Some(notice) = &step.notice {
            println!("{}", notice);
        }
        if step.exit || session.state().is_terminal() {
            break;
        }
    }

    info!("Settings console closed");
    Ok(())
}

async fn start(config: AppConfig) -> Result<()> {
    let music = BackgroundMusic::initialize(open_music(&config), open_preferences());

    let Some(server_url) = config.server_url.as_deref() else {
        warn!("No server configured, using the demo account (password '{}')", DEMO_PASSWORD);
        let (profiles, auth) = demo_backends()?;
        return run(profiles, auth, music).await;
    };

    let client = ServerClient::new(server_url, config.request_timeout())
        .context("Failed to create server client")?;
    let auth = client.auth();

    let email = std::env::var("EDUFUN_EMAIL").context("EDUFUN_EMAIL is not set")?;
    let password = std::env::var("EDUFUN_PASSWORD").context("EDUFUN_PASSWORD is not set")?;
    if let Err(e) = auth.login(&email, &password).await {
        warn!("Login failed: {}", e);
    }

    run(client.profiles(), auth, music).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = tracing::subscriber::with_default(bootstrap_subscriber(), AppConfig::load);
    init_logging(&config.log_level);

    info!("Starting EduFun settings...");

    match start(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{}", Notice::unhandled(&e));
            ExitCode::FAILURE
        }
    }
}
