use std::fmt;
use std::sync::Arc;

use clap::Parser;
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{
    AppServices, AuthService, ClientConfig, Clock, NavigationController, SessionStore,
    SummaryService,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use ui::{App, UiApp, build_app_context};
use url::Url;

#[derive(Debug)]
enum StartupError {
    InvalidDbUrl { raw: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for StartupError {}

/// Desktop client for the questionnaire service.
#[derive(Parser, Debug)]
#[command(name = "questionnaire", version)]
struct Args {
    /// Base URL of the questionnaire service API. Defaults to
    /// `QUESTIONNAIRE_API_URL`, then to a local development server.
    #[arg(long)]
    api_url: Option<Url>,

    /// `SQLite` database holding the signed-in session.
    #[arg(long = "db", env = "QUESTIONNAIRE_DB_URL", default_value = "sqlite:questionnaire.sqlite3")]
    db_url: String,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        self.api_url
            .clone()
            .map_or_else(ClientConfig::from_env, ClientConfig::new)
    }
}

struct DesktopApp {
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn session(&self) -> Arc<SessionStore> {
        self.services.session()
    }

    fn auth(&self) -> Arc<AuthService> {
        self.services.auth()
    }

    fn summary(&self) -> Arc<SummaryService> {
        self.services.summary()
    }

    fn navigation(&self) -> NavigationController {
        self.services.navigation()
    }
}

fn init_tracing(default_level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let invalid = || StartupError::InvalidDbUrl {
        raw: db_url.to_string(),
    };
    let path = db_url.strip_prefix("sqlite://").ok_or_else(invalid)?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(invalid().into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let db_url = normalize_sqlite_url(&args.db_url);
    let config = args.client_config();
    tracing::info!(api = %config.api_base_url, db = %db_url, "starting questionnaire client");

    // Storage is opened and migrated here so the UI starts with the saved session.
    prepare_sqlite_file(&db_url)?;
    let services = AppServices::new_sqlite(&db_url, Clock::default_clock(), config).await?;
    if services.session().is_authenticated() {
        tracing::info!("restored saved session");
    }

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp { services });
    let context = build_app_context(&app);

    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Questionnaire")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.log_level);

    if let Err(err) = run(args).await {
        tracing::error!(%err, "startup failed");
        eprintln!("{err}");
        std::process::exit(2);
    }
}
