use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};

use crate::domain::appointment::AppointmentRequest;
use crate::domain::entities::{Credentials, Registration};
use crate::frameworks::config::{CONFIG_PATH_VAR, ClientConfig};
use crate::interface_adapters::navigation::TerminalNavigator;
use crate::interface_adapters::state::ClientState;
use crate::use_cases::{DashboardNotice, SubmitMode};

// Route the protected commands are gated behind.
const DASHBOARD_ROUTE: &str = "/dashboard";
const DEFAULT_SESSION_FILE: &str = ".appointment_session.json";

#[derive(Debug, Parser)]
#[command(name = "appointment_client", about = "Appointment scheduling client", version)]
pub struct Cli {
    /// Optional TOML config file.
    #[arg(long, env = CONFIG_PATH_VAR, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session.
    Login {
        username: String,
        #[arg(long, env = "APPOINTMENT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Register a new account.
    Signup {
        username: String,
        email: String,
        #[arg(long, env = "APPOINTMENT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Drop the stored session.
    Logout,
    /// Show whether a session is active.
    Status,
    /// List appointments as calendar events.
    List,
    /// Create an appointment.
    Create(DraftArgs),
    /// Update an appointment.
    Update(DraftArgs),
    /// Delete an appointment by id.
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct DraftArgs {
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub title: String,
    #[arg(long = "user-id")]
    pub user_id: String,
    #[arg(long)]
    pub status: String,
    /// yyyy-mm-dd
    #[arg(long)]
    pub created_date: String,
    /// yyyy-mm-dd
    #[arg(long)]
    pub start: String,
    /// yyyy-mm-dd
    #[arg(long)]
    pub end: String,
    #[arg(long)]
    pub all_day: bool,
}

impl From<DraftArgs> for AppointmentRequest {
    fn from(args: DraftArgs) -> Self {
        AppointmentRequest {
            title: args.title,
            id: args.id,
            created_date: args.created_date,
            start: args.start,
            end: args.end,
            user_id: args.user_id,
            status: args.status,
            all_day: args.all_day,
            ..Default::default()
        }
    }
}

// Logs go to stderr so command output on stdout stays clean.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run() -> anyhow::Result<()> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let mut config = ClientConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    // A terminal client needs the session to outlive the process.
    if config.session_file.is_none() {
        config.session_file = Some(PathBuf::from(DEFAULT_SESSION_FILE));
    }
    tracing::info!(base_url = %config.base_url, "client configured.");

    let navigator = Arc::new(TerminalNavigator::new());
    let state = ClientState::from_config(&config, navigator.clone()).context("failed to build http client")?;

    execute(&state, &navigator, cli.command).await
}

async fn execute(state: &ClientState, navigator: &TerminalNavigator, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => {
            let tokens = state
                .auth
                .login(Credentials::new(username, password))
                .await
                .map_err(|err| anyhow::anyhow!(err.user_message()))?;
            println!("logged in as {}", tokens.user_id.as_deref().unwrap_or("<unknown>"));
        }
        Command::Signup {
            username,
            email,
            password,
        } => {
            let status = state
                .auth
                .signup(Registration {
                    username,
                    email,
                    password,
                })
                .await
                .map_err(|err| anyhow::anyhow!(err.user_message()))?;
            println!("{}", status.message.as_deref().unwrap_or("signed up"));
        }
        Command::Logout => {
            state.auth.logout();
            println!("logged out");
        }
        Command::Status => {
            let session = state.auth.session();
            if state.auth.is_logged_in() {
                println!("active until {}", session.expires_at().unwrap_or_default());
            } else if session.refresh_token().is_some() {
                println!("expired; a refresh token is stored");
            } else {
                println!("logged out");
            }
        }
        Command::List => {
            ensure_allowed(state, navigator).await?;
            let events = state.dashboard.load_events().await.map_err(notice_error)?;
            for event in events {
                println!(
                    "{}\t{}\t{} .. {}\t{}",
                    event.id, event.title, event.start, event.end, event.status
                );
            }
        }
        Command::Create(args) => {
            ensure_allowed(state, navigator).await?;
            report(state.dashboard.submit(SubmitMode::Create, args.into()).await)?;
        }
        Command::Update(args) => {
            ensure_allowed(state, navigator).await?;
            report(state.dashboard.submit(SubmitMode::Update, args.into()).await)?;
        }
        Command::Delete { id } => {
            ensure_allowed(state, navigator).await?;
            match state.dashboard.delete(&id).await {
                Some(notice) => report(notice)?,
                None => bail!("an appointment id is required"),
            }
        }
    }
    Ok(())
}

async fn ensure_allowed(state: &ClientState, navigator: &TerminalNavigator) -> anyhow::Result<()> {
    if state.guard.can_activate(DASHBOARD_ROUTE).await {
        return Ok(());
    }
    let route = navigator.last_redirect().unwrap_or_default();
    bail!("not logged in; continue at {route}")
}

fn notice_error(notice: DashboardNotice) -> anyhow::Error {
    anyhow::anyhow!(notice.text().to_string())
}

fn report(notice: DashboardNotice) -> anyhow::Result<()> {
    match notice {
        DashboardNotice::Success(user_id) => {
            println!("ok {user_id}");
            Ok(())
        }
        failure => Err(notice_error(failure)),
    }
}
