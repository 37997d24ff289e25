use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};

use onboardia::channels::cli::{StderrProgress, run_chat_repl};
use onboardia::channels::{AsanaTracker, GoogleCalendar, SmtpDelivery};
use onboardia::clock::{Clock, LocalClock};
use onboardia::config::{
    AppConfig, CalendarConfig, Env, ProcessEnv, SmtpConfig, TrackerConfig, llm_config_from_env,
};
use onboardia::llm::{LlmProvider, create_provider};
use onboardia::onboarding::{
    ChatAssistant, Collaborators, DrafterConfig, LlmTextGenerator, MeetingSettings,
    OnboardingRouteState, Orchestrator, PipelineSettings, onboarding_routes,
};
use onboardia::store::LibSqlBackend;

#[derive(Parser)]
#[command(name = "onboardia")]
#[command(about = "Onboardia - automated onboarding for new joiners", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Onboard everyone who joined recently
    Run {
        /// Look back this many days (defaults to ONBOARDIA_WINDOW_DAYS)
        #[arg(short, long)]
        window_days: Option<u32>,
    },
    /// Chat with the HR assistant on stdin
    Chat,
    /// Serve the REST API
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Create the employee table and insert the demo roster if it is empty
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Install rustls crypto provider before any TLS usage
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    let cli = Cli::parse();
    let env = ProcessEnv;
    let config = AppConfig::from_env(&env)?;

    match cli.command {
        Command::Seed => {
            let store = open_store(&config).await?;
            let inserted = store.seed_demo_employees(LocalClock.today()).await?;
            eprintln!(
                "Seeded {inserted} employee(s) into {}",
                config.db_path.display()
            );
        }
        Command::Chat => {
            let llm = create_provider(&llm_config_from_env(&env)?)?;
            eprintln!("Onboardia chat. Type 'stop' to quit.\n");
            run_chat_repl(&ChatAssistant::new(llm)).await?;
        }
        Command::Run { window_days } => {
            let llm = create_provider(&llm_config_from_env(&env)?)?;
            let orchestrator = build_orchestrator(&config, &env, llm)
                .await?
                .with_progress(Arc::new(StderrProgress));
            let window_days = window_days.unwrap_or(config.onboarding.window_days);

            let summary = orchestrator.run_onboarding(window_days).await?;
            println!("{}", summary.render());
        }
        Command::Serve { port } => {
            let llm = create_provider(&llm_config_from_env(&env)?)?;
            let orchestrator = build_orchestrator(&config, &env, llm.clone()).await?;
            let port = port.unwrap_or(config.port);

            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            let app = onboarding_routes(OnboardingRouteState {
                orchestrator: Arc::new(orchestrator),
                chat: Arc::new(ChatAssistant::new(llm)),
                default_window_days: config.onboarding.window_days,
            })
            .layer(cors);

            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
                .await
                .with_context(|| format!("Failed to bind port {port}"))?;
            tracing::info!(port, "Onboardia API listening");
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

async fn open_store(config: &AppConfig) -> anyhow::Result<LibSqlBackend> {
    LibSqlBackend::new_local(&config.db_path)
        .await
        .with_context(|| format!("Failed to open database at {}", config.db_path.display()))
}

async fn build_orchestrator(
    config: &AppConfig,
    env: &dyn Env,
    llm: Arc<dyn LlmProvider>,
) -> anyhow::Result<Orchestrator> {
    let smtp = SmtpConfig::from_env(env)?;
    let tracker = TrackerConfig::from_env(env)?;
    let calendar = CalendarConfig::from_env(env)?;
    let onboarding = &config.onboarding;

    let settings = PipelineSettings {
        target_role: onboarding.target_role.clone(),
        fallback_manager: onboarding.fallback_manager.clone(),
        sender: smtp.sender.clone(),
        tracker_workspace: tracker.workspace_gid.clone(),
        tracker_project: tracker.project_gid.clone(),
        meeting: MeetingSettings {
            timezone: onboarding.timezone.clone(),
            location: onboarding.meeting_location.clone(),
        },
    };

    let collaborators = Collaborators {
        store: Arc::new(open_store(config).await?),
        generator: Arc::new(LlmTextGenerator::new(
            llm,
            DrafterConfig {
                company: onboarding.company.clone(),
                ..Default::default()
            },
        )),
        delivery: Arc::new(SmtpDelivery::new(smtp)),
        tracker: Arc::new(AsanaTracker::new(tracker.base_url, tracker.token)),
        scheduler: Arc::new(GoogleCalendar::new(
            calendar.base_url,
            calendar.calendar_id,
            calendar.token,
        )),
        clock: Arc::new(LocalClock),
    };

    Ok(Orchestrator::new(collaborators, settings))
}
