use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use club_registry_server::config::{AppConfig, CliConfig, FileConfig};
use club_registry_server::mailer::{
    CommandPdfRenderer, ContractMailer, MailTemplateRegistry, SmtpMailer,
};
use club_registry_server::registry_store::SqliteRegistrationStore;
use club_registry_server::scheduler::jobs::CancellationSweep;
use club_registry_server::scheduler::{create_scheduler, JobContext, SystemClock};
use club_registry_server::server::{run_server, RequestsLoggingLevel, ServerConfig, ServerState};
use club_registry_server::server_store::SqliteServerStore;
use club_registry_server::work_queue::{DeactivateRegistration, QueueWorker, SqliteWorkQueueStore};
use tokio_util::sync::CancellationToken;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the SQLite database files.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Bearer token required by the admin API.
    #[clap(long)]
    pub admin_token: Option<String>,

    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        db_dir: cli_args.db_dir,
        port: cli_args.port,
        logging_level: cli_args.logging_level,
        admin_token: cli_args.admin_token,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening SQLite databases under {:?}...", config.db_dir);
    let registrations = Arc::new(SqliteRegistrationStore::new(config.registry_db_path())?);
    let server_store = Arc::new(SqliteServerStore::new(config.server_db_path())?);
    let work_queue = Arc::new(SqliteWorkQueueStore::new(config.queue_db_path())?);

    let contract_mailer = match &config.mail {
        Some(mail) => {
            info!("Mail delivery configured via {}", mail.smtp_host);
            let templates = Arc::new(MailTemplateRegistry::new()?);
            let pdf_renderer = Arc::new(CommandPdfRenderer::new(mail.pdf_command.clone()));
            let smtp =
                Arc::new(SmtpMailer::from_config(&mail.smtp_host, mail.smtp_port, mail.tls, &mail.from)?);
            Some(Arc::new(ContractMailer::new(templates, pdf_renderer, smtp)))
        }
        None => {
            info!("Mail delivery not configured, contract mails are disabled");
            None
        }
    };

    let shutdown_token = CancellationToken::new();

    let job_context = JobContext::new(
        shutdown_token.child_token(),
        registrations.clone(),
        server_store.clone(),
        work_queue.clone(),
        Arc::new(SystemClock),
    );
    let (mut scheduler, scheduler_handle) = create_scheduler(
        server_store.clone(),
        shutdown_token.clone(),
        job_context,
    );
    scheduler
        .register_job(Arc::new(CancellationSweep::new(Duration::from_secs(
            config.sweep.tick_interval_secs,
        ))))
        .await;
    tokio::spawn(async move { scheduler.run().await });

    let worker = QueueWorker::new(
        work_queue.clone(),
        Arc::new(DeactivateRegistration::new(registrations.clone())),
        Duration::from_secs(config.sweep.queue_poll_interval_secs),
        config.sweep.max_attempts,
        shutdown_token.child_token(),
    );
    tokio::spawn(worker.run());

    let state = ServerState {
        config: ServerConfig {
            requests_logging_level: config.logging_level.clone(),
            port: config.port,
            admin_token: config.admin_token.clone(),
        },
        start_time: Instant::now(),
        registrations,
        server_store,
        work_queue,
        scheduler_handle: Some(scheduler_handle),
        contract_mailer,
        hash: env!("GIT_HASH").to_string(),
    };

    // Ctrl-C flips the shutdown token, which stops the scheduler, the queue
    // worker and the HTTP server.
    let ctrl_c_token = shutdown_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, shutting down");
            ctrl_c_token.cancel();
        }
    });

    info!("Ready to serve at port {}!", config.port);
    run_server(state, shutdown_token).await
}
