//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own databases, a scheduler,
//! a queue worker and an in-memory mail recorder.

use super::constants::*;
use club_registry_server::mailer::{
    ContractMailer, ContractPdfRenderer, MailError, MailTemplateRegistry, Mailer, OutgoingMail,
};
use club_registry_server::registry_store::{RegistrationStore, SqliteRegistrationStore};
use club_registry_server::scheduler::jobs::CancellationSweep;
use club_registry_server::scheduler::{create_scheduler, JobContext, SystemClock};
use club_registry_server::server::{make_app, RequestsLoggingLevel, ServerConfig, ServerState};
use club_registry_server::server_store::{ServerStore, SqliteServerStore};
use club_registry_server::work_queue::{
    DeactivateRegistration, QueueWorker, SqliteWorkQueueStore, WorkQueueStore,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Captures outgoing mail instead of delivering it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    pub fn sent_mail(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// Produces a canned PDF without invoking any external tool.
struct CannedPdfRenderer;

#[async_trait::async_trait]
impl ContractPdfRenderer for CannedPdfRenderer {
    async fn render_pdf(&self, _html: &str) -> Result<Vec<u8>, MailError> {
        Ok(b"%PDF-1.4 canned test document".to_vec())
    }
}

/// Test server instance with isolated databases
///
/// When dropped, the server, scheduler and queue worker shut down and temp
/// resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Stores for direct database access in tests
    pub registrations: Arc<dyn RegistrationStore>,
    pub server_store: Arc<dyn ServerStore>,
    pub work_queue: Arc<dyn WorkQueueStore>,

    /// Captured outgoing mail
    pub mailer: Arc<RecordingMailer>,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    shutdown_token: CancellationToken,
}

impl TestServer {
    /// Spawns a new test server on a random port with a running scheduler
    /// and queue worker.
    ///
    /// # Panics
    ///
    /// Panics if database creation, port binding or server startup fails, or
    /// if the server doesn't become ready within the timeout.
    pub async fn spawn() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let registrations: Arc<dyn RegistrationStore> = Arc::new(
            SqliteRegistrationStore::new(temp_dir.path().join("registry.db"))
                .expect("Failed to open registration store"),
        );
        let server_store: Arc<dyn ServerStore> = Arc::new(
            SqliteServerStore::new(temp_dir.path().join("server.db"))
                .expect("Failed to open server store"),
        );
        let work_queue: Arc<dyn WorkQueueStore> = Arc::new(
            SqliteWorkQueueStore::new(temp_dir.path().join("queue.db"))
                .expect("Failed to open work queue"),
        );

        let mailer = Arc::new(RecordingMailer::default());
        let contract_mailer = Arc::new(ContractMailer::new(
            Arc::new(MailTemplateRegistry::new().expect("Failed to build templates")),
            Arc::new(CannedPdfRenderer),
            mailer.clone(),
        ));

        let shutdown_token = CancellationToken::new();

        // Long tick interval so sweeps only happen via the run-now endpoint,
        // but the first scheduled run still fires once at startup.
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
            .register_job(Arc::new(CancellationSweep::new(Duration::from_secs(3600))))
            .await;
        tokio::spawn(async move { scheduler.run().await });

        let worker = QueueWorker::new(
            work_queue.clone(),
            Arc::new(DeactivateRegistration::new(registrations.clone())),
            Duration::from_millis(POLL_INTERVAL_MS),
            3,
            shutdown_token.child_token(),
        );
        tokio::spawn(worker.run());

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = ServerState {
            config: ServerConfig {
                port,
                requests_logging_level: RequestsLoggingLevel::None,
                admin_token: ADMIN_TOKEN.to_string(),
            },
            start_time: Instant::now(),
            registrations: registrations.clone(),
            server_store: server_store.clone(),
            work_queue: work_queue.clone(),
            scheduler_handle: Some(scheduler_handle),
            contract_mailer: Some(contract_mailer),
            hash: "test".to_string(),
        };
        let app = make_app(state);

        let serve_shutdown = shutdown_token.clone();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { serve_shutdown.cancelled().await })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            registrations,
            server_store,
            work_queue,
            mailer,
            _temp_dir: temp_dir,
            shutdown_token,
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the health endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/health", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
                }
            }
        }
    }

    /// Polls until `condition` returns true or the timeout expires.
    pub async fn wait_until<F>(&self, timeout: Duration, mut condition: F) -> bool
    where
        F: FnMut() -> bool,
    {
        let start = std::time::Instant::now();
        while start.elapsed() < timeout {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
        condition()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown_token.cancel();
        // TempDir will be cleaned up automatically
    }
}
