mod admin_routes;
pub mod auth;
pub mod config;
mod registration_routes;
mod requests_logging;
pub mod server;
pub mod state;

pub use auth::{AdminSession, Permission};
pub use config::ServerConfig;
pub use requests_logging::{log_requests, RequestsLoggingLevel};
pub use server::{make_app, run_server};
pub use state::ServerState;
