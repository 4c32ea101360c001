mod file_config;

pub use file_config::{FileConfig, MailConfig, SweepConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub admin_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub admin_token: String,

    // Feature configs (with defaults)
    pub sweep: SweepSettings,

    // Mail is optional; without it contract mails are disabled.
    pub mail: Option<MailSettings>,
}

#[derive(Debug, Clone)]
pub struct SweepSettings {
    pub tick_interval_secs: u64,
    pub queue_poll_interval_secs: u64,
    pub max_attempts: u32,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            // One tick per hour keeps the daily decision timely without
            // depending on the process being up at a particular moment.
            tick_interval_secs: 3600,
            queue_poll_interval_secs: 5,
            max_attempts: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub smtp_host: String,
    pub smtp_port: Option<u16>,
    pub tls: Option<bool>,
    pub from: String,
    pub pdf_command: String,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let admin_token = match file.admin_token.or_else(|| cli.admin_token.clone()) {
            Some(token) if !token.is_empty() => token,
            _ => bail!("admin_token must be specified via --admin-token or in config file"),
        };

        let sweep_file = file.sweep.unwrap_or_default();
        let sweep_defaults = SweepSettings::default();
        let sweep = SweepSettings {
            tick_interval_secs: sweep_file
                .tick_interval_secs
                .unwrap_or(sweep_defaults.tick_interval_secs),
            queue_poll_interval_secs: sweep_file
                .queue_poll_interval_secs
                .unwrap_or(sweep_defaults.queue_poll_interval_secs),
            max_attempts: sweep_file.max_attempts.unwrap_or(sweep_defaults.max_attempts),
        };
        if sweep.tick_interval_secs == 0 {
            bail!("sweep.tick_interval_secs must be greater than zero");
        }

        let mail = match file.mail {
            Some(mail_file) => {
                if mail_file.pdf_command.is_empty() {
                    bail!("mail.pdf_command must not be empty");
                }
                Some(MailSettings {
                    smtp_host: mail_file.smtp_host,
                    smtp_port: mail_file.smtp_port,
                    tls: mail_file.tls,
                    from: mail_file.from,
                    pdf_command: mail_file.pdf_command,
                })
            }
            None => None,
        };

        Ok(Self {
            db_dir,
            port,
            logging_level,
            admin_token,
            sweep,
            mail,
        })
    }

    pub fn registry_db_path(&self) -> PathBuf {
        self.db_dir.join("registry.db")
    }

    pub fn server_db_path(&self) -> PathBuf {
        self.db_dir.join("server.db")
    }

    pub fn queue_db_path(&self) -> PathBuf {
        self.db_dir.join("queue.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli_with_db_dir(dir: &TempDir) -> CliConfig {
        CliConfig {
            db_dir: Some(dir.path().to_path_buf()),
            port: 3001,
            logging_level: RequestsLoggingLevel::Path,
            admin_token: Some("cli-token".to_string()),
        }
    }

    #[test]
    fn cli_only_resolution() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::resolve(&cli_with_db_dir(&dir), None).unwrap();

        assert_eq!(config.port, 3001);
        assert_eq!(config.admin_token, "cli-token");
        assert_eq!(config.sweep.tick_interval_secs, 3600);
        assert!(config.mail.is_none());
    }

    #[test]
    fn file_overrides_cli() {
        let dir = TempDir::new().unwrap();
        let file = FileConfig {
            port: Some(9000),
            admin_token: Some("file-token".to_string()),
            logging_level: Some("headers".to_string()),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli_with_db_dir(&dir), Some(file)).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.admin_token, "file-token");
        assert_eq!(config.logging_level, RequestsLoggingLevel::Headers);
    }

    #[test]
    fn missing_db_dir_is_an_error() {
        let cli = CliConfig {
            admin_token: Some("token".to_string()),
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn missing_admin_token_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut cli = cli_with_db_dir(&dir);
        cli.admin_token = None;
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn db_paths_live_under_db_dir() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::resolve(&cli_with_db_dir(&dir), None).unwrap();
        assert_eq!(config.registry_db_path(), dir.path().join("registry.db"));
        assert_eq!(config.server_db_path(), dir.path().join("server.db"));
        assert_eq!(config.queue_db_path(), dir.path().join("queue.db"));
    }

    #[test]
    fn empty_pdf_command_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = FileConfig {
            mail: Some(MailConfig {
                smtp_host: "smtp.example.com".to_string(),
                smtp_port: None,
                tls: None,
                from: "registry@example.com".to_string(),
                pdf_command: String::new(),
            }),
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli_with_db_dir(&dir), Some(file)).is_err());
    }
}
