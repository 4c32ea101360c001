//! Contract mail: template rendering, PDF generation and SMTP delivery.

mod pdf;
mod service;
mod smtp;
mod templates;

pub use pdf::{CommandPdfRenderer, ContractPdfRenderer};
pub use service::{ContractMailer, CONTRACT_ATTACHMENT_FILENAME};
pub use smtp::{MailAttachment, Mailer, OutgoingMail, SmtpMailer};
pub use templates::{
    ContractContext, MailTemplateRegistry, RenderedTemplate, CLUB_CONTRACT_TEMPLATE,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Unknown mail template: {0}")]
    UnknownTemplate(String),
    #[error("Template error: {0}")]
    Template(String),
    #[error("PDF generation failed: {0}")]
    Pdf(String),
    #[error("SMTP error: {0}")]
    Smtp(String),
}
