use super::MailError;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Turns a rendered HTML document into a PDF.
#[async_trait::async_trait]
pub trait ContractPdfRenderer: Send + Sync {
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, MailError>;
}

/// Renders PDFs by shelling out to an external converter such as
/// `wkhtmltopdf` or `weasyprint`.
///
/// The command is invoked as `<command> <input.html> <output.pdf>` inside a
/// temporary directory that is removed afterwards.
pub struct CommandPdfRenderer {
    command: String,
}

impl CommandPdfRenderer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait::async_trait]
impl ContractPdfRenderer for CommandPdfRenderer {
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, MailError> {
        let dir = tempfile::tempdir().map_err(|e| MailError::Pdf(e.to_string()))?;
        let input = dir.path().join("contract.html");
        let output = dir.path().join("contract.pdf");

        tokio::fs::write(&input, html)
            .await
            .map_err(|e| MailError::Pdf(e.to_string()))?;

        debug!("Rendering PDF via {}", self.command);
        let status = tokio::process::Command::new(&self.command)
            .arg(&input)
            .arg(&output)
            .status()
            .await
            .map_err(|e| MailError::Pdf(format!("failed to run {}: {}", self.command, e)))?;

        if !status.success() {
            return Err(MailError::Pdf(format!(
                "{} exited with {}",
                self.command, status
            )));
        }

        let mut pdf = Vec::new();
        tokio::fs::File::open(&output)
            .await
            .map_err(|e| MailError::Pdf(e.to_string()))?
            .read_to_end(&mut pdf)
            .await
            .map_err(|e| MailError::Pdf(e.to_string()))?;

        if pdf.is_empty() {
            return Err(MailError::Pdf(format!(
                "{} produced an empty document",
                self.command
            )));
        }

        Ok(pdf)
    }
}
