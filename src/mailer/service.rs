use super::pdf::ContractPdfRenderer;
use super::smtp::{MailAttachment, Mailer, OutgoingMail};
use super::templates::{ContractContext, MailTemplateRegistry, CLUB_CONTRACT_TEMPLATE};
use super::MailError;
use crate::registry_store::ClubRegistration;
use std::sync::Arc;
use tracing::info;

pub const CONTRACT_ATTACHMENT_FILENAME: &str = "club_registration_form.pdf";

/// Assembles and sends the contract mail for a registration: renders the
/// templates, turns the document into a PDF and mails it to the club's
/// contact address.
pub struct ContractMailer {
    templates: Arc<MailTemplateRegistry>,
    pdf_renderer: Arc<dyn ContractPdfRenderer>,
    mailer: Arc<dyn Mailer>,
}

impl ContractMailer {
    pub fn new(
        templates: Arc<MailTemplateRegistry>,
        pdf_renderer: Arc<dyn ContractPdfRenderer>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            templates,
            pdf_renderer,
            mailer,
        }
    }

    pub async fn send_contract(&self, registration: &ClubRegistration) -> Result<(), MailError> {
        let ctx = ContractContext {
            club_name: registration.club_name.clone(),
            contact_email: registration.contact_email.clone(),
            registration_id: registration.id.clone(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        };

        let rendered = self.templates.render(CLUB_CONTRACT_TEMPLATE, &ctx)?;
        let pdf = self.pdf_renderer.render_pdf(&rendered.document_html).await?;

        let mail = OutgoingMail {
            to: registration.contact_email.clone(),
            subject: rendered.subject,
            body: rendered.body,
            attachment: Some(MailAttachment {
                filename: CONTRACT_ATTACHMENT_FILENAME.to_string(),
                mime_type: "application/pdf".to_string(),
                content: pdf,
            }),
        };

        self.mailer.send(&mail).await?;
        info!(
            "Sent contract for registration {} to {}",
            registration.id, registration.contact_email
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StaticPdfRenderer;

    #[async_trait::async_trait]
    impl ContractPdfRenderer for StaticPdfRenderer {
        async fn render_pdf(&self, _html: &str) -> Result<Vec<u8>, MailError> {
            Ok(b"%PDF-1.4 fake".to_vec())
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingMail>>,
    }

    #[async_trait::async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    fn sample_registration() -> ClubRegistration {
        ClubRegistration {
            id: "reg-42".to_string(),
            club_name: "Chess Club".to_string(),
            contact_email: "chess@example.org".to_string(),
            approved: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[tokio::test]
    async fn sends_mail_with_pdf_attachment() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = ContractMailer::new(
            Arc::new(MailTemplateRegistry::new().unwrap()),
            Arc::new(StaticPdfRenderer),
            mailer.clone(),
        );

        service.send_contract(&sample_registration()).await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "chess@example.org");
        assert_eq!(sent[0].subject, "Club contract for Chess Club");
        assert!(sent[0].body.contains("reg-42"));

        let attachment = sent[0].attachment.as_ref().unwrap();
        assert_eq!(attachment.filename, CONTRACT_ATTACHMENT_FILENAME);
        assert_eq!(attachment.mime_type, "application/pdf");
        assert!(attachment.content.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn pdf_failure_prevents_sending() {
        struct FailingPdfRenderer;

        #[async_trait::async_trait]
        impl ContractPdfRenderer for FailingPdfRenderer {
            async fn render_pdf(&self, _html: &str) -> Result<Vec<u8>, MailError> {
                Err(MailError::Pdf("converter crashed".to_string()))
            }
        }

        let mailer = Arc::new(RecordingMailer::default());
        let service = ContractMailer::new(
            Arc::new(MailTemplateRegistry::new().unwrap()),
            Arc::new(FailingPdfRenderer),
            mailer.clone(),
        );

        let result = service.send_contract(&sample_registration()).await;
        assert!(matches!(result, Err(MailError::Pdf(_))));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }
}
