//! Mail templates, pre-registered in a minijinja environment.
//!
//! Templates are registered explicitly at startup so a typo in a template
//! name or body fails fast instead of surfacing at send time.

use super::MailError;
use minijinja::Environment;

pub const CLUB_CONTRACT_TEMPLATE: &str = "club_contract";

const CLUB_CONTRACT_SUBJECT: &str = "Club contract for {{ club_name }}";

const CLUB_CONTRACT_BODY: &str = "\
Hello,

attached you'll find the current contract for {{ club_name }}.

Registration reference: {{ registration_id }}
Generated: {{ generated_at }}
";

const CLUB_CONTRACT_DOCUMENT: &str = "\
<!DOCTYPE html>
<html>
<head><meta charset=\"utf-8\"><title>Club contract</title></head>
<body>
<h1>Club registration contract</h1>
<p>Club: {{ club_name }}</p>
<p>Contact: {{ contact_email }}</p>
<p>Registration reference: {{ registration_id }}</p>
<p>Generated: {{ generated_at }}</p>
</body>
</html>
";

/// Context available to all contract templates.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ContractContext {
    pub club_name: String,
    pub contact_email: String,
    pub registration_id: String,
    /// ISO 8601 timestamp of when the mail was generated.
    pub generated_at: String,
}

/// A rendered mail template: subject, plain-text body and the HTML document
/// that gets turned into the PDF attachment.
#[derive(Debug, Clone)]
pub struct RenderedTemplate {
    pub subject: String,
    pub body: String,
    pub document_html: String,
}

/// Registry of known mail templates.
pub struct MailTemplateRegistry {
    env: Environment<'static>,
}

impl MailTemplateRegistry {
    pub fn new() -> Result<Self, MailError> {
        let mut env = Environment::new();
        for (name, source) in [
            (template_part(CLUB_CONTRACT_TEMPLATE, "subject"), CLUB_CONTRACT_SUBJECT),
            (template_part(CLUB_CONTRACT_TEMPLATE, "body"), CLUB_CONTRACT_BODY),
            (template_part(CLUB_CONTRACT_TEMPLATE, "document"), CLUB_CONTRACT_DOCUMENT),
        ] {
            env.add_template_owned(name, source)
                .map_err(|e| MailError::Template(e.to_string()))?;
        }
        Ok(Self { env })
    }

    pub fn render(
        &self,
        template: &str,
        ctx: &ContractContext,
    ) -> Result<RenderedTemplate, MailError> {
        Ok(RenderedTemplate {
            subject: self.render_part(template, "subject", ctx)?,
            body: self.render_part(template, "body", ctx)?,
            document_html: self.render_part(template, "document", ctx)?,
        })
    }

    fn render_part(
        &self,
        template: &str,
        part: &str,
        ctx: &ContractContext,
    ) -> Result<String, MailError> {
        let tmpl = self
            .env
            .get_template(&template_part(template, part))
            .map_err(|_| MailError::UnknownTemplate(template.to_string()))?;
        tmpl.render(ctx)
            .map_err(|e| MailError::Template(e.to_string()))
    }
}

fn template_part(template: &str, part: &str) -> String {
    format!("{}.{}", template, part)
}
