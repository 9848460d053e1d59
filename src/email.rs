use anyhow::{Context, Result};
use lettre::message::{Mailbox, MultiPart, SinglePart, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::EmailConfig;

/// One usuario's block inside a digest email.
#[derive(Debug, Clone)]
pub struct DigestEntry {
    pub usuario_nombre: String,
    pub actividades: Vec<String>,
    pub incidencias: Vec<String>,
}

/// Build the SMTP transport from config.
///
/// Without credentials (local MailDev style) a direct unauthenticated
/// connection is used; otherwise an authenticated relay.
pub fn build_mailer(config: &EmailConfig) -> Result<SmtpTransport> {
    let mailer = if config.smtp_username.is_empty() && config.smtp_password.is_empty() {
        SmtpTransport::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .build()
    } else {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        );

        SmtpTransport::relay(&config.smtp_host)
            .context("Failed to create SMTP transport")?
            .port(config.smtp_port)
            .credentials(credentials)
            .build()
    };

    Ok(mailer)
}

/// Send one digest email to a familiar, one block per associated usuario.
pub fn send_digest(
    mailer: &SmtpTransport,
    config: &EmailConfig,
    to_email: &str,
    subject: &str,
    entries: &[DigestEntry],
) -> Result<()> {
    let from_mailbox: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
        .parse()
        .context("Failed to parse from email")?;

    let to_mailbox: Mailbox = to_email.parse().context("Failed to parse to email")?;

    let email = Message::builder()
        .from(from_mailbox)
        .to(to_mailbox)
        .subject(subject)
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(render_text(entries)),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(render_html(entries)),
                ),
        )
        .context("Failed to build email message")?;

    mailer.send(&email).context("Failed to send email")?;

    tracing::info!(to = to_email, subject, "digest email sent");

    Ok(())
}

fn render_text(entries: &[DigestEntry]) -> String {
    let mut body = String::new();
    for entry in entries {
        body.push_str(&format!("{}\n", entry.usuario_nombre));
        if !entry.actividades.is_empty() {
            body.push_str("  Actividades:\n");
            for actividad in &entry.actividades {
                body.push_str(&format!("  - {actividad}\n"));
            }
        }
        if !entry.incidencias.is_empty() {
            body.push_str("  Incidencias:\n");
            for incidencia in &entry.incidencias {
                body.push_str(&format!("  - {incidencia}\n"));
            }
        }
        body.push('\n');
    }
    body
}

fn render_html(entries: &[DigestEntry]) -> String {
    let mut body = String::from("<html><body>");
    for entry in entries {
        body.push_str(&format!("<h3>{}</h3>", entry.usuario_nombre));
        if !entry.actividades.is_empty() {
            body.push_str("<p>Actividades:</p><ul>");
            for actividad in &entry.actividades {
                body.push_str(&format!("<li>{actividad}</li>"));
            }
            body.push_str("</ul>");
        }
        if !entry.incidencias.is_empty() {
            body.push_str("<p>Incidencias:</p><ul>");
            for incidencia in &entry.incidencias {
                body.push_str(&format!("<li>{incidencia}</li>"));
            }
            body.push_str("</ul>");
        }
    }
    body.push_str("</body></html>");
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_digest_lists_activities_and_incidents() {
        let entries = vec![DigestEntry {
            usuario_nombre: "Pablo Ruiz".into(),
            actividades: vec!["Piscina".into(), "Pintura".into()],
            incidencias: vec!["AGITACION".into()],
        }];
        let body = render_text(&entries);
        assert!(body.contains("Pablo Ruiz"));
        assert!(body.contains("- Piscina"));
        assert!(body.contains("- AGITACION"));
    }

    #[test]
    fn html_digest_skips_empty_sections() {
        let entries = vec![DigestEntry {
            usuario_nombre: "Pablo Ruiz".into(),
            actividades: vec!["Piscina".into()],
            incidencias: vec![],
        }];
        let body = render_html(&entries);
        assert!(body.contains("<li>Piscina</li>"));
        assert!(!body.contains("Incidencias"));
    }
}
