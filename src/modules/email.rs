//! Ad-hoc HTML mail with an optional attachment

use std::path::Path;

use tracing::info;

use crate::core::OpsError;
use crate::infrastructure::mail::Mailer;

/// Read the HTML body from `body_file` and send it.
pub async fn send_file(
    mailer: &Mailer,
    subject: &str,
    body_file: &Path,
    attachment: Option<&Path>,
) -> Result<(), OpsError> {
    let html = tokio::fs::read_to_string(body_file).await?;
    if let Some(path) = attachment {
        info!("Attaching {}", path.display());
    }
    mailer.send(subject, &html, attachment).await
}

/// HTML body announcing an exported report
pub fn export_notice(records: usize, file_name: &str) -> String {
    format!(
        "<p>{} log record(s) exported.</p>\n<p>See the attached file <b>{}</b>.</p>\n",
        records, file_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mail::MailConfig;

    fn mailer() -> Mailer {
        let config: MailConfig = toml::from_str(
            r#"
                from = "ops@example.com"
                to = ["dba@example.com"]
                smtp = { host = "smtp.example.com" }
                credentials = { username = "ops", password = "secret" }
            "#,
        )
        .unwrap();
        Mailer::new(&config).unwrap()
    }

    #[test]
    fn test_export_notice() {
        let body = export_notice(3, "mysql.csv");
        assert!(body.contains("3 log record(s) exported"));
        assert!(body.contains("<b>mysql.csv</b>"));
    }

    #[tokio::test]
    async fn test_missing_body_file_fails_before_connecting() {
        let err = send_file(&mailer(), "subject", Path::new("/nonexistent/body.html"), None)
            .await
            .unwrap_err();
        assert_eq!(err.exit_status(), 7);
    }
}
