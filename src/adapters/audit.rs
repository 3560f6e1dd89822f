use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Append-only audit trail of delivery attempts. Each line is written
/// under an exclusive file lock so concurrent requests never interleave.
/// Logging problems are reported and swallowed; they must not change the
/// response the submitter sees.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: Arc<PathBuf>,
}

impl AuditLog {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path: Arc::new(path) }
    }

    pub async fn record(&self, delivered: bool, submitter: &str, diagnostic: &str) {
        let line = format_line(OffsetDateTime::now_utc(), delivered, submitter, diagnostic);
        let path = Arc::clone(&self.path);

        let result = tokio::task::spawn_blocking(move || append_line(&path, &line)).await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(error)) => tracing::warn!(error = %error, "Failed to append audit log entry"),
            Err(error) => tracing::warn!(error = %error, "Audit log task failed"),
        }
    }
}

fn format_line(at: OffsetDateTime, delivered: bool, submitter: &str, diagnostic: &str) -> String {
    let timestamp = at.format(&Rfc3339).unwrap_or_else(|_| "-".into());
    let status = if delivered { "OK" } else { "FAIL" };
    format!("[{timestamp}] {status} | {submitter} | {diagnostic}\n")
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = std::fs::File::options().create(true).append(true).open(path)?;
    // Held for the duration of the append; released when the handle closes.
    file.lock()?;
    file.write_all(line.as_bytes())?;
    file.flush()
}
