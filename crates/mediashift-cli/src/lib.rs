//! Terminal output and tracing setup for the `mediashift` binary.

use mediashift_core::{AppError, BatchResult, MigrationConfig, MigrationStatistics, OffloadSettings};
use mediashift_services::SchedulerRun;

/// Validated offload settings read from the environment. Database settings are not
/// read, so commands that only talk to the object store work without `DATABASE_URL`.
pub fn offload_config_from_env() -> Result<MigrationConfig, AppError> {
    MigrationConfig::from_settings(&OffloadSettings::from_env())
}

/// Summary lines for a `migrate` run, followed by every per-item error.
pub fn format_batch_summary(result: &BatchResult, dry_run: bool) -> String {
    let mut out = String::new();
    if let Some(message) = &result.message {
        out.push_str(message);
        out.push('\n');
    }
    let verb = if dry_run { "Would migrate" } else { "Migrated" };
    out.push_str(&format!(
        "{} {} of {} file(s)\n",
        verb, result.migrated, result.total
    ));
    push_errors(&mut out, &result.errors);
    out
}

pub fn format_scheduler_run(run: &SchedulerRun) -> String {
    let mut out = format!(
        "Migrated {} of {} file(s) in {} batch(es)\n",
        run.migrated, run.examined, run.batches
    );
    push_errors(&mut out, &run.errors);
    out
}

pub fn format_status(stats: &MigrationStatistics, configured: bool) -> String {
    let mut out = format!(
        "Total: {}\nLocal: {}\nRemote: {}\nProgress: {:.2}%\n",
        stats.total, stats.local, stats.remote, stats.percentage
    );
    if !configured {
        out.push_str("Warning: offload is not configured\n");
    }
    out
}

fn push_errors(out: &mut String, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    out.push_str(&format!("{} error(s):\n", errors.len()));
    for error in errors {
        out.push_str("  ");
        out.push_str(error);
        out.push('\n');
    }
}

/// Initialize tracing for CLI binaries. `LOG_FORMAT=json` switches to JSON lines.
/// Logs go to stderr so they never mix with command output.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_summary_lists_errors() {
        let result = BatchResult {
            migrated: 1,
            total: 3,
            errors: vec![
                "Item 2: transfer of 'uploads/b.jpg' failed".to_string(),
                "Item 3: catalog lookup failed".to_string(),
            ],
            message: None,
            next_cursor: Some(3),
        };

        let out = format_batch_summary(&result, false);
        assert!(out.starts_with("Migrated 1 of 3 file(s)\n"));
        assert!(out.contains("2 error(s):\n"));
        assert!(out.contains("  Item 2: transfer"));
        assert!(out.contains("  Item 3: catalog"));
    }

    #[test]
    fn dry_run_summary() {
        let result = BatchResult {
            migrated: 4,
            total: 5,
            ..BatchResult::default()
        };
        assert_eq!(
            format_batch_summary(&result, true),
            "Would migrate 4 of 5 file(s)\n"
        );
    }

    #[test]
    fn empty_summary_includes_message() {
        let out = format_batch_summary(&BatchResult::empty("No files to migrate"), false);
        assert_eq!(out, "No files to migrate\nMigrated 0 of 0 file(s)\n");
    }

    #[test]
    fn status_warns_when_unconfigured() {
        let stats = MigrationStatistics::from_counts(4, 3, 1);
        let out = format_status(&stats, false);
        assert!(out.contains("Progress: 25.00%"));
        assert!(out.ends_with("Warning: offload is not configured\n"));
        assert!(!format_status(&stats, true).contains("Warning"));
    }

    #[test]
    fn offload_config_ignores_database_settings() {
        std::env::remove_var("DATABASE_URL");
        std::env::set_var("OFFLOAD_S3_BUCKET", "media-bucket");
        std::env::set_var("OFFLOAD_S3_ACCESS_KEY_ID", "AKIATEST");
        std::env::set_var("OFFLOAD_S3_SECRET_ACCESS_KEY", "test-secret");
        std::env::set_var("OFFLOAD_CDN_URL", "https://media-bucket.s3.amazonaws.com");

        let config = offload_config_from_env().unwrap();

        assert_eq!(config.bucket, "media-bucket");
        assert_eq!(config.cdn_base_url(), "https://media-bucket.s3.amazonaws.com");
    }

    #[test]
    fn scheduler_summary() {
        let run = SchedulerRun {
            batches: 2,
            migrated: 3,
            examined: 4,
            errors: vec!["Item 9: catalog lookup failed".to_string()],
        };
        let out = format_scheduler_run(&run);
        assert!(out.starts_with("Migrated 3 of 4 file(s) in 2 batch(es)\n"));
        assert!(out.contains("  Item 9"));
    }
}
