use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// 0 = info, 1 = debug (with hyper::proto::h1 suppressed), 2+ = trace (all logs)
fn verbosity_directives(verbose_level: u8) -> &'static str {
    match verbose_level {
        0 => "info",
        1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn",
        _ => "trace",
    }
}

fn console_filter(verbose_level: u8, quiet: bool) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_directives(verbose_level)))
}

/// The log file keeps at least info level, even in quiet mode
fn file_filter(verbose_level: u8) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_directives(verbose_level)))
}

/// Log to stderr and append to `log_file`.
///
/// The returned guard flushes the file writer on drop and must be held until exit.
pub fn init_logging(verbose_level: u8, quiet: bool, log_file: &Path) -> Result<WorkerGuard> {
    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal());

    let stderr_layer: Box<dyn Layer<Registry> + Send + Sync> = if json {
        fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr)
            .with_filter(console_filter(verbose_level, quiet))
            .boxed()
    } else {
        fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr)
            .with_filter(console_filter(verbose_level, quiet))
            .boxed()
    };

    let log_dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(log_dir)?;
    let log_filename = log_file
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid log file path: {}", log_file.display()))?;

    // Single file, appended across runs
    let file_appender = RollingFileAppender::new(Rotation::NEVER, log_dir, log_filename);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(false)
        .with_writer(file_writer)
        .with_filter(file_filter(verbose_level));

    Registry::default()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_directives() {
        assert_eq!(verbosity_directives(0), "info");
        assert!(verbosity_directives(1).starts_with("debug"));
        assert!(verbosity_directives(1).contains("hyper::proto::h1=warn"));
        assert_eq!(verbosity_directives(2), "trace");
        assert_eq!(verbosity_directives(5), "trace");
    }
}
