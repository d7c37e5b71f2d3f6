// Path: crates/telemetry/src/init.rs
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// The filter applied when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Initializes the global `tracing` subscriber for structured JSON logging.
///
/// Honors `RUST_LOG`; falls back to [`DEFAULT_FILTER`].
pub fn init_tracing() -> Result<(), anyhow::Error> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter)
}

/// Initializes the global subscriber with an explicit filter directive such as
/// `"prover=debug,prover.rpc=trace"`.
pub fn init_tracing_with(directives: &str) -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_new(directives)?;
    install(filter)
}

fn install(filter: EnvFilter) -> Result<(), anyhow::Error> {
    let fmt_layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());
    let subscriber = Registry::default().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    // `log` records from dependencies are forwarded once a subscriber exists.
    tracing_log::LogTracer::init()?;
    Ok(())
}

/// Installs a plain-text subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call in a process wins.
pub fn init_test_tracing() {
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_directives() {
        assert!(init_tracing_with("prover=notalevel").is_err());
    }

    #[test]
    fn global_subscriber_installs_once() {
        let first = init_tracing_with("prover=debug");
        assert!(first.is_ok());
        tracing::info!(target: "prover", height = 7u64, "subscriber installed");
        assert!(init_tracing().is_err());
    }
}
