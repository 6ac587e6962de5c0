use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Initialize structured logging on stderr.
/// `RUST_LOG` wins over the configured level when it is set.
pub fn init_telemetry(log_level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;

    if json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .try_init()?;
    }

    tracing::debug!(log_level, json, "Telemetry initialized");
    Ok(())
}

/// Span wrapping both background loops of one engine
pub fn create_engine_span(engine_id: &Uuid) -> tracing::Span {
    tracing::info_span!(
        "traffic_light",
        engine.id = %engine_id,
        otel.kind = "internal"
    )
}
