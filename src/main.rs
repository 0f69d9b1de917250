use anyhow::Result;
use tessera_uci::{LogSink, UciEngine};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let sink = LogSink::new();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(sink.clone())
        .with_ansi(false)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "tessera starting");
    UciEngine::new().with_log_sink(sink).run()?;
    Ok(())
}
