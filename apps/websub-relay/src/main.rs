use anyhow::Result;
use websub_relay::run;
use wsr_core::{ConfigError, RelayConfig};
use wsr_telemetry::{TelemetryConfig, init_telemetry, shutdown_telemetry, telemetry_enabled};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env("websub-relay", env!("CARGO_PKG_VERSION"));
    init_telemetry(telemetry)?;
    tracing::debug!(otel = telemetry_enabled(), "telemetry initialised");

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(err @ ConfigError::MissingPort) => {
            println!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let result = run(config).await;
    shutdown_telemetry();
    result
}
