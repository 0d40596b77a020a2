use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use typhoon_kml::{
    config::Config,
    job::{self, Outcome},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();

    // ─── 2) configure paths ──────────────────────────────────────────
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // ─── 3) locate + fetch ───────────────────────────────────────────
    match job::run(&config).await {
        Ok(outcome) => {
            match outcome {
                Outcome::Written { .. } => info!("all done"),
                Outcome::NoMatch { .. } => info!("nothing to download"),
                Outcome::FetchFailed { .. } => info!("download failed; table was still processed"),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
