use {
    clap::Parser,
    secrecy::Secret,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use liaison_config::LiaisonConfig;

#[derive(Parser)]
#[command(name = "liaison", about = "Liaison — Telegram support-relay bot")]
struct Cli {
    /// Path to liaison.toml (overrides standard-location discovery).
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Bot token (overrides the config file value).
    #[arg(long, env = "LIAISON_BOT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

/// Initialise tracing from `RUST_LOG` or the `--log-level` fallback.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<LiaisonConfig> {
    let mut config = match &cli.config {
        Some(path) => liaison_config::load_config(path)?,
        None => liaison_config::discover_and_load(),
    };

    if let Some(token) = &cli.token {
        config.telegram.token = Secret::new(token.clone());
    }

    config.ensure_runnable()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap reads env-backed arguments' defaults.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_telemetry(&cli);

    let config = load_config(&cli)?;
    let cancel = liaison_telegram::start_polling(config).await?;

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    cancel.cancel();

    Ok(())
}
