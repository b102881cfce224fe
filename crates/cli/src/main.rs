mod config_commands;
mod convert_commands;
mod media_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    msgbridge_config::BridgeConfig,
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "msgbridge",
    version,
    about = "msgbridge: chat event to destination envelope converter"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery in ./ and the user config dir).
    #[arg(long, global = true, env = "MSGBRIDGE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an inbound message (JSON) into an outbound envelope.
    Convert(convert_commands::ConvertArgs),
    /// Parse a geo: URI.
    Geo {
        /// URI such as `geo:51.5,-0.12;u=35`.
        uri: String,
    },
    /// Show mime type, pixel size and thumbnail size of an image file.
    Probe {
        file: PathBuf,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

/// Logs go to stderr so stdout stays clean for command output.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<BridgeConfig> {
    match &cli.config {
        Some(path) => msgbridge_config::load_config(path),
        None => Ok(msgbridge_config::discover_and_load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "msgbridge starting");

    match &cli.command {
        Commands::Convert(args) => {
            let config = load_config(&cli)?;
            convert_commands::handle_convert(args, &config).await
        },
        Commands::Geo { uri } => media_commands::geo(uri),
        Commands::Probe { file } => media_commands::probe(file).await,
        Commands::Config { action } => config_commands::handle_config(action, cli.config.as_deref()),
    }
}
