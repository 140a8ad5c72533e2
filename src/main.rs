use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dnsrotate::{
    config::{Overrides, Settings},
    daemon,
};

#[derive(Parser)]
#[command(name = "dnsrotate")]
#[command(about = "DNS address rotator - cycles Cloudflare A records through a pool of addresses")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the system location when present)
    #[arg(short, long, global = true, env = "DNSROTATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rotate the target records until interrupted
    Run(RotateArgs),

    /// Show which target hostnames resolve to an existing record
    Check(RotateArgs),

    /// Show configuration file location and effective settings
    Config(RotateArgs),
}

#[derive(Args, Debug, Default)]
struct RotateArgs {
    /// Cloudflare account email
    #[arg(short, long, env = "CLOUDFLARE_EMAIL")]
    email: Option<String>,

    /// Cloudflare API key
    #[arg(short = 'k', long, env = "CLOUDFLARE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Cloudflare zone ID
    #[arg(short, long, env = "CLOUDFLARE_ZONE_ID")]
    zone_id: Option<String>,

    /// File with one hostname per line
    #[arg(short, long, env = "DNSROTATE_DOMAINS_FILE")]
    domains_file: Option<PathBuf>,

    /// File with one address per line
    #[arg(short, long, env = "DNSROTATE_IPS_FILE")]
    ips_file: Option<PathBuf>,

    /// Seconds to wait after each record update [default: 300]
    #[arg(short = 't', long, alias = "duration", env = "DNSROTATE_INTERVAL")]
    interval: Option<u64>,

    /// Log level when RUST_LOG is unset [default: info]
    #[arg(long, env = "DNSROTATE_LOG_LEVEL")]
    log_level: Option<String>,
}

impl From<RotateArgs> for Overrides {
    fn from(args: RotateArgs) -> Self {
        Overrides {
            email: args.email,
            api_key: args.api_key,
            zone_id: args.zone_id,
            domains_file: args.domains_file,
            ips_file: args.ips_file,
            interval_seconds: args.interval,
            log_level: args.log_level,
        }
    }
}

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (command, args) = match cli.command {
        Commands::Run(args) => (Command::Run, args),
        Commands::Check(args) => (Command::Check, args),
        Commands::Config(args) => (Command::Config, args),
    };

    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply(args.into());

    init_logging(&settings.daemon.log_level);

    match command {
        Command::Run => {
            info!("Starting dnsrotate");
            daemon::run(settings).await?;
        }

        Command::Check => {
            daemon::check(&settings).await?;
        }

        Command::Config => {
            show_config(&settings)?;
        }
    }

    Ok(())
}

enum Command {
    Run,
    Check,
    Config,
}

fn show_config(settings: &Settings) -> Result<()> {
    println!(
        "Default configuration file location: {}\n",
        Settings::config_path().display()
    );
    println!("Effective configuration:\n");
    println!("{}", toml::to_string_pretty(&settings.redacted())?);

    Ok(())
}
