use clap::Parser;
use poly_copy::cli::{Cli, Commands};
use poly_copy::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    let _guard = poly_copy::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting copy-trading pipeline");
            args.execute(&config).await?;
        }
        Commands::Status => {
            println!("poly-copy status");
            println!("  Mode: {:?}", config.execution.mode);
            println!("  Status: Not running");
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Leaders: {}", config.monitor.user_addresses.len());
            println!("  Proxy wallet: {}", config.monitor.proxy_wallet);
            println!(
                "  Poll: every {}s, max age {}s",
                config.monitor.fetch_interval_secs, config.monitor.too_old_seconds
            );
            println!(
                "  Dedup: ttl {}s, max {} entries",
                config.dedup.ttl_seconds, config.dedup.max_entries
            );
            println!(
                "  Aggregation: enabled={}, window {:?}s",
                config.aggregation.enabled, config.aggregation.window_seconds
            );
            println!(
                "  Execution: {:?}, {} workers",
                config.execution.mode, config.execution.workers
            );
        }
    }

    Ok(())
}
