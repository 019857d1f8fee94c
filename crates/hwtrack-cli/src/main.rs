use clap::{Parser, Subcommand};

mod run;

#[derive(Debug, Parser)]
#[command(name = "hwtrack")]
#[command(about = "Mattel Creations vehicle inventory tracker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Poll every configured collection and reconcile into the store
    /// (the default when no subcommand is given).
    Run,
    /// Fold duplicate identities in the store and save it back.
    Dedup,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = hwtrack_core::load_app_config_from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        None | Some(Commands::Run) => run::run(&config).await,
        Some(Commands::Dedup) => run::dedup(&config),
    }
}
