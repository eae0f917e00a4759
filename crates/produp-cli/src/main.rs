use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod detect;
mod source;

#[derive(Debug, Parser)]
#[command(name = "produp")]
#[command(about = "Find and plan merges of duplicate products across catalogs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Detect duplicate products for one user
    Detect(detect::DetectArgs),
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = produp_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout carries command output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Connections open on first query, after detection has validated its input.
    let pool = produp_db::connect_pool_lazy(
        &config.database_url,
        produp_db::PoolConfig::from_app_config(&config),
    )?;

    match cli.command {
        Commands::Detect(args) => {
            let catalog = source::PgCatalog::new(&pool);
            detect::run_detect(&catalog, &config, &args, &mut std::io::stdout()).await
        }
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            produp_db::health_check(&pool).await?;
            println!("database connection ok");
            Ok(())
        }
    }
}
