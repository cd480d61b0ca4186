//! Schema migration CLI
//!
//! Run with: cargo run --bin migration -- up

use anyhow::Context;
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use catalog_admin::{config, db, migrator::Migrator};

#[derive(Parser, Debug)]
#[command(name = "migration", about = "Manage the catalog database schema")]
struct Cli {
    /// Database URL; defaults to the configured `database_url`
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations
    Up {
        /// Apply at most this many migrations
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Drop every table and re-apply all migrations
    Fresh,
    /// List applied and pending migrations
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let database_url = cli
        .database_url
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| cfg.database_url.clone());

    let mut db_config = db::DbConfig::from(&cfg);
    db_config.url = database_url;
    let conn = db::establish_connection_with_config(&db_config)
        .await
        .context("failed to connect to the database")?;

    match cli.command {
        Command::Up { steps } => {
            Migrator::up(&conn, steps).await?;
            info!("Migrations applied");
        }
        Command::Down { steps } => {
            Migrator::down(&conn, Some(steps)).await?;
            info!("Rolled back {} migration(s)", steps);
        }
        Command::Fresh => {
            Migrator::fresh(&conn).await?;
            info!("Schema recreated");
        }
        Command::Status => {
            for migration in Migrator::get_applied_migrations(&conn).await? {
                println!("applied  {}", migration.name());
            }
            for migration in Migrator::get_pending_migrations(&conn).await? {
                println!("pending  {}", migration.name());
            }
        }
    }

    Ok(())
}
