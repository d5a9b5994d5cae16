use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imgops_core::HistoryRecord;
use imgops_db::{reset_schema, run_migrations, PgHistoryStore};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "history_admin")]
#[command(about = "Administer the image operation history table")]
struct Args {
    /// Postgres connection string (defaults to DATABASE_URL)
    #[arg(long, value_name = "URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations; never drops data
    Migrate,

    /// Drop the history table and recreate it empty
    Reset {
        /// Confirm that all history should be deleted
        #[arg(long)]
        yes: bool,
    },

    /// Print the most recent history records
    List {
        #[arg(long, default_value = "20")]
        limit: i64,

        /// Output format: json or table (default: table)
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let database_url = match args.database_url {
        Some(url) => url,
        None => std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match args.command {
        Command::Migrate => {
            run_migrations(&pool).await?;
        }
        Command::Reset { yes } => {
            if !yes {
                anyhow::bail!("Refusing to reset without --yes; this deletes all history");
            }
            reset_schema(&pool).await?;
            println!("History table recreated");
        }
        Command::List { limit, format } => {
            let store = PgHistoryStore::new(pool);
            let records = store.list_recent(limit.max(1)).await?;
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&records)?),
                _ => print_history_table(&records),
            }
        }
    }

    Ok(())
}

fn print_history_table(records: &[HistoryRecord]) {
    if records.is_empty() {
        println!("No history records");
        return;
    }

    println!(
        "{:<6} {:<25} {:<9} {:<11} {:<11} {:>10} {:>10} {:>11} {:>11}",
        "ID", "TIMESTAMP", "TYPE", "BEFORE", "AFTER", "MB BEFORE", "MB AFTER", "DIM BEFORE", "DIM AFTER"
    );
    for record in records {
        println!(
            "{:<6} {:<25} {:<9} {:<11} {:<11} {:>10.4} {:>10.4} {:>11} {:>11}",
            record.id,
            record.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            record.operation.as_str(),
            record.extension_before,
            record.extension_after,
            record.size_before_mb,
            record.size_after_mb,
            format!("{}x{}", record.width_before_px, record.height_before_px),
            format!("{}x{}", record.width_after_px, record.height_after_px),
        );
    }
}
