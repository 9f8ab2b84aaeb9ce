use std::error::Error;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use engine::{Engine, Entry, Money};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "financeiro_admin")]
#[command(about = "Admin utilities for Financeiro (categories, cost centers, entries)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./financeiro.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Category(Labels),
    CostCenter(Labels),
    Entry(Entries),
}

#[derive(Args, Debug)]
struct Labels {
    #[command(subcommand)]
    command: LabelCommand,
}

#[derive(Subcommand, Debug)]
enum LabelCommand {
    Add { label: String },
    List,
    Remove { id: Uuid },
}

#[derive(Args, Debug)]
struct Entries {
    #[command(subcommand)]
    command: EntryCommand,
}

#[derive(Subcommand, Debug)]
enum EntryCommand {
    /// Latest created entries, newest first.
    List {
        #[arg(long, default_value_t = 10)]
        limit: u64,
    },
    /// Settles an entry.
    Pay {
        id: Uuid,
        /// Settled amount, e.g. `250,90`. Defaults to the original value.
        #[arg(long, value_parser = parse_amount)]
        amount: Option<Money>,
        /// Settlement date (DD/MM/YYYY or YYYY-MM-DD). Defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
}

fn parse_amount(raw: &str) -> Result<Money, String> {
    Money::parse_brl(raw).ok_or_else(|| format!("invalid amount: {raw}"))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    ["%d/%m/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw.trim(), format).ok())
        .ok_or_else(|| format!("invalid date: {raw}"))
}

fn entry_line(entry: &Entry) -> String {
    format!(
        "{}  {}  {:<10}  {:>14}  {}  {}",
        entry.id,
        entry.due_date.format("%d/%m/%Y"),
        entry.status().label(),
        entry.original_value.to_string(),
        entry.category.label,
        entry.description
    )
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Category(Labels { command }) => match command {
            LabelCommand::Add { label } => {
                let category = engine.create_category(&label).await?;
                println!("created category: {} ({})", category.label, category.id);
            }
            LabelCommand::List => {
                for category in engine.list_categories().await? {
                    println!("{}  {}", category.id, category.label);
                }
            }
            LabelCommand::Remove { id } => {
                engine.delete_category(id).await?;
                println!("removed category: {id}");
            }
        },
        Command::CostCenter(Labels { command }) => match command {
            LabelCommand::Add { label } => {
                let cost_center = engine.create_cost_center(&label).await?;
                println!(
                    "created cost center: {} ({})",
                    cost_center.label, cost_center.id
                );
            }
            LabelCommand::List => {
                for cost_center in engine.list_cost_centers().await? {
                    println!("{}  {}", cost_center.id, cost_center.label);
                }
            }
            LabelCommand::Remove { id } => {
                engine.delete_cost_center(id).await?;
                println!("removed cost center: {id}");
            }
        },
        Command::Entry(Entries { command }) => match command {
            EntryCommand::List { limit } => {
                for entry in engine.list_recent_entries(limit).await? {
                    println!("{}", entry_line(&entry));
                }
            }
            EntryCommand::Pay { id, amount, date } => {
                let date = date.unwrap_or_else(|| Local::now().date_naive());
                match engine.mark_as_paid(id, amount, date).await {
                    Ok(entry) => println!("settled: {}", entry_line(&entry)),
                    Err(engine::EngineError::Validation(errors)) => {
                        for error in errors {
                            eprintln!("{}: {}", error.field, error.message);
                        }
                        std::process::exit(1);
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        },
    }

    Ok(())
}
