//! Command-line front end for the marketplace profit calculator.
//!
//! Thin orchestration over fee-core: validate, calculate, and (behind the
//! free-save quota) persist to the SQLite-backed history.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use fee_core::HistoryRepository;
use fee_core::calculations::ProfitWorksheet;
use fee_core::models::{CategoryTable, ListingInputs, NewHistoryEntry};
use fee_core::quota::{ImmediateReward, MAX_FREE_SAVES, SaveDecision, SaveQuota};
use fee_core::validation::validate_all;
use fee_db_sqlite::SqliteRepository;

mod output;

/// Marketplace seller profit & fee calculator.
#[derive(Parser, Debug)]
#[command(name = "fee-calc")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQLite database URL (e.g. sqlite:fees.db?mode=rwc to create if missing)
    #[arg(long, global = true, default_value = "sqlite:fees.db?mode=rwc")]
    database: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate inputs and print the profit breakdown without saving
    Compute {
        #[command(flatten)]
        inputs: InputArgs,

        /// Print the breakdown as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Validate, calculate, and persist the result to history (quota-gated)
    Save {
        #[command(flatten)]
        inputs: InputArgs,

        /// Accept the reward prompt if the free-save quota is exhausted
        #[arg(long)]
        confirm_reward: bool,
    },

    /// Inspect or prune the saved calculation history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// List marketplace categories and their referral fee percentages
    Categories,
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
    /// Show all saved calculations, newest first
    List {
        /// Print entries as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Delete the selected entries
    Delete {
        /// Entry ids to delete, comma-separated
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<i64>,
    },

    /// Delete every saved calculation
    Clear,
}

/// The seven listing input fields, with the blank-form defaults.
#[derive(Args, Debug)]
struct InputArgs {
    /// Item name (free text, optional)
    #[arg(long, default_value = "")]
    item_name: String,

    /// Item sale price; ex VAT unless --price-includes-vat is set
    #[arg(long, default_value = "")]
    sale_price: String,

    /// What the item cost you
    #[arg(long, default_value = "")]
    item_cost: String,

    /// Shipping amount charged to the customer
    #[arg(long, default_value = "")]
    shipping_charge: String,

    /// What shipping actually costs you
    #[arg(long, default_value = "")]
    shipping_cost: String,

    /// VAT rate as a percentage (0-100)
    #[arg(long, default_value = "20")]
    vat_percentage: String,

    /// Marketplace category id (unknown ids fall back to "default")
    #[arg(long, default_value = "default")]
    category: String,

    /// Treat --sale-price as VAT-inclusive
    #[arg(long)]
    price_includes_vat: bool,
}

impl InputArgs {
    fn into_inputs(self) -> ListingInputs {
        ListingInputs {
            item_name: self.item_name,
            sale_price: self.sale_price,
            item_cost: self.item_cost,
            shipping_charge: self.shipping_charge,
            shipping_cost: self.shipping_cost,
            vat_percentage: self.vat_percentage,
            category_id: self.category,
            price_includes_vat: self.price_includes_vat,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Compute { inputs, json } => run_compute(inputs.into_inputs(), json),
        Command::Save {
            inputs,
            confirm_reward,
        } => run_save(&cli.database, inputs.into_inputs(), confirm_reward).await,
        Command::History { command } => run_history(&cli.database, command).await,
        Command::Categories => {
            output::print_categories(&CategoryTable::built_in());
            Ok(())
        }
    }
}

/// Checks the full-pass validation result; prints the error map and exits
/// with status 1 when anything is invalid.
fn require_valid(inputs: &ListingInputs) {
    let errors = validate_all(inputs);
    if !errors.is_empty() {
        output::print_validation_errors(&errors);
        std::process::exit(1);
    }
}

fn run_compute(
    inputs: ListingInputs,
    json: bool,
) -> Result<()> {
    require_valid(&inputs);

    let categories = CategoryTable::built_in();
    let results = ProfitWorksheet::new(&categories).calculate(&inputs);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        output::print_breakdown(&inputs, &results, &categories);
    }

    Ok(())
}

async fn run_save(
    database: &str,
    inputs: ListingInputs,
    confirm_reward: bool,
) -> Result<()> {
    require_valid(&inputs);

    let categories = CategoryTable::built_in();
    let results = ProfitWorksheet::new(&categories).calculate(&inputs);
    let entry = NewHistoryEntry { inputs, results };

    let repo = open_repository(database).await?;

    // A failed counter read is empty state, never a reason not to save.
    let save_count = match repo.load_save_count().await {
        Ok(count) => count,
        Err(error) => {
            warn!(%error, "could not read the save counter; assuming 0");
            0
        }
    };

    let mut quota = SaveQuota::new(MAX_FREE_SAVES, save_count);
    match quota.request_save(entry) {
        SaveDecision::Persist(entry) => persist(&repo, &quota, entry).await,
        SaveDecision::RewardRequired => {
            if confirm_reward {
                match quota.confirm_reward(&ImmediateReward).await {
                    Some(entry) => {
                        println!("Reward granted; save quota reset.");
                        persist(&repo, &quota, entry).await
                    }
                    None => Ok(()),
                }
            } else {
                quota.cancel_reward();
                eprintln!("Free save quota exhausted ({MAX_FREE_SAVES} of {MAX_FREE_SAVES} used).");
                eprintln!("Re-run with --confirm-reward to unlock {MAX_FREE_SAVES} more saves.");
                std::process::exit(1);
            }
        }
    }
}

async fn persist(
    repo: &SqliteRepository,
    quota: &SaveQuota,
    entry: NewHistoryEntry,
) -> Result<()> {
    use fee_core::HistoryRepository;

    let saved = repo
        .add_entry(entry)
        .await
        .context("Failed to persist the calculation")?;
    repo.store_save_count(quota.save_count())
        .await
        .context("Failed to persist the save counter")?;

    println!(
        "Saved calculation #{} ({} free saves remaining).",
        saved.id,
        quota.remaining_free_saves()
    );
    Ok(())
}

async fn run_history(
    database: &str,
    command: HistoryCommand,
) -> Result<()> {
    use fee_core::HistoryRepository;

    let repo = open_repository(database).await?;

    match command {
        HistoryCommand::List { json } => {
            let entries = repo
                .list_entries()
                .await
                .context("Failed to read the calculation history")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                output::print_history(&entries);
            }
        }
        HistoryCommand::Delete { ids } => {
            let deleted = repo
                .delete_entries(&ids)
                .await
                .context("Failed to delete history entries")?;
            println!("Deleted {deleted} of {} selected entries.", ids.len());
        }
        HistoryCommand::Clear => {
            let deleted = repo
                .clear_entries()
                .await
                .context("Failed to clear the calculation history")?;
            println!("Cleared {deleted} saved calculations.");
        }
    }

    Ok(())
}

async fn open_repository(database: &str) -> Result<SqliteRepository> {
    let repo = SqliteRepository::new(database)
        .await
        .with_context(|| format!("Failed to connect to database: {database}"))?;
    repo.init_schema()
        .await
        .context("Failed to initialize the database schema")?;
    Ok(repo)
}
