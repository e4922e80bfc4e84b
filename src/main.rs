//! inventory-sync - command-line front end for the ERP and eCommerce clients.
//!
//! Usage:
//! ```bash
//! # Totals for one category of an inventory export
//! inventory-sync summary --file inventory.json --category Hardware
//!
//! # Push rows to the ERP system
//! inventory-sync push --system erp --file inventory.json
//!
//! # Fetch the latest orders from the eCommerce platform
//! inventory-sync fetch --system ecommerce
//!
//! # Mark an order as shipped
//! inventory-sync set-status --system ecommerce --id ORDER-9 --status shipped
//!
//! # Keep eCommerce credentials in the OS keychain instead of a file
//! inventory-sync credentials store --system ecommerce --from creds.json
//!
//! # Forget them again
//! inventory-sync credentials delete --system ecommerce
//!
//! # Write a config file with the defaults to edit
//! inventory-sync init
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use inventory_sync::auth::{CredentialSource, CredentialStore, Credentials};
use inventory_sync::config::{Config, SystemConfig};
use inventory_sync::models::InventoryBatch;
use inventory_sync::utils::{format_currency, truncate_string};
use inventory_sync::{logging, Outcome, SystemClient};

/// Widest category name printed in summaries
const CATEGORY_COLUMN_WIDTH: usize = 24;

#[derive(Parser)]
#[command(
    name = "inventory-sync",
    about = "Push inventory data to ERP and eCommerce systems",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (defaults to ~/.config/inventory-sync/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SystemArg {
    Erp,
    Ecommerce,
}

#[derive(Subcommand)]
enum Command {
    /// Show categories and totals of an inventory file
    Summary {
        /// JSON array of inventory rows
        #[arg(long)]
        file: PathBuf,

        /// Restrict totals to one category
        #[arg(long)]
        category: Option<String>,
    },

    /// Send inventory rows to a system
    Push {
        #[arg(long, value_enum)]
        system: SystemArg,

        #[arg(long)]
        file: PathBuf,

        /// Only send rows of this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Fetch data from a system and print it as JSON
    Fetch {
        #[arg(long, value_enum)]
        system: SystemArg,
    },

    /// Update the status of one order
    SetStatus {
        #[arg(long, value_enum)]
        system: SystemArg,

        #[arg(long)]
        id: String,

        /// New status, e.g. "shipped" or "cancelled"
        #[arg(long)]
        status: String,
    },

    /// Write the default configuration to the config file
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Credential management
    Credentials {
        #[command(subcommand)]
        action: CredentialsCommand,
    },
}

#[derive(Subcommand)]
enum CredentialsCommand {
    /// Copy a credentials file into the OS keychain
    Store {
        #[arg(long, value_enum)]
        system: SystemArg,

        /// JSON credentials file to import
        #[arg(long)]
        from: PathBuf,

        /// Keychain account name (defaults to the system name)
        #[arg(long)]
        account: Option<String>,
    },

    /// Remove stored credentials from the OS keychain
    Delete {
        #[arg(long, value_enum)]
        system: SystemArg,

        /// Keychain account name (defaults to the system name)
        #[arg(long)]
        account: Option<String>,
    },
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Config::default().save_to(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn default_account(system: &SystemConfig, account: Option<String>) -> String {
    account.unwrap_or_else(|| system.name.to_lowercase())
}

fn select_system(config: &Config, system: SystemArg) -> Result<SystemConfig> {
    let selected = match system {
        SystemArg::Erp => &config.erp,
        SystemArg::Ecommerce => &config.ecommerce,
    };
    if !selected.enabled {
        bail!("{} integration is disabled in the configuration", selected.name);
    }
    Ok(selected.clone())
}

/// Print a rejection and turn it into a failing exit
fn finish<T>(system: &str, outcome: Outcome<T>) -> Result<T> {
    match outcome {
        Outcome::Done(value) => Ok(value),
        Outcome::Rejected(rejection) => bail!("{}: {}", system, rejection),
    }
}

fn load_rows(file: &Path, category: Option<&str>) -> Result<InventoryBatch> {
    let batch = InventoryBatch::load(file)?;
    Ok(match category {
        Some(category) => batch.filter_by_category(category),
        None => batch,
    })
}

fn print_summary(batch: &InventoryBatch, category: Option<&str>) {
    println!("{} rows", batch.len());
    for name in batch.categories() {
        let totals = batch.filter_by_category(name).totals();
        println!(
            "  {:<width$} {:>6} rows  {:>10} units  {:>14}",
            truncate_string(name, CATEGORY_COLUMN_WIDTH),
            totals.rows,
            totals.display_count(),
            totals.display_value(),
            width = CATEGORY_COLUMN_WIDTH
        );
    }

    if let Some(category) = category {
        let totals = batch.filter_by_category(category).totals();
        println!();
        println!("Total Count for {}: {}", category, totals.display_count());
        println!("Total Value for {}: {}", category, totals.display_value());
    }

    let by_item = batch.value_by_item();
    if !by_item.is_empty() {
        println!();
        println!("Value by item:");
        for (item, value) in by_item {
            println!(
                "  {:<width$} {:>14}",
                truncate_string(&item, CATEGORY_COLUMN_WIDTH),
                format_currency(value),
                width = CATEGORY_COLUMN_WIDTH
            );
        }
    }

    if let Some((first, last)) = batch.date_range() {
        println!();
        println!("Dated rows span {} to {}", first, last);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::config_path()?,
    };

    // Runs before loading so a broken file can be replaced
    if let Command::Init { force } = cli.command {
        return write_default_config(&config_path, force);
    }

    let config = Config::load_from(&config_path)?;

    // Held until exit so buffered log lines reach the file
    let _log_guard = logging::init(&config.logging, cli.verbose)?;
    info!("inventory-sync starting");

    match cli.command {
        Command::Summary { file, category } => {
            let batch = InventoryBatch::load(&file)?;
            print_summary(&batch, category.as_deref());
        }
        Command::Push {
            system,
            file,
            category,
        } => {
            let system = select_system(&config, system)?;
            let batch = load_rows(&file, category.as_deref())?;
            if batch.is_empty() {
                bail!("No inventory rows to send");
            }
            let client = SystemClient::new(system)?;
            let outcome = client.send_data(&batch).await?;
            finish(client.name(), outcome)?;
            println!("Sent {} rows to {}", batch.len(), client.name());
        }
        Command::Fetch { system } => {
            let client = SystemClient::new(select_system(&config, system)?)?;
            let outcome = client.fetch_data().await?;
            let data = finish(client.name(), outcome)?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Command::SetStatus { system, id, status } => {
            let client = SystemClient::new(select_system(&config, system)?)?;
            let outcome = client.update_status(&id, &status).await?;
            finish(client.name(), outcome)?;
            println!("{} status set to '{}' on {}", id, status, client.name());
        }
        Command::Credentials {
            action: CredentialsCommand::Store {
                system,
                from,
                account,
            },
        } => {
            let system = select_system(&config, system)?;
            let contents = std::fs::read_to_string(&from)
                .with_context(|| format!("Failed to read {}", from.display()))?;
            // Refuse to store something the client could not use later
            Credentials::parse(system.credential_shape, &contents)
                .with_context(|| format!("{} is not a valid {} credentials file", from.display(), system.name))?;

            let account = default_account(&system, account);
            CredentialStore::store(&account, &contents)?;
            let source = CredentialSource::Keyring { account };
            println!("Stored {} credentials in the {}", system.name, source);
            println!(
                "Set \"credentials\": {} in the {} section of the config to use them",
                serde_json::to_string(&source)?,
                system.name.to_lowercase()
            );
        }
        Command::Credentials {
            action: CredentialsCommand::Delete { system, account },
        } => {
            let system = select_system(&config, system)?;
            let account = default_account(&system, account);
            if !CredentialStore::has_credentials(&account) {
                bail!("No {} credentials stored in the keychain entry {}", system.name, account);
            }
            CredentialStore::delete(&account)?;
            println!("Removed {} credentials from the keychain entry {}", system.name, account);
        }
        // Handled before the config is loaded
        Command::Init { .. } => {}
    }

    info!("inventory-sync finished");
    Ok(())
}
