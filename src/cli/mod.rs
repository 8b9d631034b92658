pub mod backup;
pub mod clients;
pub mod dashboard;
pub mod deliveries;
pub mod demo;
pub mod export;
pub mod init;
pub mod invoices;
pub mod reminders;
pub mod report;
pub mod status;

use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};

use crate::error::{CourierError, Result};
use crate::settings::get_db_path;
use crate::store::SqliteStore;

/// Open the configured database, refusing to create one outside `init`.
pub(crate) fn open_store() -> Result<SqliteStore> {
    let path = get_db_path();
    if !path.exists() {
        return Err(CourierError::Other(format!(
            "Database not found at {}. Run `courier init` to set up.",
            path.display()
        )));
    }
    SqliteStore::open(&path)
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| CourierError::InvalidDate(value.to_string()))
}

pub(crate) fn validate_fee(fee: f64) -> Result<f64> {
    if !fee.is_finite() || fee < 0.0 {
        return Err(CourierError::InvalidFee(format!("{fee} (must be a number >= 0)")));
    }
    Ok(fee)
}

/// Parse `YYYY-MM` into (year, month).
pub(crate) fn parse_month(value: &str) -> Result<(i32, u32)> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
        .map_err(|_| CourierError::Other(format!("Invalid month: {value} (expected YYYY-MM)")))?;
    Ok((date.year(), date.month()))
}

#[derive(Parser)]
#[command(name = "courier", about = "Delivery and invoice tracker for freelancers.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up courier: choose a data directory and initialize the database.
    Init {
        /// Path for courier data (default: ~/Documents/courier)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Your name, shown on the dashboard
        #[arg(long)]
        name: Option<String>,
    },
    /// Manage deliveries.
    Deliveries {
        #[command(subcommand)]
        command: DeliveriesCommands,
    },
    /// Manage invoices.
    Invoices {
        #[command(subcommand)]
        command: InvoicesCommands,
    },
    /// Manage clients.
    Clients {
        #[command(subcommand)]
        command: ClientsCommands,
    },
    /// Overview: totals, earnings by month, this month's activity and reminders.
    Dashboard,
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Show overdue deliveries and unpaid invoices.
    Reminders {
        /// Keep checking on an interval until interrupted
        #[arg(long)]
        watch: bool,
        /// Seconds between checks (default: reminder_interval_secs from settings)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Export deliveries to CSV.
    Export {
        /// Output path (default: <data_dir>/exports/deliveries-YYYYMMDD.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Back up the database.
    Backup {
        /// Output path (default: <data_dir>/backups/courier-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show current database and summary statistics.
    Status,
    /// Load sample clients, deliveries and invoices to explore courier.
    Demo,
}

#[derive(Subcommand)]
pub enum DeliveriesCommands {
    /// Add a delivery and its invoice. Unknown clients are created.
    Add {
        /// Client name
        client: String,
        /// What is being delivered
        description: String,
        /// Fee charged for the delivery
        #[arg(long)]
        fee: f64,
        /// Deadline: YYYY-MM-DD
        #[arg(long)]
        deadline: String,
    },
    /// List deliveries, optionally filtered by description or client name.
    List {
        /// Case-insensitive text to search for
        #[arg(long)]
        query: Option<String>,
    },
    /// Mark a delivery as completed today.
    Complete {
        /// Delivery ID (shown in `courier deliveries list`)
        id: i64,
    },
    /// Edit a delivery's description, fee or deadline.
    Edit {
        /// Delivery ID
        id: i64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        fee: Option<f64>,
        /// New deadline: YYYY-MM-DD
        #[arg(long)]
        deadline: Option<String>,
    },
    /// Delete a delivery and its invoices.
    Delete {
        /// Delivery ID
        id: i64,
    },
    /// Show the change history of a delivery.
    History {
        /// Delivery ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum InvoicesCommands {
    /// List all invoices.
    List,
    /// Mark an invoice as paid.
    Pay {
        /// Invoice ID (shown in `courier invoices list`)
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ClientsCommands {
    /// Add a client ahead of their first delivery.
    Add {
        /// Client name (matched exactly)
        name: String,
    },
    /// List all clients.
    List,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Earnings from completed deliveries, by month of completion.
    Earnings,
    /// Completions per day for a month.
    Activity {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
}
