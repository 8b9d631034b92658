mod cli;
mod db;
mod error;
mod fmt;
mod logging;
mod models;
mod reports;
mod settings;
mod store;

use clap::Parser;

use cli::{Cli, ClientsCommands, Commands, DeliveriesCommands, InvoicesCommands, ReportCommands};

fn main() {
    logging::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir, name } => cli::init::run(data_dir, name),
        Commands::Deliveries { command } => match command {
            DeliveriesCommands::Add {
                client,
                description,
                fee,
                deadline,
            } => cli::deliveries::add(&client, &description, fee, &deadline),
            DeliveriesCommands::List { query } => cli::deliveries::list(query.as_deref()),
            DeliveriesCommands::Complete { id } => cli::deliveries::complete(id),
            DeliveriesCommands::Edit {
                id,
                description,
                fee,
                deadline,
            } => cli::deliveries::edit(id, description.as_deref(), fee, deadline.as_deref()),
            DeliveriesCommands::Delete { id } => cli::deliveries::delete(id),
            DeliveriesCommands::History { id } => cli::deliveries::history(id),
        },
        Commands::Invoices { command } => match command {
            InvoicesCommands::List => cli::invoices::list(),
            InvoicesCommands::Pay { id } => cli::invoices::pay(id),
        },
        Commands::Clients { command } => match command {
            ClientsCommands::Add { name } => cli::clients::add(&name),
            ClientsCommands::List => cli::clients::list(),
        },
        Commands::Dashboard => cli::dashboard::run(),
        Commands::Report { command } => match command {
            ReportCommands::Earnings => cli::report::earnings(),
            ReportCommands::Activity { month } => cli::report::activity(month.as_deref()),
        },
        Commands::Reminders { watch, interval } => cli::reminders::run(watch, interval),
        Commands::Export { output } => cli::export::run(output),
        Commands::Backup { output } => cli::backup::run(output),
        Commands::Status => cli::status::run(),
        Commands::Demo => cli::demo::run(),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
