use crate::error::Result;
use crate::fmt::format_bytes;
use crate::reports::Reports;
use crate::settings::load_settings;
use crate::store::SqliteStore;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("User:       {}", if settings.user_name.is_empty() { "(not set)" } else { &settings.user_name });
    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    println!("Reminders:  every {}s when watching", settings.reminder_interval_secs);

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let store = SqliteStore::open(&db_path)?;
        let counts = store.counts()?;
        let this_month: u32 = Reports::new(&store).daily_activity_current_month()?.values().sum();

        println!();
        println!("Clients:     {}", counts.clients);
        println!("Deliveries:  {} ({} pending)", counts.deliveries, counts.pending);
        println!("Invoices:    {} ({} unpaid)", counts.invoices, counts.unpaid);
        println!("Completed this month: {this_month}");
    } else {
        println!();
        println!("Database not found. Run `courier init` to set up.");
    }

    Ok(())
}
