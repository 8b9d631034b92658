use std::time::Duration;

use chrono::Local;

use super::dashboard::print_reminders;
use super::open_store;
use crate::error::Result;
use crate::reports::Reports;
use crate::settings::load_settings;

/// Print reminders once, or poll on an interval until the process is
/// interrupted. Each check reads the store afresh.
pub fn run(watch: bool, interval: Option<u64>) -> Result<()> {
    let store = open_store()?;
    let reports = Reports::new(&store);

    if !watch {
        print_reminders(&reports.reminders()?);
        return Ok(());
    }

    let secs = interval.unwrap_or_else(|| load_settings().reminder_interval_secs).max(1);
    tracing::info!(interval_secs = secs, "watching reminders");
    println!("Checking every {secs}s. Press Ctrl-C to stop.");
    loop {
        println!();
        println!("[{}]", Local::now().format("%Y-%m-%d %H:%M:%S"));
        print_reminders(&reports.reminders()?);
        std::thread::sleep(Duration::from_secs(secs));
    }
}
