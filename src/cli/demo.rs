use std::path::PathBuf;

use chrono::{Datelike, Local, Months, NaiveDate};

use crate::error::Result;
use crate::settings::{load_settings, save_settings};
use crate::store::{RecordStore, SqliteStore};

#[derive(Clone, Copy)]
enum DemoState {
    Pending,
    Completed,
    Paid,
}

struct DemoJob {
    client: &'static str,
    description: &'static str,
    fee: f64,
    /// Month the job lands in, counted back from the current month.
    months_ago: u32,
    day: u32,
    state: DemoState,
}

const JOBS: &[DemoJob] = &[
    DemoJob { client: "Acme Corp", description: "Brand guidelines", fee: 1800.0, months_ago: 5, day: 9, state: DemoState::Paid },
    DemoJob { client: "Northwind", description: "Product photography", fee: 650.0, months_ago: 5, day: 22, state: DemoState::Paid },
    DemoJob { client: "Acme Corp", description: "Landing page", fee: 1200.0, months_ago: 4, day: 14, state: DemoState::Paid },
    DemoJob { client: "Globex", description: "Quarterly newsletter", fee: 400.0, months_ago: 3, day: 3, state: DemoState::Paid },
    DemoJob { client: "Northwind", description: "Catalog layout", fee: 2200.0, months_ago: 3, day: 18, state: DemoState::Paid },
    DemoJob { client: "Initech", description: "Pitch deck", fee: 950.0, months_ago: 2, day: 7, state: DemoState::Paid },
    DemoJob { client: "Globex", description: "Social media kit", fee: 700.0, months_ago: 2, day: 25, state: DemoState::Completed },
    DemoJob { client: "Acme Corp", description: "Email templates", fee: 550.0, months_ago: 1, day: 11, state: DemoState::Paid },
    DemoJob { client: "Initech", description: "Annual report design", fee: 3100.0, months_ago: 1, day: 27, state: DemoState::Completed },
    DemoJob { client: "Northwind", description: "Packaging mockups", fee: 820.0, months_ago: 0, day: 1, state: DemoState::Completed },
    DemoJob { client: "Globex", description: "Infographic series", fee: 480.0, months_ago: 0, day: 1, state: DemoState::Paid },
    DemoJob { client: "Acme Corp", description: "Trade show banner", fee: 375.0, months_ago: 0, day: 12, state: DemoState::Completed },
    DemoJob { client: "Initech", description: "Website copy review", fee: 300.0, months_ago: 0, day: 0, state: DemoState::Pending },
    DemoJob { client: "Globex", description: "Logo refresh", fee: 900.0, months_ago: 0, day: 0, state: DemoState::Pending },
    DemoJob { client: "Northwind", description: "Spring campaign", fee: 1500.0, months_ago: 0, day: 0, state: DemoState::Pending },
];

/// Deadline offsets in days from today for pending jobs: one overdue, one due
/// soon, one further out.
const PENDING_OFFSETS: &[i64] = &[-3, 4, 21];

/// Completion date for a finished job: the given day of the month
/// `months_ago` back, never later than today.
fn completion_date(today: NaiveDate, months_ago: u32, day: u32) -> NaiveDate {
    let month = today
        .with_day(1)
        .and_then(|first| first.checked_sub_months(Months::new(months_ago)))
        .unwrap_or(today);
    let day = if months_ago == 0 { day.min(today.day()) } else { day.min(28) };
    month.with_day(day.max(1)).unwrap_or(month)
}

/// Insert the sample dataset through the regular mutation path. Returns the
/// number of deliveries created.
pub(crate) fn insert_demo_data(store: &mut SqliteStore, today: NaiveDate) -> Result<usize> {
    let mut pending = PENDING_OFFSETS.iter().cycle();
    for job in JOBS {
        match job.state {
            DemoState::Pending => {
                let offset = pending.next().copied().unwrap_or(7);
                let deadline = today + chrono::Duration::days(offset);
                let issued = today - chrono::Duration::days(10);
                store.create_delivery_with_invoice(
                    job.client,
                    job.description,
                    job.fee,
                    &deadline.format("%Y-%m-%d").to_string(),
                    issued,
                )?;
            }
            DemoState::Completed | DemoState::Paid => {
                let done = completion_date(today, job.months_ago, job.day);
                let deadline = done + chrono::Duration::days(2);
                let issued = done - chrono::Duration::days(14);
                let id = store.create_delivery_with_invoice(
                    job.client,
                    job.description,
                    job.fee,
                    &deadline.format("%Y-%m-%d").to_string(),
                    issued,
                )?;
                store.complete_delivery(id, done)?;
                if matches!(job.state, DemoState::Paid) {
                    for invoice in store.list_invoices()?.iter().filter(|i| i.delivery_id == id) {
                        store.mark_invoice_paid(invoice.id)?;
                    }
                }
            }
        }
    }
    Ok(JOBS.len())
}

pub fn run() -> Result<()> {
    let mut settings = load_settings();
    let base_dir = PathBuf::from(&settings.data_dir);
    // Already pointed at the demo data by an earlier run.
    let demo_dir = if base_dir.file_name().is_some_and(|n| n == "demo") {
        base_dir
    } else {
        base_dir.join("demo")
    };
    std::fs::create_dir_all(demo_dir.join("exports"))?;

    settings.data_dir = demo_dir.to_string_lossy().to_string();
    let mut store = SqliteStore::open(&settings.db_path())?;

    if store.counts()?.clients > 0 {
        println!("Demo data already loaded.");
    } else {
        let count = insert_demo_data(&mut store, Local::now().date_naive())?;
        println!("Loaded {count} demo deliveries.");
    }

    save_settings(&settings)?;
    println!("Now using demo data at {}", demo_dir.display());
    println!("Run `courier dashboard` to have a look.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{Reminder, Reports};

    fn test_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_completion_date_clamps() {
        let today = day("2024-03-10");
        assert_eq!(completion_date(today, 0, 12), day("2024-03-10"));
        assert_eq!(completion_date(today, 0, 1), day("2024-03-01"));
        assert_eq!(completion_date(today, 1, 30), day("2024-02-28"));
        assert_eq!(completion_date(today, 3, 9), day("2023-12-09"));
    }

    #[test]
    fn test_demo_creates_data() {
        let (_dir, mut store) = test_store();
        let today = day("2024-06-15");
        let count = insert_demo_data(&mut store, today).unwrap();
        assert_eq!(count, JOBS.len());

        let reports = Reports::new(&store);
        let stats = reports.dashboard_stats().unwrap();
        assert_eq!(stats.total, JOBS.len());
        assert_eq!(stats.pending, 3);
        assert_eq!(store.list_clients().unwrap().len(), 4);

        let series = reports.earnings_over_time().unwrap();
        assert_eq!(series.labels.len(), 6);
        assert_eq!(series.labels.last().map(String::as_str), Some("2024-06"));

        let activity = reports.daily_activity_for(2024, 6).unwrap();
        assert_eq!(activity.get(&1), Some(&2));
        assert_eq!(activity.get(&12), Some(&1));
    }

    #[test]
    fn test_demo_reminders() {
        let (_dir, mut store) = test_store();
        let today = day("2024-06-15");
        insert_demo_data(&mut store, today).unwrap();
        let reminders = Reports::new(&store).reminders_as_of(today).unwrap();
        let unpaid = JOBS.iter().filter(|j| !matches!(j.state, DemoState::Paid)).count();
        assert_eq!(
            reminders,
            vec![
                Reminder::DueOrOverdue { count: 1 },
                Reminder::UnpaidInvoices { count: unpaid }
            ]
        );
    }

    #[test]
    fn test_demo_early_in_month() {
        let (_dir, mut store) = test_store();
        // On the 1st, current-month completions all collapse onto day 1.
        insert_demo_data(&mut store, day("2024-06-01")).unwrap();
        let activity = Reports::new(&store).daily_activity_for(2024, 6).unwrap();
        assert_eq!(activity.get(&1), Some(&3));
        assert_eq!(activity.len(), 1);
    }
}
