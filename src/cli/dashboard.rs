use std::collections::BTreeMap;

use chrono::{Datelike, Local, NaiveDate};
use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use super::open_store;
use crate::error::Result;
use crate::fmt::{bar, money, month_label};
use crate::reports::{EarningsSeries, Reminder, Reports};
use crate::settings::load_settings;
use crate::store::RecordStore;

const BAR_WIDTH: usize = 30;
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(ny, nm, 1),
    ) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 0,
    }
}

/// Monday-first calendar weeks for a month; `None` pads days outside it.
pub(crate) fn calendar_weeks(year: i32, month: u32) -> Vec<[Option<u32>; 7]> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let offset = first.weekday().num_days_from_monday() as usize;
    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut slot = offset;
    for day in 1..=days_in_month(year, month) {
        week[slot] = Some(day);
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
    }
    if slot > 0 {
        weeks.push(week);
    }
    weeks
}

pub(crate) fn heatmap_table(year: i32, month: u32, activity: &BTreeMap<u32, u32>) -> Table {
    let mut table = Table::new();
    table.set_header(WEEKDAYS.to_vec());
    for week in calendar_weeks(year, month) {
        let cells: Vec<Cell> = week
            .iter()
            .map(|slot| match slot {
                None => Cell::new(""),
                Some(day) => match activity.get(day).copied().unwrap_or(0) {
                    0 => Cell::new(format!("{day:>2}").dimmed()),
                    1 => Cell::new(format!("{day:>2} ·1").green()),
                    n => Cell::new(format!("{day:>2} ·{n}").bright_green().bold()),
                },
            })
            .collect();
        table.add_row(cells);
    }
    table
}

pub(crate) fn earnings_table(series: &EarningsSeries) -> Table {
    let max = series.values.iter().copied().fold(0.0, f64::max);
    let mut table = Table::new();
    table.set_header(vec!["Month", "Earnings", ""]);
    for (label, value) in series.iter() {
        table.add_row(vec![
            Cell::new(month_label(label)),
            Cell::new(money(value)).set_alignment(CellAlignment::Right),
            Cell::new(bar(value, max, BAR_WIDTH).green()),
        ]);
    }
    table
}

pub(crate) fn print_reminders(reminders: &[Reminder]) {
    if reminders.is_empty() {
        println!("{}", "Nothing overdue and every invoice is paid.".green());
    }
    for reminder in reminders {
        println!("{} {reminder}", "!".yellow().bold());
    }
}

/// Heatmap for the month containing `today`. Grid and counts come from the
/// same date.
pub(crate) fn activity_section<S: RecordStore>(reports: &Reports<'_, S>, today: NaiveDate) -> Result<String> {
    let activity = reports.daily_activity_for(today.year(), today.month())?;
    Ok(format!(
        "Activity in {}\n{}",
        today.format("%B %Y"),
        heatmap_table(today.year(), today.month(), &activity)
    ))
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let store = open_store()?;
    let reports = Reports::new(&store);
    let today = Local::now().date_naive();

    println!("{}", format!("Welcome back, {}.", settings.display_name()).bold());
    println!();

    let stats = reports.dashboard_stats()?;
    let mut cards = Table::new();
    cards.set_header(vec!["Total Deliveries", "Completed", "Pending", "Earnings"]);
    cards.add_row(vec![
        Cell::new(stats.total),
        Cell::new(stats.completed.to_string().green()),
        Cell::new(stats.pending.to_string().red()),
        Cell::new(money(stats.earnings).bold()),
    ]);
    println!("{cards}");
    println!();

    let series = reports.earnings_over_time()?;
    if series.is_empty() {
        println!("Earnings over time: no completed deliveries yet.");
    } else {
        println!("Earnings over time\n{}", earnings_table(&series));
    }
    println!();

    println!("{}", activity_section(&reports, today)?);
    println!();

    print_reminders(&reports.reminders_as_of(today)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
    }

    #[test]
    fn test_calendar_weeks_starting_monday() {
        // July 2024 starts on a Monday
        let weeks = calendar_weeks(2024, 7);
        assert_eq!(weeks[0], [Some(1), Some(2), Some(3), Some(4), Some(5), Some(6), Some(7)]);
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[4][2], Some(31));
        assert_eq!(weeks[4][3], None);
    }

    #[test]
    fn test_calendar_weeks_offset() {
        // February 2024 starts on a Thursday
        let weeks = calendar_weeks(2024, 2);
        assert!(weeks[0][..3].iter().all(Option::is_none));
        assert_eq!(weeks[0][3], Some(1));
        let days: Vec<u32> = weeks.iter().flatten().flatten().copied().collect();
        assert_eq!(days, (1..=29).collect::<Vec<_>>());
    }

    #[test]
    fn test_calendar_weeks_invalid_month() {
        assert!(calendar_weeks(2024, 13).is_empty());
    }

    #[test]
    fn test_activity_section_uses_given_month() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = crate::store::SqliteStore::open(&dir.path().join("test.db")).unwrap();
        let day = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        for (description, done) in [("a", "2024-02-29"), ("b", "2024-03-01"), ("c", "2024-03-01")] {
            let id = store
                .create_delivery_with_invoice("Acme", description, 10.0, "2024-03-05", day("2024-02-01"))
                .unwrap();
            store.complete_delivery(id, day(done)).unwrap();
        }

        let section = activity_section(&Reports::new(&store), day("2024-02-29")).unwrap();
        assert!(section.starts_with("Activity in February 2024"));
        assert!(section.contains("29 ·1"));
        assert!(!section.contains("·2"));
    }

    #[test]
    fn test_earnings_table_rows() {
        let series = EarningsSeries {
            labels: vec!["2024-02".to_string(), "2024-03".to_string()],
            values: vec![50.0, 150.0],
        };
        let rendered = earnings_table(&series).to_string();
        assert!(rendered.contains("Feb 2024"));
        assert!(rendered.contains("$150.00"));
    }
}
