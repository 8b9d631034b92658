use chrono::{Datelike, Local};
use colored::Colorize;
use comfy_table::{Cell, Table};

use super::dashboard::{earnings_table, heatmap_table};
use super::{open_store, parse_month};
use crate::error::Result;
use crate::fmt::money;
use crate::reports::Reports;

pub fn earnings() -> Result<()> {
    let store = open_store()?;
    let series = Reports::new(&store).earnings_over_time()?;
    if series.is_empty() {
        println!("No completed deliveries yet.");
        return Ok(());
    }
    let total: f64 = series.values.iter().sum();
    println!("Earnings by Month\n{}", earnings_table(&series));
    println!("{} {}", "Total:".bold(), money(total));
    Ok(())
}

pub fn activity(month: Option<&str>) -> Result<()> {
    let (year, month) = match month {
        Some(m) => parse_month(m)?,
        None => {
            let today = Local::now().date_naive();
            (today.year(), today.month())
        }
    };
    let store = open_store()?;
    let activity = Reports::new(&store).daily_activity_for(year, month)?;

    println!("Activity for {year:04}-{month:02}\n{}", heatmap_table(year, month, &activity));
    if activity.is_empty() {
        println!("No completions in {year:04}-{month:02}.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Day", "Completed"]);
    for (day, count) in &activity {
        table.add_row(vec![Cell::new(day), Cell::new(count)]);
    }
    let total: u32 = activity.values().sum();
    println!("{table}");
    println!("{} {total}", "Total completions:".bold());
    Ok(())
}
