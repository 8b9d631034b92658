use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};

use super::{open_store, parse_date, validate_fee};
use crate::error::{CourierError, Result};
use crate::fmt::money;
use crate::models::{Delivery, DeliveryRow};
use crate::reports::Reports;
use crate::store::RecordStore;

pub fn add(client: &str, description: &str, fee: f64, deadline: &str) -> Result<()> {
    let client = client.trim();
    let description = description.trim();
    if client.is_empty() || description.is_empty() {
        return Err(CourierError::Other("Client and description are required.".to_string()));
    }
    let fee = validate_fee(fee)?;
    let deadline = parse_date(deadline)?.format("%Y-%m-%d").to_string();

    let mut store = open_store()?;
    let today = Local::now().date_naive();
    let id = store.create_delivery_with_invoice(client, description, fee, &deadline, today)?;
    println!("Added delivery #{id} for {client}: {description} ({}, due {deadline})", money(fee));
    Ok(())
}

fn status_cell(delivery: &Delivery, today: &str) -> Cell {
    if delivery.completed {
        let on = delivery.completed_date.as_deref().unwrap_or("?");
        Cell::new(format!("Completed {on}").green())
    } else if delivery.deadline.as_str() < today {
        Cell::new("Overdue".red().bold())
    } else if delivery.deadline.as_str() == today {
        Cell::new("Due today".yellow().bold())
    } else {
        Cell::new("Pending".yellow())
    }
}

pub(crate) fn deliveries_table(rows: &[DeliveryRow]) -> Table {
    let today = Local::now().format("%Y-%m-%d").to_string();
    let mut table = Table::new();
    table.set_header(vec!["ID", "Client", "Description", "Fee", "Deadline", "Status"]);
    for row in rows {
        let d = &row.delivery;
        table.add_row(vec![
            Cell::new(d.id),
            Cell::new(&row.client_name),
            Cell::new(&d.description),
            Cell::new(money(d.fee)),
            Cell::new(&d.deadline),
            status_cell(d, &today),
        ]);
    }
    table
}

pub fn list(query: Option<&str>) -> Result<()> {
    let store = open_store()?;
    let reports = Reports::new(&store);
    let rows = match query {
        Some(q) => reports.filter_deliveries(q)?,
        None => reports.all_deliveries_for_view()?,
    };

    if rows.is_empty() {
        match query {
            Some(q) if !q.trim().is_empty() => println!("No deliveries match \"{}\".", q.trim()),
            _ => println!("No deliveries yet. Add one with `courier deliveries add`."),
        }
        return Ok(());
    }
    println!("Deliveries\n{}", deliveries_table(&rows));
    Ok(())
}

pub fn complete(id: i64) -> Result<()> {
    let mut store = open_store()?;
    let today = Local::now().date_naive();
    if store.complete_delivery(id, today)? {
        println!("Delivery #{id} marked as completed.");
    } else {
        println!("Delivery #{id} was already completed.");
    }
    Ok(())
}

pub fn edit(id: i64, description: Option<&str>, fee: Option<f64>, deadline: Option<&str>) -> Result<()> {
    let mut store = open_store()?;
    let current = store.get_delivery(id)?.ok_or(CourierError::UnknownDelivery(id))?;

    let description = match description.map(str::trim) {
        Some("") => return Err(CourierError::Other("Description cannot be empty.".to_string())),
        Some(d) => d.to_string(),
        None => current.description,
    };
    let fee = match fee {
        Some(f) => validate_fee(f)?,
        None => current.fee,
    };
    let deadline = match deadline {
        Some(d) => parse_date(d)?.format("%Y-%m-%d").to_string(),
        None => current.deadline,
    };

    store.update_delivery(id, &description, fee, &deadline)?;
    println!("Updated delivery #{id}.");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let mut store = open_store()?;
    store.delete_delivery(id)?;
    println!("Deleted delivery #{id} and its invoices. Its history is kept.");
    Ok(())
}

pub fn history(id: i64) -> Result<()> {
    let store = open_store()?;
    let entries = store.delivery_history(id)?;
    let title = match store.get_delivery(id)? {
        Some(delivery) => delivery.description,
        None if !entries.is_empty() => "(deleted)".to_string(),
        None => return Err(CourierError::UnknownDelivery(id)),
    };

    let mut table = Table::new();
    table.set_header(vec!["When", "Action"]);
    for entry in entries {
        table.add_row(vec![Cell::new(entry.timestamp), Cell::new(entry.action)]);
    }
    println!("History for #{id}: {title}\n{table}");
    Ok(())
}
