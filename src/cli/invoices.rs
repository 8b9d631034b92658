use colored::Colorize;
use comfy_table::{Cell, Table};

use super::open_store;
use crate::error::Result;
use crate::fmt::money;
use crate::reports::Reports;

pub fn list() -> Result<()> {
    let store = open_store()?;
    let rows = Reports::new(&store).invoices_for_view()?;
    if rows.is_empty() {
        println!("No invoices yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Client", "Delivery", "Amount", "Issued", "Status"]);
    let mut outstanding = 0.0;
    for row in &rows {
        let inv = &row.invoice;
        let status = if inv.paid {
            Cell::new("Paid".green())
        } else {
            outstanding += inv.amount;
            Cell::new("Unpaid".red())
        };
        table.add_row(vec![
            Cell::new(inv.id),
            Cell::new(&row.client_name),
            Cell::new(&row.delivery_description),
            Cell::new(money(inv.amount)),
            Cell::new(&inv.date),
            status,
        ]);
    }
    println!("Invoices\n{table}");
    println!("Outstanding: {}", money(outstanding).bold());
    Ok(())
}

pub fn pay(id: i64) -> Result<()> {
    let store = open_store()?;
    store.mark_invoice_paid(id)?;
    println!("Invoice #{id} marked as paid.");
    Ok(())
}
