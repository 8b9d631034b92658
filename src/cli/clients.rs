use comfy_table::{Cell, Table};

use super::open_store;
use crate::error::{CourierError, Result};
use crate::store::RecordStore;

pub fn add(name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CourierError::Other("Client name is required.".to_string()));
    }
    let store = open_store()?;
    if let Some(existing) = store.get_client_by_name(name)? {
        println!("Client already exists: #{} {}", existing.id, existing.name);
        return Ok(());
    }
    let id = store.find_or_create_client(name)?;
    println!("Added client #{id}: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let store = open_store()?;
    let clients = store.list_clients()?;
    let counts = clients
        .iter()
        .map(|c| store.delivery_count_for_client(c.id))
        .collect::<Result<Vec<_>>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Deliveries"]);
    for (client, count) in clients.iter().zip(counts) {
        table.add_row(vec![Cell::new(client.id), Cell::new(&client.name), Cell::new(count)]);
    }
    println!("Clients\n{table}");
    Ok(())
}
