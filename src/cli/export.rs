use std::path::{Path, PathBuf};

use serde::Serialize;

use super::open_store;
use crate::error::Result;
use crate::models::DeliveryRow;
use crate::reports::Reports;
use crate::settings::load_settings;

#[derive(Serialize)]
struct ExportRow<'a> {
    id: i64,
    client: &'a str,
    description: &'a str,
    fee: f64,
    deadline: &'a str,
    completed: bool,
    completed_date: &'a str,
}

pub(crate) fn write_csv(rows: &[DeliveryRow], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        let d = &row.delivery;
        wtr.serialize(ExportRow {
            id: d.id,
            client: &row.client_name,
            description: &d.description,
            fee: d.fee,
            deadline: &d.deadline,
            completed: d.completed,
            completed_date: d.completed_date.as_deref().unwrap_or(""),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn run(output: Option<String>) -> Result<()> {
    let store = open_store()?;
    let rows = Reports::new(&store).all_deliveries_for_view()?;

    let path = match output {
        Some(p) => PathBuf::from(p),
        None => {
            let dir = PathBuf::from(load_settings().data_dir).join("exports");
            std::fs::create_dir_all(&dir)?;
            let stamp = chrono::Local::now().format("%Y%m%d");
            dir.join(format!("deliveries-{stamp}.csv"))
        }
    };

    write_csv(&rows, &path)?;
    println!("Exported {} deliveries to {}", rows.len(), path.display());
    Ok(())
}
