use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{get_connection, init_db};
use crate::error::{CourierError, Result};
use crate::models::{Client, Delivery, HistoryEntry, Invoice, StoreCounts};

/// Read side of the record store, as consumed by the reporting engine.
pub trait RecordStore {
    /// All deliveries, ordered by deadline then id.
    fn list_deliveries(&self) -> Result<Vec<Delivery>>;
    /// All invoices, ordered by id.
    fn list_invoices(&self) -> Result<Vec<Invoice>>;
    fn get_client(&self, id: i64) -> Result<Option<Client>>;
    fn get_client_by_name(&self, name: &str) -> Result<Option<Client>>;
    fn get_delivery(&self, id: i64) -> Result<Option<Delivery>>;
}

const DELIVERY_COLUMNS: &str =
    "id, client_id, description, completed, completed_date, fee, deadline";

fn delivery_from_row(row: &Row) -> rusqlite::Result<Delivery> {
    Ok(Delivery {
        id: row.get(0)?,
        client_id: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
        completed_date: row.get(4)?,
        fee: row.get(5)?,
        deadline: row.get(6)?,
    })
}

fn invoice_from_row(row: &Row) -> rusqlite::Result<Invoice> {
    Ok(Invoice {
        id: row.get(0)?,
        delivery_id: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        paid: row.get(4)?,
    })
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn now_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Exact-name lookup, inserting a new client when there is none. Names are
/// not unique in the real world; the lowest id wins.
fn find_or_create_client_in(conn: &Connection, name: &str) -> Result<i64> {
    let existing = conn
        .query_row(
            "SELECT id FROM clients WHERE name = ?1 ORDER BY id LIMIT 1",
            [name],
            |r| r.get::<_, i64>(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute("INSERT INTO clients (name) VALUES (?1)", [name])?;
    let id = conn.last_insert_rowid();
    tracing::info!(client_id = id, name, "created client");
    Ok(id)
}

fn add_history(conn: &Connection, delivery_id: i64, action: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO delivery_history (delivery_id, action, timestamp) VALUES (?1, ?2, ?3)",
        params![delivery_id, action, now_timestamp()],
    )?;
    Ok(())
}

/// SQLite-backed record store. Owns its connection; callers pass the store
/// handle explicitly to whatever needs it.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (and create if needed) the database at `path`.
    pub fn open(path: &std::path::Path) -> Result<Self> {
        let conn = get_connection(path)?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn list_clients(&self) -> Result<Vec<Client>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM clients ORDER BY name, id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Client {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Returns the id of the client named exactly `name`, creating it first if
    /// there is none.
    pub fn find_or_create_client(&self, name: &str) -> Result<i64> {
        find_or_create_client_in(&self.conn, name)
    }

    /// Create a pending delivery together with its unpaid invoice.
    pub fn create_delivery_with_invoice(
        &mut self,
        client_name: &str,
        description: &str,
        fee: f64,
        deadline: &str,
        today: NaiveDate,
    ) -> Result<i64> {
        let tx = self.conn.transaction()?;
        let client_id = find_or_create_client_in(&tx, client_name)?;
        tx.execute(
            "INSERT INTO deliveries (client_id, description, completed, completed_date, fee, deadline) \
             VALUES (?1, ?2, 0, NULL, ?3, ?4)",
            params![client_id, description, fee, deadline],
        )?;
        let delivery_id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO invoices (delivery_id, amount, date, paid) VALUES (?1, ?2, ?3, 0)",
            params![delivery_id, fee, iso_date(today)],
        )?;
        add_history(&tx, delivery_id, "Created")?;
        tx.commit()?;
        tracing::info!(delivery_id, client_id, fee, deadline, "created delivery with invoice");
        Ok(delivery_id)
    }

    /// Move a delivery to COMPLETED, stamping `today` as the completion date.
    /// Returns `false` when it was already completed; the first completion
    /// date is kept.
    pub fn complete_delivery(&mut self, id: i64, today: NaiveDate) -> Result<bool> {
        let delivery = self.get_delivery(id)?.ok_or(CourierError::UnknownDelivery(id))?;
        if delivery.completed {
            return Ok(false);
        }
        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE deliveries SET completed = 1, completed_date = ?1 WHERE id = ?2",
            params![iso_date(today), id],
        )?;
        add_history(&tx, id, "Completed")?;
        tx.commit()?;
        tracing::info!(delivery_id = id, "delivery completed");
        Ok(true)
    }

    pub fn update_delivery(&mut self, id: i64, description: &str, fee: f64, deadline: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE deliveries SET description = ?1, fee = ?2, deadline = ?3 WHERE id = ?4",
            params![description, fee, deadline, id],
        )?;
        if changed == 0 {
            return Err(CourierError::UnknownDelivery(id));
        }
        add_history(&tx, id, "Edited")?;
        tx.commit()?;
        tracing::info!(delivery_id = id, "delivery edited");
        Ok(())
    }

    /// Delete a delivery and its invoices. The history is kept and gains a
    /// final `Deleted` entry.
    pub fn delete_delivery(&mut self, id: i64) -> Result<()> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute("DELETE FROM deliveries WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(CourierError::UnknownDelivery(id));
        }
        add_history(&tx, id, "Deleted")?;
        tx.commit()?;
        tracing::info!(delivery_id = id, "delivery deleted");
        Ok(())
    }

    /// Mark an invoice paid. Paying an already-paid invoice is a no-op.
    pub fn mark_invoice_paid(&self, id: i64) -> Result<()> {
        let changed = self.conn.execute("UPDATE invoices SET paid = 1 WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(CourierError::UnknownInvoice(id));
        }
        tracing::info!(invoice_id = id, "invoice paid");
        Ok(())
    }

    /// Audit trail for a delivery, oldest first. Survives the delivery's
    /// deletion.
    pub fn delivery_history(&self, delivery_id: i64) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT action, timestamp FROM delivery_history \
             WHERE delivery_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map([delivery_id], |row| {
                Ok(HistoryEntry {
                    action: row.get(0)?,
                    timestamp: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn delivery_count_for_client(&self, client_id: i64) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT count(*) FROM deliveries WHERE client_id = ?1",
            [client_id],
            |r| r.get(0),
        )?;
        Ok(count as usize)
    }

    /// Row totals for the status screen.
    pub fn counts(&self) -> Result<StoreCounts> {
        let counts = self.conn.query_row(
            "SELECT \
                (SELECT count(*) FROM clients), \
                (SELECT count(*) FROM deliveries), \
                (SELECT count(*) FROM deliveries WHERE completed = 0), \
                (SELECT count(*) FROM invoices), \
                (SELECT count(*) FROM invoices WHERE paid = 0)",
            [],
            |r| {
                Ok(StoreCounts {
                    clients: r.get::<_, i64>(0)? as usize,
                    deliveries: r.get::<_, i64>(1)? as usize,
                    pending: r.get::<_, i64>(2)? as usize,
                    invoices: r.get::<_, i64>(3)? as usize,
                    unpaid: r.get::<_, i64>(4)? as usize,
                })
            },
        )?;
        Ok(counts)
    }
}

impl RecordStore for SqliteStore {
    fn list_deliveries(&self) -> Result<Vec<Delivery>> {
        let sql = format!("SELECT {DELIVERY_COLUMNS} FROM deliveries ORDER BY deadline ASC, id ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], delivery_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn list_invoices(&self) -> Result<Vec<Invoice>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, delivery_id, amount, date, paid FROM invoices ORDER BY id")?;
        let rows = stmt
            .query_map([], invoice_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get_client(&self, id: i64) -> Result<Option<Client>> {
        let client = self
            .conn
            .query_row("SELECT id, name FROM clients WHERE id = ?1", [id], |row| {
                Ok(Client {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .optional()?;
        Ok(client)
    }

    fn get_client_by_name(&self, name: &str) -> Result<Option<Client>> {
        let client = self
            .conn
            .query_row(
                "SELECT id, name FROM clients WHERE name = ?1 ORDER BY id LIMIT 1",
                [name],
                |row| {
                    Ok(Client {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(client)
    }

    fn get_delivery(&self, id: i64) -> Result<Option<Delivery>> {
        let sql = format!("SELECT {DELIVERY_COLUMNS} FROM deliveries WHERE id = ?1");
        let delivery = self.conn.query_row(&sql, [id], delivery_from_row).optional()?;
        Ok(delivery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_find_or_create_client_reuses_existing() {
        let (_dir, store) = test_store();
        let first = store.find_or_create_client("Acme Corp").unwrap();
        let second = store.find_or_create_client("Acme Corp").unwrap();
        let other = store.find_or_create_client("Globex").unwrap();
        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(store.list_clients().unwrap().len(), 2);
    }

    #[test]
    fn test_find_or_create_client_is_case_sensitive() {
        let (_dir, store) = test_store();
        let a = store.find_or_create_client("acme").unwrap();
        let b = store.find_or_create_client("Acme").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_create_delivery_with_invoice() {
        let (_dir, mut store) = test_store();
        let id = store
            .create_delivery_with_invoice("Acme Corp", "Landing page", 1200.0, "2024-05-01", day("2024-04-10"))
            .unwrap();

        let delivery = store.get_delivery(id).unwrap().unwrap();
        assert_eq!(delivery.description, "Landing page");
        assert!(!delivery.completed);
        assert!(delivery.completed_date.is_none());
        assert_eq!(delivery.fee, 1200.0);
        assert_eq!(delivery.deadline, "2024-05-01");

        let client = store.get_client(delivery.client_id).unwrap().unwrap();
        assert_eq!(client.name, "Acme Corp");

        let invoices = store.list_invoices().unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].delivery_id, id);
        assert_eq!(invoices[0].amount, 1200.0);
        assert_eq!(invoices[0].date, "2024-04-10");
        assert!(!invoices[0].paid);

        let history = store.delivery_history(id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, "Created");
    }

    #[test]
    fn test_second_delivery_reuses_client() {
        let (_dir, mut store) = test_store();
        let a = store
            .create_delivery_with_invoice("Acme", "One", 10.0, "2024-01-01", day("2024-01-01"))
            .unwrap();
        let b = store
            .create_delivery_with_invoice("Acme", "Two", 20.0, "2024-01-02", day("2024-01-01"))
            .unwrap();
        let da = store.get_delivery(a).unwrap().unwrap();
        let db = store.get_delivery(b).unwrap().unwrap();
        assert_eq!(da.client_id, db.client_id);
        assert_eq!(store.list_clients().unwrap().len(), 1);
    }

    #[test]
    fn test_complete_delivery_sets_date_once() {
        let (_dir, mut store) = test_store();
        let id = store
            .create_delivery_with_invoice("Acme", "Logo", 300.0, "2024-03-01", day("2024-02-01"))
            .unwrap();

        assert!(store.complete_delivery(id, day("2024-02-20")).unwrap());
        let d = store.get_delivery(id).unwrap().unwrap();
        assert!(d.completed);
        assert_eq!(d.completed_date.as_deref(), Some("2024-02-20"));

        // Terminal state: a second completion keeps the original date.
        assert!(!store.complete_delivery(id, day("2024-02-25")).unwrap());
        let d = store.get_delivery(id).unwrap().unwrap();
        assert_eq!(d.completed_date.as_deref(), Some("2024-02-20"));

        let actions: Vec<String> = store
            .delivery_history(id)
            .unwrap()
            .into_iter()
            .map(|h| h.action)
            .collect();
        assert_eq!(actions, vec!["Created", "Completed"]);
    }

    #[test]
    fn test_complete_unknown_delivery() {
        let (_dir, mut store) = test_store();
        let err = store.complete_delivery(42, day("2024-01-01")).unwrap_err();
        assert!(matches!(err, CourierError::UnknownDelivery(42)));
    }

    #[test]
    fn test_update_delivery() {
        let (_dir, mut store) = test_store();
        let id = store
            .create_delivery_with_invoice("Acme", "Logo", 300.0, "2024-03-01", day("2024-02-01"))
            .unwrap();
        store.update_delivery(id, "Logo v2", 350.0, "2024-03-15").unwrap();
        let d = store.get_delivery(id).unwrap().unwrap();
        assert_eq!(d.description, "Logo v2");
        assert_eq!(d.fee, 350.0);
        assert_eq!(d.deadline, "2024-03-15");
        let last = store.delivery_history(id).unwrap().pop().unwrap();
        assert_eq!(last.action, "Edited");

        let err = store.update_delivery(999, "x", 1.0, "2024-01-01").unwrap_err();
        assert!(matches!(err, CourierError::UnknownDelivery(999)));
    }

    #[test]
    fn test_delete_delivery_removes_invoices_keeps_history() {
        let (_dir, mut store) = test_store();
        let id = store
            .create_delivery_with_invoice("Acme", "Logo", 300.0, "2024-03-01", day("2024-02-01"))
            .unwrap();
        store.complete_delivery(id, day("2024-02-20")).unwrap();
        assert_eq!(store.delivery_history(id).unwrap().len(), 2);

        store.delete_delivery(id).unwrap();
        assert!(store.get_delivery(id).unwrap().is_none());
        assert!(store.list_invoices().unwrap().is_empty());
        let actions: Vec<String> = store
            .delivery_history(id)
            .unwrap()
            .into_iter()
            .map(|h| h.action)
            .collect();
        assert_eq!(actions, vec!["Created", "Completed", "Deleted"]);
        // Clients are never deleted.
        assert_eq!(store.list_clients().unwrap().len(), 1);

        assert!(matches!(
            store.delete_delivery(id).unwrap_err(),
            CourierError::UnknownDelivery(_)
        ));
    }

    #[test]
    fn test_deleted_delivery_id_is_not_reused() {
        let (_dir, mut store) = test_store();
        let today = day("2024-01-01");
        let old = store.create_delivery_with_invoice("Acme", "Logo", 300.0, "2024-03-01", today).unwrap();
        store.delete_delivery(old).unwrap();
        let new = store.create_delivery_with_invoice("Acme", "Cards", 120.0, "2024-03-05", today).unwrap();
        assert_ne!(old, new);
        let actions: Vec<String> = store.delivery_history(new).unwrap().into_iter().map(|h| h.action).collect();
        assert_eq!(actions, vec!["Created"]);
    }

    #[test]
    fn test_mark_invoice_paid() {
        let (_dir, mut store) = test_store();
        store
            .create_delivery_with_invoice("Acme", "Logo", 300.0, "2024-03-01", day("2024-02-01"))
            .unwrap();
        let invoice_id = store.list_invoices().unwrap()[0].id;
        store.mark_invoice_paid(invoice_id).unwrap();
        store.mark_invoice_paid(invoice_id).unwrap();
        assert!(store.list_invoices().unwrap()[0].paid);

        assert!(matches!(
            store.mark_invoice_paid(invoice_id + 100).unwrap_err(),
            CourierError::UnknownInvoice(_)
        ));
    }

    #[test]
    fn test_list_deliveries_ordered_by_deadline() {
        let (_dir, mut store) = test_store();
        let today = day("2024-01-01");
        store.create_delivery_with_invoice("A", "late", 1.0, "2024-09-01", today).unwrap();
        store.create_delivery_with_invoice("B", "early", 1.0, "2024-02-01", today).unwrap();
        store.create_delivery_with_invoice("C", "middle", 1.0, "2024-05-01", today).unwrap();
        let names: Vec<String> = store
            .list_deliveries()
            .unwrap()
            .into_iter()
            .map(|d| d.description)
            .collect();
        assert_eq!(names, vec!["early", "middle", "late"]);
    }

    #[test]
    fn test_counts() {
        let (_dir, mut store) = test_store();
        assert_eq!(store.counts().unwrap(), StoreCounts::default());

        let today = day("2024-01-01");
        let a = store.create_delivery_with_invoice("Acme", "Logo", 300.0, "2024-03-01", today).unwrap();
        store.create_delivery_with_invoice("Acme", "Cards", 120.0, "2024-03-05", today).unwrap();
        store.create_delivery_with_invoice("Globex", "Audit", 80.0, "2024-03-09", today).unwrap();
        store.complete_delivery(a, day("2024-02-01")).unwrap();
        let first_invoice = store.list_invoices().unwrap()[0].id;
        store.mark_invoice_paid(first_invoice).unwrap();

        assert_eq!(
            store.counts().unwrap(),
            StoreCounts {
                clients: 2,
                deliveries: 3,
                pending: 2,
                invoices: 3,
                unpaid: 2,
            }
        );
        let acme = store.get_client_by_name("Acme").unwrap().unwrap();
        assert_eq!(store.delivery_count_for_client(acme.id).unwrap(), 2);
        assert_eq!(store.delivery_count_for_client(acme.id + 100).unwrap(), 0);
    }

    #[test]
    fn test_lookups_return_none_when_absent() {
        let (_dir, store) = test_store();
        assert!(store.get_client(1).unwrap().is_none());
        assert!(store.get_client_by_name("Nobody").unwrap().is_none());
        assert!(store.get_delivery(1).unwrap().is_none());
        assert!(store.list_deliveries().unwrap().is_empty());
        assert!(store.list_invoices().unwrap().is_empty());
    }
}
