use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Local, NaiveDate};

use crate::error::Result;
use crate::models::{Delivery, DeliveryRow, InvoiceRow};
use crate::store::RecordStore;

/// Client name shown in the full delivery view when `client_id` dangles.
pub const UNKNOWN_CLIENT: &str = "Unknown Client";
/// Client name shown in filtered results when `client_id` dangles.
pub const UNKNOWN_CLIENT_SHORT: &str = "Unknown";

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Completion date of a completed delivery, or `None` when it is pending,
/// has no date, or the date does not parse. Bad rows are logged and skipped
/// so one of them cannot break a whole report.
fn completion_date(delivery: &Delivery) -> Option<NaiveDate> {
    if !delivery.completed {
        return None;
    }
    let raw = delivery.completed_date.as_deref()?;
    match parse_date(raw) {
        Some(date) => Some(date),
        None => {
            tracing::warn!(
                delivery_id = delivery.id,
                completed_date = raw,
                "skipping delivery with malformed completion date"
            );
            None
        }
    }
}

/// Reporting and aggregation over a record store. Every call reads the store
/// fresh; nothing is cached between calls.
pub struct Reports<'a, S: RecordStore> {
    store: &'a S,
}

// ---------------------------------------------------------------------------
// Dashboard stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub earnings: f64,
}

// ---------------------------------------------------------------------------
// Earnings over time
// ---------------------------------------------------------------------------

/// Parallel month labels (`YYYY-MM`, ascending) and fee totals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EarningsSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl EarningsSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels.iter().map(String::as_str).zip(self.values.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// Reminders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reminder {
    /// Pending deliveries whose deadline is today or earlier.
    DueOrOverdue { count: usize },
    UnpaidInvoices { count: usize },
}

impl fmt::Display for Reminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reminder::DueOrOverdue { count } => {
                write!(f, "You have {count} delivery(ies) due or overdue.")
            }
            Reminder::UnpaidInvoices { count } => write!(f, "You have {count} unpaid invoice(s)."),
        }
    }
}

impl<'a, S: RecordStore> Reports<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn dashboard_stats(&self) -> Result<DashboardStats> {
        let deliveries = self.store.list_deliveries()?;
        let total = deliveries.len();
        let completed = deliveries.iter().filter(|d| d.completed).count();
        let earnings: f64 = deliveries.iter().filter(|d| d.completed).map(|d| d.fee).sum();
        tracing::debug!(total, completed, "computed dashboard stats");
        Ok(DashboardStats {
            total,
            completed,
            pending: total - completed,
            earnings,
        })
    }

    /// Fees of completed deliveries bucketed by completion month. Months with
    /// no completions are absent rather than zero.
    pub fn earnings_over_time(&self) -> Result<EarningsSeries> {
        let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
        for delivery in self.store.list_deliveries()? {
            if let Some(date) = completion_date(&delivery) {
                *by_month.entry(date.format("%Y-%m").to_string()).or_insert(0.0) += delivery.fee;
            }
        }
        tracing::debug!(months = by_month.len(), "computed earnings over time");
        let (labels, values) = by_month.into_iter().unzip();
        Ok(EarningsSeries { labels, values })
    }

    /// Completions per day of the current month, evaluated at call time.
    pub fn daily_activity_current_month(&self) -> Result<BTreeMap<u32, u32>> {
        let today = Local::now().date_naive();
        self.daily_activity_for(today.year(), today.month())
    }

    /// Completions per day-of-month for the given calendar month. Sparse: days
    /// without completions are absent.
    pub fn daily_activity_for(&self, year: i32, month: u32) -> Result<BTreeMap<u32, u32>> {
        let mut activity = BTreeMap::new();
        for delivery in self.store.list_deliveries()? {
            if let Some(date) = completion_date(&delivery) {
                if date.year() == year && date.month() == month {
                    *activity.entry(date.day()).or_insert(0) += 1;
                }
            }
        }
        tracing::debug!(year, month, days = activity.len(), "computed daily activity");
        Ok(activity)
    }

    pub fn reminders(&self) -> Result<Vec<Reminder>> {
        self.reminders_as_of(Local::now().date_naive())
    }

    /// Overdue-delivery reminder first, then unpaid invoices. Read-only, so
    /// repeated calls without intervening writes agree.
    pub fn reminders_as_of(&self, today: NaiveDate) -> Result<Vec<Reminder>> {
        let today = today.format("%Y-%m-%d").to_string();
        let overdue = self
            .store
            .list_deliveries()?
            .iter()
            .filter(|d| !d.completed && d.deadline.as_str() <= today.as_str())
            .count();
        let unpaid = self.store.list_invoices()?.iter().filter(|i| !i.paid).count();

        let mut reminders = Vec::new();
        if overdue > 0 {
            reminders.push(Reminder::DueOrOverdue { count: overdue });
        }
        if unpaid > 0 {
            reminders.push(Reminder::UnpaidInvoices { count: unpaid });
        }
        Ok(reminders)
    }

    /// Every delivery with its client name.
    pub fn all_deliveries_for_view(&self) -> Result<Vec<DeliveryRow>> {
        let mut rows = Vec::new();
        for delivery in self.store.list_deliveries()? {
            let client_name = match self.store.get_client(delivery.client_id)? {
                Some(client) => client.name,
                None => UNKNOWN_CLIENT.to_string(),
            };
            rows.push(DeliveryRow { delivery, client_name });
        }
        Ok(rows)
    }

    /// Deliveries whose description or client name contains `query`,
    /// case-insensitively after trimming. A blank query is no filter at all.
    pub fn filter_deliveries(&self, query: &str) -> Result<Vec<DeliveryRow>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.all_deliveries_for_view();
        }
        let mut rows = Vec::new();
        for delivery in self.store.list_deliveries()? {
            let client = self.store.get_client(delivery.client_id)?;
            let description_hit = delivery.description.to_lowercase().contains(&query);
            let client_hit = client
                .as_ref()
                .is_some_and(|c| c.name.to_lowercase().contains(&query));
            if description_hit || client_hit {
                let client_name = client
                    .map(|c| c.name)
                    .unwrap_or_else(|| UNKNOWN_CLIENT_SHORT.to_string());
                rows.push(DeliveryRow { delivery, client_name });
            }
        }
        tracing::debug!(query = %query, matches = rows.len(), "filtered deliveries");
        Ok(rows)
    }

    /// Every invoice joined to its delivery and client.
    pub fn invoices_for_view(&self) -> Result<Vec<InvoiceRow>> {
        let mut rows = Vec::new();
        for invoice in self.store.list_invoices()? {
            let (client_name, delivery_description) = match self.store.get_delivery(invoice.delivery_id)? {
                Some(delivery) => {
                    let client_name = match self.store.get_client(delivery.client_id)? {
                        Some(client) => client.name,
                        None => UNKNOWN_CLIENT.to_string(),
                    };
                    (client_name, delivery.description)
                }
                None => ("N/A".to_string(), "Delivery not found".to_string()),
            };
            rows.push(InvoiceRow {
                invoice,
                client_name,
                delivery_description,
            });
        }
        Ok(rows)
    }
}
