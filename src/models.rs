#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub id: i64,
    pub name: String,
}

/// A unit of work. `completed_date` is set exactly when `completed` is true.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub id: i64,
    pub client_id: i64,
    pub description: String,
    pub completed: bool,
    /// `YYYY-MM-DD`
    pub completed_date: Option<String>,
    pub fee: f64,
    /// `YYYY-MM-DD`
    pub deadline: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: i64,
    pub delivery_id: i64,
    pub amount: f64,
    /// Date issued, `YYYY-MM-DD`.
    pub date: String,
    pub paid: bool,
}

/// One audit entry for a delivery; looked up by delivery id.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub action: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StoreCounts {
    pub clients: usize,
    pub deliveries: usize,
    pub pending: usize,
    pub invoices: usize,
    pub unpaid: usize,
}

/// A delivery joined to its client's display name.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRow {
    pub delivery: Delivery,
    pub client_name: String,
}

/// An invoice joined to its delivery and client for display.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRow {
    pub invoice: Invoice,
    pub client_name: String,
    pub delivery_description: String,
}
