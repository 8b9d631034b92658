use thiserror::Error;

#[derive(Error, Debug)]
pub enum CourierError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown delivery: {0}")]
    UnknownDelivery(i64),

    #[error("Unknown invoice: {0}")]
    UnknownInvoice(i64),

    #[error("Invalid fee: {0}")]
    InvalidFee(String),

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CourierError>;
