use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuotaError {
    #[error("Daily free limit reached, resets on {resets_at}")]
    Exceeded { resets_at: NaiveDate },

    #[error("Usage counter storage failure: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, QuotaError>;
