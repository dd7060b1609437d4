mod storage;
mod types;

pub use storage::{FALLBACK_CAPACITY, HistoryStorage};
pub use types::PredictionRecord;
