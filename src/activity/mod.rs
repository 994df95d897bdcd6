//! API activity log: one JSONL line per backend request, plus the summary
//! shown by `nutriboard activity`.

pub mod logger;
pub mod reporter;

pub use logger::ActivityLogger;
