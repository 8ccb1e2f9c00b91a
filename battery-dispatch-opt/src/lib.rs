pub mod dispatch;
pub mod ingest;

// Re-export commonly used items for convenience
pub use dispatch::optimizer::{optimize, optimize_year};
pub use dispatch::schedule::DispatchSchedule;
