pub mod optimizer;
pub mod plot;
pub mod schedule;

pub use optimizer::{DispatchError, InvalidInput, optimize, optimize_with_solver, optimize_year};
pub use schedule::{DispatchSchedule, DispatchSummary, HourlyDispatch};
