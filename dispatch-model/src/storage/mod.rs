pub mod battery;

pub use battery::BatteryConfig;
