use serde::{Deserialize, Serialize};

/// Physical and regulatory parameters of one grid-connected storage unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryConfig {
    pub rate_cap: f64,            // Max energy flow in or out per hour (kWh)
    pub storage_cap: f64,         // Max stored energy (kWh)
    pub daily_discharge_cap: f64, // Max discharge within any rolling 24 h window (kWh)
    pub round_trip_efficiency: f64, // Fraction retained over one full charge/discharge cycle
    pub initial_charge: Option<f64>, // Stored energy at the first hour; None = half capacity
    pub final_charge: Option<f64>, // Required stored energy past the last hour; None = free
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            rate_cap: 100.0,
            storage_cap: 200.0,
            daily_discharge_cap: 200.0,
            round_trip_efficiency: 0.85,
            initial_charge: None,
            final_charge: None,
        }
    }
}

impl BatteryConfig {
    /// Stored energy at the start of the horizon
    ///
    /// Defaults to half of capacity when not set explicitly.
    pub fn starting_charge(&self) -> f64 {
        self.initial_charge.unwrap_or(self.storage_cap / 2.0)
    }

    /// One-way efficiency factor, sqrt of the round-trip value
    ///
    /// Charging multiplies by this factor and discharging divides by it, so
    /// a full cycle loses exactly `1 - round_trip_efficiency`.
    pub fn one_way_efficiency(&self) -> f64 {
        self.round_trip_efficiency.sqrt()
    }

    /// Checks that all parameters are in their allowed ranges
    pub fn is_valid(&self) -> bool {
        self.rate_cap > 0.0
            && self.storage_cap > 0.0
            && self.daily_discharge_cap > 0.0
            && self.round_trip_efficiency > 0.0
            && self.round_trip_efficiency <= 1.0
            && self.charge_pin_in_bounds(self.initial_charge)
            && self.charge_pin_in_bounds(self.final_charge)
    }

    fn charge_pin_in_bounds(&self, pin: Option<f64>) -> bool {
        match pin {
            Some(value) => (0.0..=self.storage_cap).contains(&value),
            None => true,
        }
    }
}
