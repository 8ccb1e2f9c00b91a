use chrono::NaiveDateTime;
use dispatch_model::storage::BatteryConfig;
use serde::{Deserialize, Serialize};

/// Solved dispatch decision for one hour of the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyDispatch {
    /// Hour index within the dataset
    pub hour: usize,
    /// Energy charged into the battery during this hour (kWh)
    pub energy_in: f64,
    /// Energy discharged to the grid during this hour (kWh)
    pub energy_out: f64,
    /// Stored energy at the start of this hour (kWh)
    pub charge_state: f64,
    /// LBMP for this hour ($/MWh)
    pub lbmp: f64,
    /// Market timestamp for this hour
    pub time_stamp: NaiveDateTime,
}

/// Full solved trajectory over one optimization horizon
///
/// Records are in increasing hour order, one per hour of the requested
/// range, both ends inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchSchedule {
    records: Vec<HourlyDispatch>,
    config: BatteryConfig,
    solve_duration_ms: u128,
}

/// Aggregate economics of a solved schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub hours: usize,
    /// Revenue from discharging minus cost of charging ($, for kWh * $/MWh inputs scaled by 1/1000)
    pub profit: f64,
    pub revenue: f64,
    pub cost: f64,
    pub total_charged_kwh: f64,
    pub total_discharged_kwh: f64,
    /// Energy drawn from storage relative to capacity
    pub equivalent_cycles: f64,
    pub min_charge_state_kwh: f64,
    pub max_charge_state_kwh: f64,
}

impl DispatchSchedule {
    pub fn new(
        records: Vec<HourlyDispatch>,
        config: BatteryConfig,
        solve_duration_ms: u128,
    ) -> Self {
        DispatchSchedule {
            records,
            config,
            solve_duration_ms,
        }
    }

    pub fn records(&self) -> &[HourlyDispatch] {
        &self.records
    }

    pub fn config(&self) -> &BatteryConfig {
        &self.config
    }

    pub fn solve_duration_ms(&self) -> u128 {
        self.solve_duration_ms
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Revenue from discharging over the horizon
    ///
    /// Prices are $/MWh while energies are kWh, so the objective units are
    /// $/1000. The conversion stays out of the objective to keep the LP
    /// identical to the price-times-energy formulation; it is applied here.
    pub fn revenue(&self) -> f64 {
        self.records
            .iter()
            .map(|r| r.lbmp * r.energy_out / 1000.0)
            .sum()
    }

    /// Cost of charging over the horizon
    pub fn cost(&self) -> f64 {
        self.records
            .iter()
            .map(|r| r.lbmp * r.energy_in / 1000.0)
            .sum()
    }

    pub fn profit(&self) -> f64 {
        self.revenue() - self.cost()
    }

    pub fn total_charged(&self) -> f64 {
        self.records.iter().map(|r| r.energy_in).sum()
    }

    pub fn total_discharged(&self) -> f64 {
        self.records.iter().map(|r| r.energy_out).sum()
    }

    pub fn summary(&self) -> DispatchSummary {
        let total_discharged = self.total_discharged();
        // Energy leaving storage is Eout / sqrt(eta)
        let drawn_from_storage = total_discharged / self.config.one_way_efficiency();
        let min_charge_state = self
            .records
            .iter()
            .map(|r| r.charge_state)
            .fold(f64::INFINITY, f64::min);
        let max_charge_state = self
            .records
            .iter()
            .map(|r| r.charge_state)
            .fold(f64::NEG_INFINITY, f64::max);

        DispatchSummary {
            hours: self.records.len(),
            profit: self.profit(),
            revenue: self.revenue(),
            cost: self.cost(),
            total_charged_kwh: self.total_charged(),
            total_discharged_kwh: total_discharged,
            equivalent_cycles: drawn_from_storage / self.config.storage_cap,
            min_charge_state_kwh: min_charge_state,
            max_charge_state_kwh: max_charge_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hour: usize, energy_in: f64, energy_out: f64, charge_state: f64, lbmp: f64) -> HourlyDispatch {
        let base = chrono::NaiveDate::from_ymd_opt(2017, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        HourlyDispatch {
            hour,
            energy_in,
            energy_out,
            charge_state,
            lbmp,
            time_stamp: base + chrono::Duration::hours(hour as i64),
        }
    }

    #[test]
    fn test_summary_economics() {
        let schedule = DispatchSchedule::new(
            vec![
                record(0, 100.0, 0.0, 100.0, 10.0),
                record(1, 0.0, 80.0, 192.2, 100.0),
            ],
            BatteryConfig::default(),
            3,
        );

        let summary = schedule.summary();
        assert_eq!(summary.hours, 2);
        // Cost: 100 kWh at $10/MWh = $1; revenue: 80 kWh at $100/MWh = $8
        assert!((summary.cost - 1.0).abs() < 1e-12);
        assert!((summary.revenue - 8.0).abs() < 1e-12);
        assert!((summary.profit - 7.0).abs() < 1e-12);
        assert_eq!(summary.total_charged_kwh, 100.0);
        assert_eq!(summary.total_discharged_kwh, 80.0);
        assert_eq!(summary.min_charge_state_kwh, 100.0);
        assert_eq!(summary.max_charge_state_kwh, 192.2);
        // 80 kWh delivered draws 80 / sqrt(0.85) from a 200 kWh store
        let expected_cycles = 80.0 / 0.85_f64.sqrt() / 200.0;
        assert!((summary.equivalent_cycles - expected_cycles).abs() < 1e-12);
    }
}
