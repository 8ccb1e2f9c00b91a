use dispatch_model::market::{PricePoint, PriceSeries};
use dispatch_model::storage::BatteryConfig;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, Solver, SolverModel, constraint,
    variable,
};
use thiserror::Error;

use crate::dispatch::schedule::{DispatchSchedule, HourlyDispatch};

/// Input problems detected before any LP is constructed
#[derive(Debug, Error, PartialEq)]
pub enum InvalidInput {
    #[error("price series is empty")]
    EmptySeries,
    #[error("price series has a gap at hour {hour}")]
    SeriesGap { hour: usize },
    #[error("first hour {first} is after last hour {last}")]
    HourOrder { first: usize, last: usize },
    #[error("requested hours {first}..={last} fall outside the series hours {available_first}..={available_last}")]
    HourOutOfRange {
        first: usize,
        last: usize,
        available_first: usize,
        available_last: usize,
    },
    #[error("{name} must be strictly positive, got {value}")]
    NonPositiveParameter { name: &'static str, value: f64 },
    #[error("round-trip efficiency must be in (0, 1], got {0}")]
    EfficiencyOutOfRange(f64),
    #[error("{name} of {value} kWh does not fit storage capacity of {capacity} kWh")]
    ChargePinOutOfRange {
        name: &'static str,
        value: f64,
        capacity: f64,
    },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
    /// Infeasible, unbounded, or solver-internal failure. The all-zero
    /// schedule is feasible for every valid input, so this points at an
    /// integration bug rather than a routine condition. Never retried.
    #[error("LP solve failed: {0}")]
    SolveFailure(ResolutionError),
}

/// Optimizes dispatch over `[first_hour, last_hour]` inclusive with the
/// default solver backend.
pub fn optimize(
    series: &PriceSeries,
    first_hour: usize,
    last_hour: usize,
    config: &BatteryConfig,
) -> Result<DispatchSchedule, DispatchError> {
    optimize_with_solver(series, first_hour, last_hour, config, good_lp::clarabel)
}

/// Optimizes dispatch over the whole price series.
pub fn optimize_year(
    series: &PriceSeries,
    config: &BatteryConfig,
) -> Result<DispatchSchedule, DispatchError> {
    let first = series.first_hour().ok_or(InvalidInput::EmptySeries)?;
    let last = series.last_hour().ok_or(InvalidInput::EmptySeries)?;
    optimize(series, first, last, config)
}

/// Builds and solves the dispatch LP for one horizon.
///
/// One `Ein`/`Eout`/`S` triple per hour, linked by the storage transition
/// law with the square-root efficiency split, bounded by the hourly rate
/// caps and the rolling 24-hour discharge cap. Maximizes
/// `sum(lbmp[t] * (Eout[t] - Ein[t]))`.
///
/// Every call builds an independent problem instance; there is no shared
/// state between calls and either a full trajectory comes back or the call
/// fails.
pub fn optimize_with_solver<S: Solver>(
    series: &PriceSeries,
    first_hour: usize,
    last_hour: usize,
    config: &BatteryConfig,
    solver: S,
) -> Result<DispatchSchedule, DispatchError>
where
    <S as Solver>::Model: SolverModel<Error = ResolutionError>,
{
    let window = validate(series, first_hour, last_hour, config)?;

    let hours = window.len();
    let sqrt_eta = config.one_way_efficiency();

    let mut vars = ProblemVariables::new();
    let mut energy_in: Vec<good_lp::Variable> = Vec::with_capacity(hours);
    let mut energy_out: Vec<good_lp::Variable> = Vec::with_capacity(hours);
    let mut charge_state: Vec<good_lp::Variable> = Vec::with_capacity(hours);
    for _t in 0..hours {
        energy_in.push(vars.add(variable().min(0.0)));
        energy_out.push(vars.add(variable().min(0.0)));
        charge_state.push(vars.add(variable().min(0.0).max(config.storage_cap)));
    }

    // Revenue from discharging minus cost of charging, same price both ways
    let mut objective = Expression::default();
    for (t, point) in window.iter().enumerate() {
        objective += point.lbmp * energy_out[t];
        objective -= point.lbmp * energy_in[t];
    }

    let mut model = vars.maximise(objective).using(solver);

    for t in 0..hours {
        if t == 0 {
            model = model.with(constraint!(charge_state[0] == config.starting_charge()));
        } else {
            // Charge pays its loss on the way in, discharge on the way out
            model = model.with(constraint!(
                charge_state[t]
                    == charge_state[t - 1] + energy_in[t - 1] * sqrt_eta
                        - energy_out[t - 1] / sqrt_eta
            ));
        }

        model = model.with(constraint!(energy_out[t] <= config.rate_cap));
        model = model.with(constraint!(energy_in[t] <= config.rate_cap));

        // Discharge must be backed by stored energy, net of the outgoing
        // loss. The transition law alone would let the final hours sell
        // energy the battery never held.
        model = model.with(constraint!(energy_out[t] <= charge_state[t] / sqrt_eta));

        // Rolling 24 h discharge cap, in dataset hour values. Hours with
        // fewer than 24 hours of horizon left start no window of their own;
        // the trailing hours of the horizon end up in no window at all.
        let hour = first_hour + t;
        if (hour as i64) < last_hour as i64 - 24 {
            let window_out: Expression = energy_out[t..t + 24]
                .iter()
                .map(|&var| Expression::from(var))
                .sum();
            model = model.with(constraint!(window_out <= config.daily_discharge_cap));
        }
    }

    // Optional pin on the charge carried past the horizon
    if let Some(final_charge) = config.final_charge {
        let t = hours - 1;
        model = model.with(constraint!(
            charge_state[t] + energy_in[t] * sqrt_eta - energy_out[t] / sqrt_eta == final_charge
        ));
    }

    let started = std::time::Instant::now();
    let solution = model.solve().map_err(DispatchError::SolveFailure)?;
    let solve_duration = started.elapsed();

    let records = window
        .iter()
        .enumerate()
        .map(|(t, point)| HourlyDispatch {
            hour: point.hour,
            energy_in: solution.value(energy_in[t]),
            energy_out: solution.value(energy_out[t]),
            charge_state: solution.value(charge_state[t]),
            lbmp: point.lbmp,
            time_stamp: point.time_stamp,
        })
        .collect();

    Ok(DispatchSchedule::new(
        records,
        config.clone(),
        solve_duration.as_millis(),
    ))
}

/// Fail-fast input validation; returns the price window for the horizon
fn validate<'a>(
    series: &'a PriceSeries,
    first_hour: usize,
    last_hour: usize,
    config: &BatteryConfig,
) -> Result<&'a [PricePoint], InvalidInput> {
    for (name, value) in [
        ("rate_cap", config.rate_cap),
        ("storage_cap", config.storage_cap),
        ("daily_discharge_cap", config.daily_discharge_cap),
    ] {
        if value <= 0.0 {
            return Err(InvalidInput::NonPositiveParameter { name, value });
        }
    }
    if config.round_trip_efficiency <= 0.0 || config.round_trip_efficiency > 1.0 {
        return Err(InvalidInput::EfficiencyOutOfRange(
            config.round_trip_efficiency,
        ));
    }
    for (name, pin) in [
        ("initial charge", config.initial_charge),
        ("final charge", config.final_charge),
    ] {
        if let Some(value) = pin {
            if !(0.0..=config.storage_cap).contains(&value) {
                return Err(InvalidInput::ChargePinOutOfRange {
                    name,
                    value,
                    capacity: config.storage_cap,
                });
            }
        }
    }

    if series.is_empty() {
        return Err(InvalidInput::EmptySeries);
    }
    if first_hour > last_hour {
        return Err(InvalidInput::HourOrder {
            first: first_hour,
            last: last_hour,
        });
    }
    // is_empty was checked above
    let available_first = series.first_hour().unwrap_or(0);
    let available_last = series.last_hour().unwrap_or(0);
    if first_hour < available_first || last_hour > available_last {
        return Err(InvalidInput::HourOutOfRange {
            first: first_hour,
            last: last_hour,
            available_first,
            available_last,
        });
    }

    // Gaps matter only inside the requested horizon; hours the schedule
    // never touches may be missing. A bound hour absent from a series that
    // spans it is itself a gap.
    let window = series.window(first_hour, last_hour).ok_or_else(|| {
        let hour = (first_hour..=last_hour)
            .find(|&h| series.get(h).is_none())
            .unwrap_or(first_hour);
        InvalidInput::SeriesGap { hour }
    })?;
    if let Some(pair) = window
        .windows(2)
        .find(|pair| pair[1].hour != pair[0].hour + 1)
    {
        return Err(InvalidInput::SeriesGap {
            hour: pair[0].hour + 1,
        });
    }
    Ok(window)
}
