use plotters::prelude::*;

use crate::dispatch::schedule::DispatchSchedule;

/// Plots the price and state-of-charge profiles of a solved schedule
pub fn plot_dispatch_profile(
    schedule: &DispatchSchedule,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    plot_dispatch_profile_with_title(schedule, filename, None)
}

/// Same as `plot_dispatch_profile` with an optional custom caption
pub fn plot_dispatch_profile_with_title(
    schedule: &DispatchSchedule,
    filename: &str,
    title: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = schedule.records();
    if records.is_empty() {
        return Err("Cannot plot an empty schedule".into());
    }

    let hours: Vec<f64> = records.iter().map(|r| r.hour as f64).collect();
    let prices: Vec<f64> = records.iter().map(|r| r.lbmp).collect();
    let charge_states: Vec<f64> = records.iter().map(|r| r.charge_state).collect();

    let first_hour = hours[0];
    let last_hour = hours[hours.len() - 1];
    let price_min = prices.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let price_max = prices.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let storage_cap = schedule.config().storage_cap;

    // A single-hour schedule or a flat price series would otherwise give an
    // empty axis range
    let hour_pad = ((last_hour - first_hour) * 0.02).max(0.5);
    let hour_range = (first_hour - hour_pad)..(last_hour + hour_pad);
    let price_pad = ((price_max - price_min) * 0.05).max(1.0);
    let price_range = (price_min - price_pad)..(price_max + price_pad);

    let root = BitMapBackend::new(filename, (800, 1000)).into_drawing_area();
    root.fill(&WHITE)?;

    let areas = root.split_evenly((2, 1));
    let upper = &areas[0];
    let lower = &areas[1];

    let caption = title.unwrap_or("Battery Dispatch Profile");

    // First subplot: hourly price
    let mut chart1 = ChartBuilder::on(upper)
        .caption(caption, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(hour_range.clone(), price_range)?;

    chart1
        .configure_mesh()
        .x_desc("Hour of year")
        .y_desc("LBMP ($/MWh)")
        .draw()?;

    chart1
        .draw_series(LineSeries::new(
            hours.iter().zip(prices.iter()).map(|(&x, &y)| (x, y)),
            &RED,
        ))?
        .label("LBMP")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &RED));

    chart1.configure_series_labels().draw()?;

    // Second subplot: state of charge
    let mut chart2 = ChartBuilder::on(lower)
        .caption("State of Charge", ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(hour_range, 0f64..storage_cap)?;

    chart2
        .configure_mesh()
        .x_desc("Hour of year")
        .y_desc("Stored energy (kWh)")
        .draw()?;

    chart2
        .draw_series(LineSeries::new(
            hours.iter().zip(charge_states.iter()).map(|(&x, &y)| (x, y)),
            &BLUE,
        ))?
        .label("Charge state")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &BLUE));

    chart2.configure_series_labels().draw()?;

    root.present()?;
    println!("Plot saved as {}", filename);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::optimizer::optimize;
    use dispatch_model::market::PriceSeries;
    use dispatch_model::storage::BatteryConfig;

    #[test]
    fn test_plot_single_hour_flat_price_schedule() {
        // One hour at one price collapses both axis spans; the padding must
        // keep the ranges drawable
        let series = PriceSeries::fixed(50.0, 1);
        let schedule = optimize(&series, 0, 0, &BatteryConfig::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("single_hour.png");
        let filename = path.to_str().unwrap();

        plot_dispatch_profile(&schedule, filename).unwrap();
        assert!(std::fs::metadata(filename).unwrap().len() > 0);
    }

    #[test]
    fn test_plot_multi_hour_schedule() {
        let prices: Vec<f64> = (0..48)
            .map(|hour| if hour % 24 < 12 { 10.0 } else { 80.0 })
            .collect();
        let series = PriceSeries::from_prices(&prices);
        let schedule = optimize(&series, 0, 47, &BatteryConfig::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dispatch.png");
        let filename = path.to_str().unwrap();

        plot_dispatch_profile_with_title(&schedule, filename, Some("Two Day Dispatch")).unwrap();
        assert!(std::fs::metadata(filename).unwrap().len() > 0);
    }
}
