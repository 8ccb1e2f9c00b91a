use std::env;
use std::path::Path;

use battery_dispatch_opt::dispatch::optimizer::optimize_year;
use battery_dispatch_opt::dispatch::plot::plot_dispatch_profile;
use battery_dispatch_opt::ingest::lbmp::{DEFAULT_NODE, available_nodes, load_price_series};
use dispatch_model::storage::BatteryConfig;

fn main() {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("nodes") => {
            let Some(file) = args.get(2) else {
                eprintln!("Usage: battery-dispatch-opt nodes <lbmp-file.csv>");
                std::process::exit(1);
            };
            match available_nodes(Path::new(file)) {
                Ok(nodes) => {
                    println!("Nodes in {}:", file);
                    for (name, count) in &nodes {
                        println!("  {:<16} {} rows", name, count);
                    }
                }
                Err(e) => {
                    eprintln!("Error listing nodes: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(dir) => {
            let node = args.get(2).map(|s| s.as_str()).unwrap_or(DEFAULT_NODE);
            if let Err(e) = run_dispatch(Path::new(dir), node) {
                eprintln!("Error optimizing dispatch: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            eprintln!("Usage: battery-dispatch-opt <lbmp-data-dir> [node]");
            eprintln!("       battery-dispatch-opt nodes <lbmp-file.csv>");
            std::process::exit(1);
        }
    }
}

fn run_dispatch(dir: &Path, node: &str) -> Result<(), Box<dyn std::error::Error>> {
    let series = load_price_series(dir, node)?;
    println!("Loaded {} hourly prices for node {}", series.len(), node);

    let config = BatteryConfig::default();
    let schedule = optimize_year(&series, &config)?;
    let summary = schedule.summary();

    println!("=== BATTERY DISPATCH RESULTS ===");
    println!("Node: {}", node);
    println!("Horizon: {} hours", summary.hours);
    println!("Profit: ${:.2}", summary.profit);
    println!("Revenue: ${:.2}", summary.revenue);
    println!("Charging Cost: ${:.2}", summary.cost);
    println!("Total Charged: {:.1} kWh", summary.total_charged_kwh);
    println!("Total Discharged: {:.1} kWh", summary.total_discharged_kwh);
    println!("Equivalent Cycles: {:.1}", summary.equivalent_cycles);
    println!(
        "Charge State Range: {:.1} - {:.1} kWh",
        summary.min_charge_state_kwh, summary.max_charge_state_kwh
    );
    println!("Solve Duration: {} ms", schedule.solve_duration_ms());
    println!("================================");

    if let Err(e) = std::fs::create_dir_all("results") {
        println!("Warning: Failed to create results directory: {}", e);
    } else if let Err(e) = plot_dispatch_profile(&schedule, "results/dispatch_profile.png") {
        println!("Warning: Failed to create plot: {}", e);
    }

    Ok(())
}
