//! Example: Denitrification - Simple Chain vs Forced Branching
//!
//! Runs the two reaction networks on the reference grid (321 points on
//! [0, 320] min) and writes each trajectory as CSV into the temporary
//! directory:
//!
//! - Simple chain: NO2 → NO → N2O with constant rates, X0 = [1200, 0, 0]
//! - Forced branching: a nitrite dose feeds NO inside the cells, NO exchanges
//!   with the environment and is reduced to N2O
//!
//! An optional argument runs a JSON configuration file instead:
//!
//! ```bash
//! cargo run --example denitrification -- run.json
//! ```

use denit_rs::{
    config::{SimulationConfig, SolverMethod},
    models::{DoseSchedule, NetworkKind, SimpleChain},
    output::export::{CsvConfig, CsvReporter, TrajectoryReporter},
    physics::RateParameters,
    solver::SimulationResult,
};

use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("═══════════════════════════════════════════════════════");
    println!("  Denitrification Network Study");
    println!("═══════════════════════════════════════════════════════\n");

    let tmp_dir = std::env::temp_dir();

    // ====== User configuration ======

    if let Some(path) = std::env::args().nth(1) {
        let config = SimulationConfig::from_path(&path)?;
        let result = timed_run(&format!("{} ({})", config.network, path), &config)?;
        print_final_state(&result);

        let output = tmp_dir.join("denitrification_custom.csv");
        CsvReporter::new(&output).report(&result)?;
        println!("\n  CSV: {}", output.display());
        return Ok(());
    }

    // =============================================================================================
    // Scenarios
    // =============================================================================================

    let chain = SimulationConfig::default();

    let branching = SimulationConfig {
        network: NetworkKind::ForcedBranching,
        rates: RateParameters::new(vec![45.0, 10.0, 5.0, 2.0])?,
        initial_state: vec![0.0, 0.0, 0.0],
        doses: DoseSchedule::from_pairs(&[(-0.001, 1200.0), (160.0, 600.0)])?,
        ..SimulationConfig::default()
    };

    let mut chain_rk4 = chain.clone();
    chain_rk4.solver.method = SolverMethod::Rk4;

    println!("Configurations:");
    println!("  1. Simple chain     : R = {:?}", chain.rates.as_slice());
    println!("  2. Forced branching : R = {:?}, doses at t = -0.001 and 160 min", branching.rates.as_slice());
    println!("  Grid               : {} points on [{}, {}] min\n", chain.points, chain.t_min, chain.t_max);

    // =============================================================================================
    // Simulations
    // =============================================================================================

    let runs = vec![
        ("simple_chain", &chain),
        ("simple_chain_rk4", &chain_rk4),
        ("forced_branching", &branching),
    ];

    let mut results = Vec::new();
    for (name, config) in runs {
        let result = timed_run(name, config)?;

        let output = tmp_dir.join(format!("denitrification_{}.csv", name));
        CsvReporter::new(&output)
            .with_config(CsvConfig::default().precision(6))
            .report(&result)?;
        println!("     → {}", output.display());

        results.push((name, result));
    }

    // =============================================================================================
    // Summary
    // =============================================================================================

    println!("\n═══════════════════════════════════════════════════════");
    println!("  Results at t = {} min", chain.t_max);
    println!("═══════════════════════════════════════════════════════\n");

    for (name, result) in &results {
        println!("{}:", name);
        print_final_state(result);
    }

    // Closed-form check of the simple chain
    let model = SimpleChain::new(chain.rates.clone())?;
    if let Some(t_depleted) = model.depletion_time(chain.initial_state[0], chain.t_min) {
        println!("\nNO2 formally depleted at t = {:.2} min (concentrations are not clamped)", t_depleted);
    }

    Ok(())
}

/// Solve one configuration and report the elapsed time
fn timed_run(name: &str, config: &SimulationConfig) -> Result<SimulationResult, Box<dyn std::error::Error>> {
    print!("  {:<20}", name);

    let start = Instant::now();
    let result = config.run()?;
    let elapsed = start.elapsed().as_secs_f64() * 1e3;

    println!(
        "{} in {:.2} ms ({} evaluations)",
        if result.success() { "✓" } else { "✗" },
        elapsed,
        result.diagnostic.evaluations
    );
    if !result.success() {
        println!("     {}", result.diagnostic);
    }

    Ok(result)
}

fn print_final_state(result: &SimulationResult) {
    if let Some(last) = result.final_state() {
        for (label, value) in result.labels.iter().zip(last.iter()) {
            println!("  {:<8} {:>12.3}", label, value);
        }
    }
}
