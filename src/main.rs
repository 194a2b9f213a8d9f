//! Strand Simulator - headless runner
//!
//! CLI Usage:
//!   cargo run                                  # Simulate the procedural groom
//!   cargo run -- --asset data/hair.hgl         # Simulate a hair asset
//!   cargo run -- -n 600 --wind 5.0 --csv       # Custom steps, wind, CSV export
//!   cargo run -- --write-asset groom.hgl       # Save the procedural groom

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec3;
use strand_simulator::{
    config::Parameters,
    export::{export_state_json, CsvExporter},
    geometry::{save_asset, StrandModel},
    state::SimulationMetrics,
    HairSimulationSystem,
};

/// Parsed command line
struct Options {
    asset: Option<PathBuf>,
    params_dir: Option<PathBuf>,
    write_asset: Option<PathBuf>,
    steps: usize,
    wind: f32,
    csv: bool,
    json: bool,
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options {
        asset: None,
        params_dir: None,
        write_asset: None,
        steps: 300,
        wind: 0.0,
        csv: false,
        json: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--asset" | "-a" => {
                i += 1;
                options.asset = args.get(i).map(PathBuf::from);
            }
            "--params" | "-p" => {
                i += 1;
                options.params_dir = args.get(i).map(PathBuf::from);
            }
            "--write-asset" => {
                i += 1;
                options.write_asset = args.get(i).map(PathBuf::from);
            }
            "--steps" | "-n" => {
                i += 1;
                if let Some(value) = args.get(i) {
                    options.steps = value.parse().unwrap_or(300);
                }
            }
            "--wind" | "-w" => {
                i += 1;
                if let Some(value) = args.get(i) {
                    options.wind = value.parse().unwrap_or(0.0);
                }
            }
            "--csv" => options.csv = true,
            "--json" => options.json = true,
            "--help" | "-h" => {
                println!("Usage: strand_simulator [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -a, --asset PATH       Hair asset to simulate (default: procedural groom)");
                println!("  -p, --params DIR       Directory with simulation/hair/groom JSON");
                println!("      --write-asset PATH Save the loaded model as a hair asset");
                println!("  -n, --steps N          Number of steps (default: 300)");
                println!("  -w, --wind X           Wind strength along +X (default: 0)");
                println!("      --csv              Export per-step metrics to exports/");
                println!("      --json             Export the final state to exports/");
                println!("  -h, --help             Print this help message");
                std::process::exit(0);
            }
            other => {
                log::warn!("Ignoring unknown argument {:?}", other);
            }
        }
        i += 1;
    }

    options
}

fn main() -> Result<()> {
    env_logger::init();

    let options = parse_args();
    let params = match &options.params_dir {
        Some(dir) => Parameters::load_from_dir(dir),
        None => Parameters::load_or_default(),
    };

    let system = HairSimulationSystem::new(params.simulation.clone());
    let model = match &options.asset {
        Some(path) => system
            .load_model(path)
            .with_context(|| format!("loading hair asset {}", path.display()))?,
        None => {
            log::info!("No asset given, generating procedural groom");
            Arc::new(StrandModel::generate_groom(&params.groom)?)
        }
    };

    if let Some(path) = &options.write_asset {
        save_asset(path, &model).with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote hair asset: {}", path.display());
    }

    println!("=== Strand Simulator ===\n");
    println!("Strands: {}", model.strand_count());
    println!("Segments per strand: {}", model.segments_per_strand());
    println!("Vertices: {}", model.vertex_count());
    println!("Root triangles: {}", model.triangles().len());

    let mut instance = system.create_instance(&model);
    let mut config = params.hair.clone();
    if options.wind != 0.0 {
        config.wind = Vec3::new(options.wind, 0.0, 0.0);
    }
    system.update_instance_settings(&mut instance, config);

    let mut csv = if options.csv {
        Some(CsvExporter::new(0.0)?)
    } else {
        None
    };

    let steps = options.steps;
    let time_step = params.simulation.default_time_step_sec;
    println!("\n--- Running {} steps (dt = {:.4} s) ---\n", steps, time_step);

    let start_time = Instant::now();
    for step in 0..steps {
        system.simulate_hair(&mut instance, time_step);

        if let Some(exporter) = csv.as_mut() {
            exporter.record(&SimulationMetrics::measure(&instance))?;
        }

        if steps >= 10 && step % (steps / 10) == 0 {
            let metrics = SimulationMetrics::measure(&instance);
            println!(
                "  {:3.0}%: frame={}, tip displacement={:.4}, max length error={:.2e}",
                step as f32 / steps as f32 * 100.0,
                metrics.frame,
                metrics.mean_tip_displacement,
                metrics.max_length_error
            );
        }
    }
    let elapsed = start_time.elapsed();

    let metrics = SimulationMetrics::measure(&instance);
    println!("\n=== Results ===");
    println!("Elapsed time: {:.2?}", elapsed);
    println!("Steps per second: {:.0}", steps as f32 / elapsed.as_secs_f32().max(1e-9));
    println!("Simulation time: {:.3} s", metrics.simulation_time_sec);
    println!("Mean tip displacement: {:.4}", metrics.mean_tip_displacement);
    println!("Max length error: {:.2e}", metrics.max_length_error);
    println!("Mean relative stretch: {:.2e}", metrics.mean_relative_stretch);
    println!("Max vertex speed: {:.4}", metrics.max_vertex_speed);

    if let Some(exporter) = csv {
        let path = exporter.finish()?;
        println!("CSV written: {}", path.display());
    }
    if options.json {
        let path = export_state_json(&instance)?;
        println!("State written: {}", path.display());
    }

    system.destroy_instance(instance);
    system.destroy_model(model);

    Ok(())
}
