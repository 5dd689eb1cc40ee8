//! QPU Middleware Demo
//!
//! Runs pattern recognition and optimization against a simulated QPU, then
//! recalibrates the device.
//!
//! ```text
//! demo-qpu -v
//! demo-qpu --config qpu.yaml --shots 2000 --json
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use qpu_demos::{
    format_histogram, print_device, print_failure, print_header, print_result, print_section,
    print_success,
};
use qpu_runtime::{QpuService, RuntimeConfig};

#[derive(Parser, Debug)]
#[command(name = "demo-qpu")]
#[command(about = "Run the QPU middleware pipeline on a simulated device")]
struct Args {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// YAML runtime configuration
    #[arg(short, long, env = "QPU_CONFIG")]
    config: Option<PathBuf>,

    /// Shots per execution (defaults to the configured value)
    #[arg(short, long)]
    shots: Option<u32>,

    /// Fixed simulator seed
    #[arg(long)]
    seed: Option<u64>,

    /// Pattern-recognition input features
    #[arg(long, value_delimiter = ',', default_value = "0.5,0.3,0.8,0.1")]
    pattern: Vec<f64>,

    /// Optimization parameters
    #[arg(long, value_delimiter = ',', default_value = "0.1,0.4,0.6,0.8")]
    parameters: Vec<f64>,

    /// Per-execution timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print reports as JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let mut config = match &args.config {
        Some(path) => RuntimeConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    if args.seed.is_some() {
        config.simulator.seed = args.seed;
    }
    let shots = args.shots.unwrap_or(config.default_shots);
    let service = QpuService::new(config).context("creating QPU service")?;

    if !args.json {
        print_header("QPU Middleware Demo");
        print_section("Device");
        print_device(&service.device().snapshot());
    }

    // =========================================================================
    // Pattern recognition
    // =========================================================================
    let start = Instant::now();
    let pattern = service.run_pattern_recognition(&args.pattern, shots).await;
    match &pattern {
        Ok(report) if args.json => println!("{}", serde_json::to_string_pretty(report)?),
        Ok(report) => {
            print_section("Pattern Recognition");
            print_result("Input", format!("{:?}", args.pattern));
            print_result("Shots", shots);
            for (key, histogram) in &report.detailed.mitigated.counts {
                print_result(key, format_histogram(histogram));
            }
            print_result("Confidence", format!("{:.3}", report.confidence));
            print_result("Detected", report.pattern_detected);
            print_result("Time", format!("{:.2?}", start.elapsed()));
            print_success("Pattern recognition complete");
        }
        Err(err) => print_failure(&format!("Pattern recognition failed: {err}")),
    }

    // =========================================================================
    // Optimization
    // =========================================================================
    let start = Instant::now();
    let optimization = service.run_optimization(&args.parameters, shots).await;
    match &optimization {
        Ok(report) if args.json => println!("{}", serde_json::to_string_pretty(report)?),
        Ok(report) => {
            print_section("Optimization");
            print_result("Parameters", format!("{:?}", args.parameters));
            print_result("Optimal solution", &report.optimal_solution);
            print_result("Execution id", report.detailed.raw.execution_id);
            print_result("Time", format!("{:.2?}", start.elapsed()));
            print_success("Optimization complete");
        }
        Err(err) => print_failure(&format!("Optimization failed: {err}")),
    }

    // =========================================================================
    // Timed execution and calibration
    // =========================================================================
    if let Some(ms) = args.timeout_ms {
        let template = qpu_ir::template::encode_and_entangle(
            &args.pattern,
            service.device().config().num_qubits,
            service.config().pattern.layers,
            service.config().truncation,
        )?;
        let circuit = qpu_ir::CircuitSpec::build(template.active_qubits, template.operations)?;
        match service
            .execute_with_timeout(&circuit, shots, Duration::from_millis(ms))
            .await
        {
            Ok(result) if !args.json => {
                print_section("Timed Execution");
                print_result("Elapsed", format!("{} ms", result.execution_time_ms));
            }
            Ok(_) => {}
            Err(err) => print_failure(&format!("Timed execution failed: {err}")),
        }
    }

    let calibrated = service.calibrate();
    if !args.json {
        print_section("Calibration");
        if calibrated {
            print_success("Device recalibrated");
        } else {
            print_failure("Calibration failed");
        }
        print_device(&service.device().snapshot());
        println!();
    }

    pattern?;
    optimization?;
    Ok(())
}
