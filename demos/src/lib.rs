//! QPU Middleware Demo Helpers
//!
//! Console formatting shared by the demo binaries.

use console::style;
use qpu_hal::{DeviceSnapshot, Histogram};

/// Print a demo header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print a failure message.
pub fn print_failure(message: &str) {
    println!("{} {}", style("✗").red().bold(), message);
}

/// Print device name, status and calibration state.
pub fn print_device(snapshot: &DeviceSnapshot) {
    print_result("Device", &snapshot.name);
    print_result("Status", snapshot.status);
    print_result("Qubits", snapshot.config.num_qubits);
    print_result("Error rate", format!("{:.4}", snapshot.config.error_rate));
    match snapshot.last_calibrated {
        Some(at) => print_result("Last calibrated", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => print_result("Last calibrated", "never"),
    }
    print_result("Executions", snapshot.executions_completed);
}

/// Render a histogram as `outcome=count` pairs.
pub fn format_histogram(histogram: &Histogram) -> String {
    if histogram.is_empty() {
        return style("(empty)").dim().to_string();
    }
    histogram
        .iter()
        .map(|(outcome, count)| format!("{outcome}={count}"))
        .collect::<Vec<_>>()
        .join(" ")
}
