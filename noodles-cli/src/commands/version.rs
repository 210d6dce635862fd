//! Version command - show version information.

use anyhow::Result;

/// Version information.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the version command.
pub fn run() -> Result<()> {
    println!("Noodles - Operator Graph Execution Engine");
    println!();
    println!("Version:     {}", VERSION);
    println!(
        "Platform:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    println!();
    println!("Components:");
    println!("  noodles-core       Operator trait, values, edges, errors");
    println!("  noodles-executor   Scheduler, dirty tracking, frame loop, scopes");
    println!("  noodles-operators  Built-in operators and reactive fields");
    println!("  noodles-cli        Command-line interface");

    Ok(())
}
