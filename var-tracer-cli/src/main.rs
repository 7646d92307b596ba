//! Variable Tracer CLI Application
//!
//! Demo harness for the var-tracer engine: loads tracking settings, installs
//! the tracer for this thread, and runs a small instrumented workload whose
//! variable histories are printed as the functions return.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use var_tracer::{runtime, Settings};

mod demo;

/// Variable Tracer - trace variable lifecycles of an instrumented program
#[derive(Parser, Debug)]
#[command(name = "var-tracer-cli")]
#[command(about = "Trace variable lifecycles of the bundled demo workload", long_about = None)]
#[command(version)]
struct Args {
    /// Path to a settings file (settings.json)
    #[arg(short, long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Render the flat change log as a grid table
    #[arg(long)]
    table: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Variable Tracer CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using engine v{}", var_tracer::VERSION);

    // Load settings; a missing or malformed document falls back to defaults
    let mut settings = match &args.settings {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    if args.table {
        settings.print_table = true;
    }

    println!("═══════════════════════════════════════════════");
    println!("  Variable Tracer - Demo Workload");
    println!("═══════════════════════════════════════════════");
    println!(
        "\nSession started: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    if let Ok(doc) = serde_json::to_string_pretty(&settings) {
        log::debug!("Effective settings: {}", doc);
    }

    {
        // Tracing stays installed for exactly this scope
        let _guard = runtime::start(settings);
        demo::run();
    }

    println!("\n✓ Demo workload finished");
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
