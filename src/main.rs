use std::time::Duration;

use clap::Parser;
use separator::Separatable;
use tailcrunch::{Config, StopSignal, TronKeypairSource};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

mod cli;

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Cli::parse();
    init_logging(&args.log_level);

    let config = match Config::new(
        args.threads,
        args.matches,
        args.print_every,
        &args.digits,
        &args.output,
        args.max_attempts,
        args.duration.map(Duration::from_secs),
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("\nStopping...");
        handler_stop.stop();
    }) {
        warn!(error = %e, "could not install Ctrl+C handler");
    }

    let expected = config.expected_attempts();
    if config.pattern.accepts_everything() {
        println!("Recording every wallet on {} thread(s)", config.threads);
    } else if expected.is_finite() {
        println!(
            "Searching for {} on {} thread(s), about {} attempts per match",
            config.pattern,
            config.threads,
            (expected.round() as u64).separated_string()
        );
    } else {
        warn!(pattern = %config.pattern, "tail is too long for any address to match");
    }
    println!("Matches are appended to {}", config.output);

    match tailcrunch::crunch(&config, &TronKeypairSource::new(), stop) {
        Ok(summary) => {
            println!(
                "Generated {} wallets, {} matched, {} per second",
                summary.attempts.separated_string(),
                summary.matches.separated_string(),
                (summary.rate() as u64).separated_string()
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
