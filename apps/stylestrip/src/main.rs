use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::debug;
use std::io::{BufWriter, Write};
use stylestrip_detach::{Config, RunStatus, run_detach};

#[derive(Parser)]
#[command(name = "stylestrip")]
#[command(about = "Post-build tools for trimming generated stylesheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Remove rules shared with the main stylesheet from per-page stylesheets
    Detach(Config),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    match cli.command {
        Commands::Detach(cfg) => {
            let report = run_detach(cfg)?;
            debug!("Processed {} stylesheets", report.files.len());

            stylestrip_detach::print_report(&mut stdout, &report)?;
            if report.status == RunStatus::Completed {
                writeln!(
                    stdout,
                    "\n{} Finished in {}ms on {} files.",
                    "●".bright_blue(),
                    report.elapsed.as_millis().to_string().cyan(),
                    report.files.len().to_string().cyan()
                )?;
            }
            stdout.flush()?;

            // Non-zero exit to fail the build
            if report.has_failures() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
