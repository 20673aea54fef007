use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use submission_sorter_lib::services::pipeline;
use submission_sorter_lib::{load_config, LogFileReport, Report};

/// Sort an LMS bulk-export archive into per-student folders
#[derive(Parser)]
#[command(name = "submission-sorter", version)]
struct Cli {
    /// Master zip archive. Prompted for when omitted
    archive: Option<String>,

    /// Path to a JSON configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Where the StudentSubmissions folder is created (default: current directory)
    #[arg(short = 'o', long)]
    output_root: Option<PathBuf>,

    /// Where the run log is written (default: current directory)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    let raw_path = match cli.archive {
        Some(path) => path,
        None => read_input().context("Failed to read the archive path")?,
    };
    let master = pipeline::sanitize_input_path(&raw_path);

    let cwd = std::env::current_dir().context("Failed to resolve the current directory")?;
    let run_timestamp = chrono::Local::now()
        .format(&config.run_timestamp_format)
        .to_string();

    let log_dir = cli.log_dir.unwrap_or_else(|| cwd.clone());
    let log_path = LogFileReport::default_path(&log_dir, &run_timestamp);
    let mut report = LogFileReport::create(&log_path)
        .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

    let output_root = cli.output_root.unwrap_or(cwd);

    match pipeline::run(&master, &config, &output_root, &run_timestamp, &mut report) {
        Ok(summary) => {
            log::info!(
                "Sorted {} students into '{}'",
                summary.organize.students.len(),
                summary.output_dir.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            log::debug!("Run aborted: {e}");
            let location = report.location().unwrap_or(log_path.as_path());
            println!(
                "An error has occurred. Please check log file: {}",
                location.display()
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Prompt for the master archive path on stdin.
fn read_input() -> io::Result<String> {
    print!("Enter the path of the zip file: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}
