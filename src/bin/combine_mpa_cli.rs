use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use combine_mpa_rs::{build_merged_table, write_merged_table, MergeSummary, MpaResult};

/// Combine multiple mpa-format reports (as written by kreport2mpa) into one table.
#[derive(Parser, Debug)]
#[command(name = "combine-mpa-rs", version, about)]
struct Cli {
    /// Input mpa reports, merged in the order given (.gz accepted)
    #[arg(short, long = "input", required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Combined report to write ("-" for stdout)
    #[arg(short, long)]
    output: PathBuf,

    /// Hide progress output
    #[arg(short, long)]
    quiet: bool,
}

fn spinner(quiet: bool, color: &str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&[
                "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
            ])
            .template(&format!("{{spinner:.{color}}} {{msg}}"))
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn write_bar(quiet: bool, total: u64) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green/white} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message("classifications printed");
    bar
}

fn run(cli: &Cli) -> MpaResult<MergeSummary> {
    // 1. Ingest every report
    let pb = spinner(cli.quiet, "blue");
    pb.set_message(format!("Parsing {} file(s)...", cli.input.len()));
    let table = build_merged_table(&cli.input)?;
    pb.finish_with_message(format!(
        "Parsed {} file(s), {} classifications to write.",
        cli.input.len(),
        table.num_classifications()
    ));

    // 2. Write the merged table
    let pb = write_bar(cli.quiet, table.num_classifications() as u64);
    let written = write_merged_table(&table, &cli.output, |n| pb.set_position(n as u64))?;
    pb.finish();

    Ok(MergeSummary {
        files_parsed: cli.input.len(),
        classifications_written: written,
    })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(summary) => log::info!(
            "Merged {} file(s) into {} ({} classifications)",
            summary.files_parsed,
            cli.output.display(),
            summary.classifications_written
        ),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
