use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::pipeline::Coordinator;
use crate::processors::YearOutcome;
use crate::settings::Settings;
use crate::utils::ProgressReporter;
use std::io::{self, BufRead, Write};

pub async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let coordinator = Coordinator::new(settings);

    match cli.command {
        Commands::Acquire => acquire(&coordinator).await,
        Commands::Consolidate { years, assume_yes } => {
            consolidate(&coordinator, years, assume_yes)
        }
    }
}

async fn acquire(coordinator: &Coordinator) -> Result<()> {
    println!(
        "Acquiring archives from {}",
        coordinator.settings().listing_url
    );

    let progress = ProgressReporter::spinner("Downloading and extracting archives...");
    let report = coordinator.run_acquisition().await?;
    progress.finish_with_message("Acquisition complete");

    println!(
        "Downloads: {} new, {} already present, {} failed",
        report.fetched.downloaded, report.fetched.skipped, report.fetched.failed
    );
    println!(
        "Station archives: {} extracted, {} already extracted, {} corrupt",
        report.stations.extracted, report.stations.skipped, report.stations.failed
    );
    println!(
        "Fire-record archives: {} extracted, {} already extracted, {} corrupt",
        report.fires.extracted, report.fires.skipped, report.fires.failed
    );

    Ok(())
}

fn consolidate(
    coordinator: &Coordinator,
    years: Option<Vec<u16>>,
    assume_yes: bool,
) -> Result<()> {
    // An explicit --years list is already a decision; the per-year prompt
    // only wraps the default "everything pending" selection.
    let (selection, interactive) = match years {
        Some(explicit) => (explicit, false),
        None => (coordinator.pending_years(), !assume_yes),
    };

    if selection.is_empty() {
        println!("Nothing to consolidate: all configured years have output");
        return Ok(());
    }

    let progress = if interactive {
        ProgressReporter::hidden()
    } else {
        ProgressReporter::bar(selection.len() as u64, "Consolidating years")
    };

    for year in selection {
        if interactive && !confirm_year(year)? {
            println!("{year}: skipped for this run");
            continue;
        }

        match coordinator.consolidate_year(year)? {
            YearOutcome::AlreadyDone { path } => {
                progress.println(&format!("{year}: already done ({})", path.display()));
            }
            YearOutcome::Written { path, files, rows } => {
                progress.println(&format!(
                    "{year}: wrote {rows} rows from {files} station files to {}",
                    path.display()
                ));
            }
            YearOutcome::Empty => {
                progress.println(&format!("{year}: no data, nothing written"));
            }
        }
        progress.inc();
    }
    progress.finish_with_message("Consolidation complete");

    Ok(())
}

/// Blocking yes/no prompt. Anything but an affirmative answer skips the
/// year for this run only; it is asked again next time.
fn confirm_year(year: u16) -> Result<bool> {
    print!("Consolidate year {year}? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
