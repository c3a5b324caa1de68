use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use xeno_harvest::config::{ConfigLoader, ConfigOverrides};
use xeno_harvest::error::HarvestError;
use xeno_harvest::harvest::{HarvestReport, Harvester};
use xeno_harvest::output::{ConsoleSink, JsonOutput, OutputMode};
use xeno_harvest::transcode::WavTranscoder;
use xeno_harvest::xeno::XenoCantoHttpClient;

#[derive(Parser)]
#[command(name = "xeno-harvest")]
#[command(about = "Batch-download xeno-canto recordings by species, transcode to WAV, emit metadata CSV")]
#[command(version, author)]
struct Cli {
    /// Path to the JSON config (default: xeno-harvest.json in the current directory)
    #[arg(long)]
    config: Option<String>,

    /// Harvest a single species instead of the configured list
    #[arg(long)]
    species: Option<String>,

    /// Country filter applied to every query
    #[arg(long)]
    region: Option<String>,

    /// Maximum committed recordings per species
    #[arg(long)]
    quota: Option<u32>,

    /// Output root directory
    #[arg(long)]
    out: Option<String>,

    /// Timeout for each audio download, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the final report as JSON and suppress progress output
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(harvest) = report.downcast_ref::<HarvestError>() {
            return ExitCode::from(map_exit_code(harvest));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &HarvestError) -> u8 {
    match error {
        HarvestError::MissingConfig
        | HarvestError::ConfigRead(_)
        | HarvestError::ConfigParse(_)
        | HarvestError::MissingRegion
        | HarvestError::InvalidSpeciesName(_)
        | HarvestError::InvalidRegion(_)
        | HarvestError::InvalidQualityGrade(_) => 2,
        HarvestError::XenoHttp(_)
        | HarvestError::XenoStatus { .. }
        | HarvestError::ApiShape(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Console
    };

    let overrides = ConfigOverrides {
        species: cli.species,
        region: cli.region,
        quota: cli.quota,
        output: cli.out,
        download_timeout_secs: cli.timeout_secs,
    };
    let config = ConfigLoader::resolve(cli.config.as_deref(), overrides).into_diagnostic()?;

    let client = XenoCantoHttpClient::new(config.download_timeout).into_diagnostic()?;
    let harvester = Harvester::new(config, client, WavTranscoder::new());

    match output_mode {
        OutputMode::Console => {
            let report = harvester.run(&ConsoleSink).into_diagnostic()?;
            print_summary(&report);
            Ok(())
        }
        OutputMode::Json => {
            let report = harvester.run(&JsonOutput).into_diagnostic()?;
            JsonOutput::print_report(&report).into_diagnostic()?;
            Ok(())
        }
    }
}

fn print_summary(report: &HarvestReport) {
    println!();
    println!(
        "done: {} recordings committed across {} species",
        report.total_committed,
        report.species.len()
    );
    for species in &report.species {
        let skipped = species.rejected + species.fetch_failed + species.transcode_failed;
        match &species.aborted {
            Some(reason) => println!(
                "  {}: {} committed, {} skipped (aborted: {reason})",
                species.species, species.committed, skipped
            ),
            None => println!(
                "  {}: {} committed, {} skipped, {} pages",
                species.species, species.committed, skipped, species.pages_scanned
            ),
        }
    }
    println!("metadata: {}", report.metadata_path);
}
