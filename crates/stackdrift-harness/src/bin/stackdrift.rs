//! CLI entrypoint for the stackdrift stress harness.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use stackdrift_abi::{ChecksumProbe, DEFAULT_DWELL_MICROS, DwellProbe};
use stackdrift_core::probe::FixedProbe;
use stackdrift_core::{
    CallVariant, DEFAULT_FILL_VALUE, DEFAULT_PAYLOAD, DEFAULT_WORKERS, FillerTier, HarnessConfig,
    Probe, run_harness,
};
use stackdrift_harness::{LogEmitter, LogEntry, RunReport};

/// Concurrency stress harness for stack-relocation hazards at foreign-call
/// boundaries.
#[derive(Debug, Parser)]
#[command(name = "stackdrift")]
#[command(about = "Detects stack relocation invalidating raw addresses escaped across a foreign call")]
struct Cli {
    /// Number of concurrent workers released at once.
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,
    /// Worker payload length in bytes (cycles the default pattern).
    #[arg(long, default_value_t = DEFAULT_PAYLOAD.len())]
    payload_len: usize,
    /// Constant the stack filler array is saturated with.
    #[arg(long, default_value_t = DEFAULT_FILL_VALUE)]
    fill_value: i64,
    /// Filler sizing tier: small | default | large.
    #[arg(long, default_value = "default")]
    filler: String,
    /// Boundary entry point: raw | tracked.
    #[arg(long, default_value = "raw")]
    variant: String,
    /// Boundary implementation: dwell | checksum | fixed:<value>.
    #[arg(long, default_value = "dwell")]
    probe: String,
    /// In-call dwell in microseconds (dwell probe only).
    #[arg(long, default_value_t = DEFAULT_DWELL_MICROS)]
    dwell_micros: u32,
    /// Structured JSONL log output path.
    #[arg(long)]
    log: Option<PathBuf>,
    /// JSON run-report output path.
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = HarnessConfig {
        workers: cli.workers,
        payload: HarnessConfig::payload_of_len(cli.payload_len),
        fill_value: cli.fill_value,
        filler: FillerTier::from_str_loose(&cli.filler),
        variant: CallVariant::from_str_loose(&cli.variant),
    };
    let probe = select_probe(&cli.probe, &config, cli.dwell_micros)?;

    let report = run_harness(&config, probe)?;
    let run = RunReport::new(&config, &cli.probe.to_ascii_lowercase(), &report);

    println!("{}", run.render_plain());

    if let Some(path) = cli.json {
        std::fs::write(&path, run.to_json()?)?;
        eprintln!("Wrote run report to {}", path.display());
    }
    if let Some(path) = cli.log {
        let mut emitter = LogEmitter::to_file(&path)?;
        for outcome in &report.outcomes {
            emitter.emit(&LogEntry::worker_result(outcome))?;
        }
        emitter.emit(&LogEntry::run_complete(report.tally, report.relocations))?;
    }

    // The exit signal carries the failure count to the caller.
    std::process::exit(report.exit_code());
}

fn select_probe(
    choice: &str,
    config: &HarnessConfig,
    dwell_micros: u32,
) -> Result<Arc<dyn Probe>, Box<dyn Error>> {
    let lower = choice.to_ascii_lowercase();
    if let Some(raw_value) = lower.strip_prefix("fixed:") {
        let value: i64 = raw_value
            .parse()
            .map_err(|_| format!("invalid fixed probe value '{raw_value}'"))?;
        return Ok(Arc::new(FixedProbe::new(value)));
    }
    match lower.as_str() {
        "dwell" => Ok(Arc::new(DwellProbe::new(
            config.payload.clone(),
            dwell_micros,
        ))),
        "checksum" => Ok(Arc::new(ChecksumProbe::for_payload(&config.payload))),
        other => {
            Err(format!("unsupported probe '{other}', expected dwell|checksum|fixed:<value>").into())
        }
    }
}
