//! Cascadia Inverter CAN Decoder CLI
//!
//! This is the command-line interface for the inverter telemetry decoder.
//! It uses the cascadia-decoder library and adds:
//! - candump log replay (several files decoded in parallel)
//! - Single-frame decoding from the command line
//! - TOML configuration
//! - Text and JSON reports
//! - Run statistics

use anyhow::{Context, Result};
use cascadia_decoder::{CandumpParser, Decoder, RawFrame};
use clap::Parser;
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

mod config;
mod report;
mod stats;

use config::{AppConfig, OutputFormat};
use report::DecodedEntry;
use stats::DecodeStats;

/// Cascadia inverter decoder - Decode motor controller CAN telemetry
#[derive(Parser, Debug)]
#[command(name = "cascadia-cli")]
#[command(about = "Decode Cascadia inverter CAN telemetry (candump logs or single frames)", long_about = None)]
#[command(version)]
struct Args {
    /// Path to candump log file(s) (can be repeated)
    #[arg(short, long, value_name = "FILE")]
    log: Vec<PathBuf>,

    /// Frame in cansend notation, e.g. 0A7#F401000000000000 (can be repeated)
    #[arg(short, long, value_name = "ID#DATA")]
    frame: Vec<String>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file for the report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// CAN ID of the first broadcast message, hex (default: 0A0)
    #[arg(long, value_name = "ID", value_parser = parse_can_id)]
    base_id: Option<u32>,

    /// CAN ID of the fault message, hex (default: 0AB)
    #[arg(long, value_name = "ID", value_parser = parse_can_id)]
    fault_id: Option<u32>,

    /// Also decode digital input and internal voltage frames
    #[arg(long)]
    extended: bool,

    /// Print decoding statistics to stderr when done
    #[arg(long)]
    summary: bool,

    /// Maximum number of inverter frames to decode per log file
    #[arg(long, value_name = "COUNT")]
    max_frames: Option<usize>,

    /// Verbosity level (can be repeated: -v, -vv)
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

    log::info!("Cascadia CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", cascadia_decoder::VERSION);

    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    apply_args(&mut config, &args);
    config::validate(&config)?;

    if config.input.files.is_empty() && config.input.frames.is_empty() {
        // No input - show help
        println!("Cascadia CAN Decoder - No input specified");
        println!("\nQuick Start:");
        println!("  cascadia-cli --log capture.log");
        println!("  cascadia-cli --frame 0A7#F401000000000000");
        println!("\nWith a configuration file:");
        println!("  cascadia-cli --config config.toml");
        println!("\nUse --help for more options");
        return Ok(());
    }

    run(&config)
}

/// Command-line flags override the configuration file
fn apply_args(config: &mut AppConfig, args: &Args) {
    config.input.files.extend(args.log.iter().cloned());
    config.input.frames.extend(args.frame.iter().cloned());
    if args.max_frames.is_some() {
        config.input.max_frames = args.max_frames;
    }
    if let Some(base_id) = args.base_id {
        config.decoder.base_id = base_id;
    }
    if let Some(fault_id) = args.fault_id {
        config.decoder.fault_id = fault_id;
    }
    if args.extended {
        config.decoder.extended_messages = true;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if args.output.is_some() {
        config.output.output_file = args.output.clone();
    }
    if args.summary {
        config.output.summary = true;
    }
}

/// Decode every configured input and write the report
fn run(config: &AppConfig) -> Result<()> {
    let decoder = Decoder::with_config(config.decoder.clone());

    let out: Box<dyn Write> = match &config.output.output_file {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut sink = report::create_sink(config.output.format, out);
    let mut stats = DecodeStats::new();

    // Frames given directly bypass the range filter; a foreign ID is an error
    for spec in &config.input.frames {
        let frame: RawFrame = spec
            .parse()
            .with_context(|| format!("Invalid frame '{}'", spec))?;
        stats.frames_read += 1;

        let record = decoder
            .decode(&frame)
            .with_context(|| format!("Cannot decode frame '{}'", spec))?;
        stats.record(&record);
        sink.write_entry(&DecodedEntry {
            timestamp: None,
            interface: None,
            frame,
            record,
        })?;
    }

    // Log files are decoded in parallel, reported in the order given
    let outcomes: Vec<Result<FileOutcome>> = config
        .input
        .files
        .par_iter()
        .map(|path| decode_file(&decoder, path, config.input.max_frames))
        .collect();

    for outcome in outcomes {
        let outcome = outcome?;
        log::info!(
            "{:?}: {} inverter frames, {} parse errors",
            outcome.path,
            outcome.stats.records,
            outcome.stats.parse_errors
        );
        for entry in &outcome.entries {
            sink.write_entry(entry)?;
        }
        stats.merge(&outcome.stats);
    }

    sink.finish()?;

    if config.output.summary {
        stats.print_summary(&mut io::stderr().lock())?;
    }

    Ok(())
}

/// Everything decoded from one log file
struct FileOutcome {
    path: PathBuf,
    entries: Vec<DecodedEntry>,
    stats: DecodeStats,
}

fn decode_file(decoder: &Decoder, path: &Path, max_frames: Option<usize>) -> Result<FileOutcome> {
    let frames = CandumpParser::parse(path)
        .with_context(|| format!("Failed to open log file: {:?}", path))?;

    let mut entries = Vec::new();
    let mut stats = DecodeStats::new();

    for result in frames {
        if let Some(max) = max_frames {
            if stats.records >= max {
                log::info!("{:?}: limit of {} frames reached", path, max);
                break;
            }
        }

        let logged = match result {
            Ok(logged) => logged,
            Err(e) => {
                log::warn!("{:?}: {}", path, e);
                stats.parse_errors += 1;
                continue;
            }
        };
        stats.frames_read += 1;

        if !decoder.accepts(logged.frame.id) {
            log::trace!("Skipping CAN ID 0x{:X}", logged.frame.id);
            stats.frames_skipped += 1;
            continue;
        }

        let record = decoder.decode(&logged.frame)?;
        stats.record(&record);
        entries.push(DecodedEntry {
            timestamp: logged.timestamp,
            interface: logged.interface,
            frame: logged.frame,
            record,
        });
    }

    Ok(FileOutcome {
        path: path.to_path_buf(),
        entries,
        stats,
    })
}

/// Parse a hex CAN ID with or without a `0x` prefix
fn parse_can_id(s: &str) -> std::result::Result<u32, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).map_err(|_| format!("'{}' is not a hex CAN ID", s))
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

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
