//! Standalone inverter log decoder
//!
//! Replays a candump log through the decoder and prints one compact line per
//! inverter frame, followed by a summary of what was seen.
//!
//! Usage:
//!   decode_log <capture.log> [--extended] [--limit <count>] [--verbose]
//!
//! Example:
//!   decode_log bench.log --extended --limit 100

use cascadia_decoder::{
    CandumpParser, DecodedMessage, DecodedRecord, Decoder, DecoderConfig, MessageKind, Timestamp,
};
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::path::PathBuf;

fn timestamp_to_secs(ts: &Timestamp) -> f64 {
    ts.timestamp() as f64 + (ts.timestamp_subsec_nanos() as f64 / 1_000_000_000.0)
}

struct DecoderStats {
    total_frames: usize,
    decoded_messages: usize,
    fault_frames: usize,
    unhandled: usize,
    short_frames: usize,
    messages_by_kind: BTreeMap<MessageKind, usize>,
    faults_seen: BTreeSet<&'static str>,
}

impl DecoderStats {
    fn new() -> Self {
        Self {
            total_frames: 0,
            decoded_messages: 0,
            fault_frames: 0,
            unhandled: 0,
            short_frames: 0,
            messages_by_kind: BTreeMap::new(),
            faults_seen: BTreeSet::new(),
        }
    }

    fn record(&mut self, record: &DecodedRecord) {
        self.total_frames += 1;
        if record.length_warning.is_some() {
            self.short_frames += 1;
        }
        match &record.message {
            DecodedMessage::Signals { kind, .. } => {
                self.decoded_messages += 1;
                *self.messages_by_kind.entry(*kind).or_insert(0) += 1;
            }
            DecodedMessage::Fault(report) => {
                self.fault_frames += 1;
                self.faults_seen.extend(report.post_faults.iter().chain(&report.run_faults));
            }
            DecodedMessage::Unhandled { .. } => self.unhandled += 1,
        }
    }

    fn print_summary(&self) {
        println!("\n=== DECODING SUMMARY ===");
        println!("Inverter frames decoded: {}", self.total_frames);
        println!("Broadcast messages: {}", self.decoded_messages);
        println!("Fault frames: {}", self.fault_frames);
        println!("Unhandled message types: {}", self.unhandled);
        println!("Short frames: {}", self.short_frames);

        if !self.messages_by_kind.is_empty() {
            println!("\nMessages by type:");
            for (kind, count) in &self.messages_by_kind {
                println!("  {}: {} times", kind, count);
            }
        }

        if !self.faults_seen.is_empty() {
            println!("\nFaults raised at least once:");
            for name in &self.faults_seen {
                println!("  - {}", name);
            }
        }
    }
}

fn print_record(timestamp: Option<&Timestamp>, record: &DecodedRecord, verbose: bool) {
    let ts = timestamp.map(timestamp_to_secs).unwrap_or(0.0);

    match &record.message {
        DecodedMessage::Signals { kind, signals } => {
            println!("[{:.6}s] 0x{:03X} {}", ts, record.can_id, kind);
            if verbose {
                for signal in signals {
                    let unit_str = signal.unit.map(|u| format!(" {}", u)).unwrap_or_default();
                    let desc_str = signal
                        .value_description
                        .map(|d| format!(" \"{}\"", d))
                        .unwrap_or_default();
                    println!("    {}: {}{}{}", signal.name, signal.value, unit_str, desc_str);
                }
            }
        }
        DecodedMessage::Fault(report) => {
            println!(
                "[{:.6}s] 0x{:03X} FAULTS post={} run={}",
                ts,
                record.can_id,
                report.post_faults.len(),
                report.run_faults.len()
            );
            if verbose {
                for name in report.post_faults.iter().chain(&report.run_faults) {
                    println!("    └─ {}", name);
                }
            }
        }
        DecodedMessage::Unhandled { msg_type } => {
            if verbose {
                println!("[{:.6}s] 0x{:03X} UNHANDLED type 0x{:02X}", ts, record.can_id, msg_type);
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <capture.log> [--extended] [--limit <count>] [--verbose]", args[0]);
        eprintln!("\nExample:");
        eprintln!("  {} bench.log --extended --limit 100", args[0]);
        std::process::exit(1);
    }

    let log_file = PathBuf::from(&args[1]);
    let mut extended = false;
    let mut limit: Option<usize> = None;
    let mut verbose = false;

    // Parse arguments
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--extended" => {
                extended = true;
            }
            "--limit" => {
                i += 1;
                if i < args.len() {
                    limit = Some(args[i].parse()?);
                }
            }
            "--verbose" | "-v" => {
                verbose = true;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    println!("=== Inverter Log Decoder ===");
    println!("Log file: {:?}", log_file);
    println!("Extended messages: {}", extended);
    if let Some(n) = limit {
        println!("Limit: {} records", n);
    }
    println!();

    let decoder = Decoder::with_config(DecoderConfig::new().with_extended_messages(extended));
    let mut stats = DecoderStats::new();
    let mut printed = 0;

    for result in CandumpParser::parse(&log_file)? {
        let logged = match result {
            Ok(logged) => logged,
            Err(e) => {
                eprintln!("Error reading frame: {}", e);
                continue;
            }
        };
        if !decoder.accepts(logged.frame.id) {
            continue;
        }

        let record = decoder.decode(&logged.frame)?;
        stats.record(&record);

        if let Some(max) = limit {
            if printed >= max {
                println!("\n... (limit of {} records reached)", max);
                break;
            }
        }
        print_record(logged.timestamp.as_ref(), &record, verbose);
        printed += 1;
    }

    stats.print_summary();

    Ok(())
}
