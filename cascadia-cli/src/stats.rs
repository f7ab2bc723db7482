//! Decoding statistics
//!
//! Counts what a run has seen. Lives in the application layer: the decoder
//! itself keeps nothing between frames.

use cascadia_decoder::{DecodedMessage, DecodedRecord, MessageKind};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeStats {
    /// Lines parsed into frames
    pub frames_read: usize,
    /// Frames outside the inverter ID range
    pub frames_skipped: usize,
    /// Lines that could not be parsed
    pub parse_errors: usize,
    pub records: usize,
    pub unhandled: usize,
    pub length_warnings: usize,
    pub fault_frames: usize,
    /// Fault frames with at least one fault bit set
    pub faulted_frames: usize,
    pub messages_by_kind: BTreeMap<MessageKind, usize>,
    pub faults_seen: BTreeSet<&'static str>,
}

impl DecodeStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one decoded record
    pub fn record(&mut self, record: &DecodedRecord) {
        self.records += 1;
        if record.length_warning.is_some() {
            self.length_warnings += 1;
        }

        match &record.message {
            DecodedMessage::Signals { kind, .. } => {
                *self.messages_by_kind.entry(*kind).or_insert(0) += 1;
            }
            DecodedMessage::Fault(report) => {
                self.fault_frames += 1;
                if report.has_faults() {
                    self.faulted_frames += 1;
                }
                self.faults_seen
                    .extend(report.post_faults.iter().chain(&report.run_faults));
            }
            DecodedMessage::Unhandled { .. } => self.unhandled += 1,
        }
    }

    /// Fold another run's counters into this one
    pub fn merge(&mut self, other: &DecodeStats) {
        self.frames_read += other.frames_read;
        self.frames_skipped += other.frames_skipped;
        self.parse_errors += other.parse_errors;
        self.records += other.records;
        self.unhandled += other.unhandled;
        self.length_warnings += other.length_warnings;
        self.fault_frames += other.fault_frames;
        self.faulted_frames += other.faulted_frames;
        for (kind, count) in &other.messages_by_kind {
            *self.messages_by_kind.entry(*kind).or_insert(0) += count;
        }
        self.faults_seen.extend(&other.faults_seen);
    }

    pub fn print_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "=== DECODING SUMMARY ===")?;
        writeln!(out, "Frames read: {}", self.frames_read)?;
        writeln!(out, "Frames skipped (foreign IDs): {}", self.frames_skipped)?;
        writeln!(out, "Parse errors: {}", self.parse_errors)?;
        writeln!(out, "Inverter records: {}", self.records)?;
        writeln!(out, "Unhandled message types: {}", self.unhandled)?;
        writeln!(out, "Short frames: {}", self.length_warnings)?;
        writeln!(out, "Fault frames: {} ({} with faults set)", self.fault_frames, self.faulted_frames)?;

        if !self.messages_by_kind.is_empty() {
            writeln!(out, "\nMessages by type:")?;
            for (kind, count) in &self.messages_by_kind {
                writeln!(out, "  {}: {}", kind, count)?;
            }
        }

        if !self.faults_seen.is_empty() {
            writeln!(out, "\nFaults seen:")?;
            for name in &self.faults_seen {
                writeln!(out, "  - {}", name)?;
            }
        }
        Ok(())
    }
}
