//! Report generation
//!
//! Renders decoded records either as the classic serial console text layout
//! or as JSON lines. Sinks consume typed records; they never decode anything.

use crate::config::OutputFormat;
use cascadia_decoder::{DecodedMessage, DecodedRecord, DecodedSignal, FaultReport, RawFrame, Timestamp};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::{self, Write};

/// One decoded frame together with its capture metadata
#[derive(Debug, Clone)]
pub struct DecodedEntry {
    pub timestamp: Option<Timestamp>,
    pub interface: Option<String>,
    pub frame: RawFrame,
    pub record: DecodedRecord,
}

/// Destination for decoded entries
pub trait ReportSink {
    fn write_entry(&mut self, entry: &DecodedEntry) -> io::Result<()>;

    /// Flush buffered output
    fn finish(&mut self) -> io::Result<()>;
}

/// Build the sink for an output format
pub fn create_sink<'a>(format: OutputFormat, out: Box<dyn Write + 'a>) -> Box<dyn ReportSink + 'a> {
    match format {
        OutputFormat::Txt => Box::new(TextReport::new(out)),
        OutputFormat::Json => Box::new(JsonReport::new(out)),
    }
}

/// Plain text report, one block per frame separated by blank lines
pub struct TextReport<W: Write> {
    out: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn write_entry(&mut self, entry: &DecodedEntry) -> io::Result<()> {
        writeln!(self.out, "{}", render_text(entry))
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Render one entry as text
pub fn render_text(entry: &DecodedEntry) -> String {
    let record = &entry.record;
    let mut text = String::new();

    let _ = write!(text, "ID: 0x{:X} Len: {}", record.can_id, record.length);
    if let Some(ts) = &entry.timestamp {
        let _ = write!(text, " @ {}", ts.to_rfc3339());
    }
    if let Some(iface) = &entry.interface {
        let _ = write!(text, " [{}]", iface);
    }
    text.push('\n');

    if let Some(warning) = &record.length_warning {
        let _ = writeln!(text, "Warning: {}", warning);
    }

    match &record.message {
        DecodedMessage::Signals { kind, signals } => {
            let _ = writeln!(text, "{}:", kind);
            for signal in signals {
                let _ = writeln!(text, "{}", render_signal(signal));
            }
        }
        DecodedMessage::Fault(report) => render_faults(&mut text, report),
        DecodedMessage::Unhandled { msg_type } => {
            let _ = writeln!(text, "Unhandled message type: 0x{:X}", msg_type);
        }
    }

    text
}

fn render_signal(signal: &DecodedSignal) -> String {
    if let Some(description) = signal.value_description {
        return format!("{}: {}", signal.name, description);
    }
    match signal.unit {
        Some(unit) => format!("{}: {} {}", signal.name, signal.value, unit),
        None => format!("{}: {}", signal.name, signal.value),
    }
}

fn render_faults(text: &mut String, report: &FaultReport) {
    let words = &report.words;
    let _ = writeln!(text, "Fault Codes:");
    let _ = writeln!(text, "POST: Lo=0x{:X} Hi=0x{:X}", words.post_lo, words.post_hi);
    let _ = writeln!(text, "RUN: Lo=0x{:X} Hi=0x{:X}", words.run_lo, words.run_hi);

    let _ = writeln!(text, "POST Faults:");
    for name in &report.post_faults {
        let _ = writeln!(text, "  - {}", name);
    }
    let _ = writeln!(text, "Run Faults:");
    for name in &report.run_faults {
        let _ = writeln!(text, "  - {}", name);
    }
}

/// JSON lines report
pub struct JsonReport<W: Write> {
    out: W,
}

impl<W: Write> JsonReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interface: Option<&'a str>,
    data: String,
    #[serde(flatten)]
    record: &'a DecodedRecord,
}

impl<W: Write> ReportSink for JsonReport<W> {
    fn write_entry(&mut self, entry: &DecodedEntry) -> io::Result<()> {
        let line = JsonLine {
            timestamp: entry.timestamp.map(|ts| ts.to_rfc3339()),
            interface: entry.interface.as_deref(),
            data: hex_string(entry.frame.data()),
            record: &entry.record,
        };
        serde_json::to_writer(&mut self.out, &line)?;
        writeln!(self.out)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

fn hex_string(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02X}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascadia_decoder::Decoder;

    fn entry(id: u32, data: &[u8]) -> DecodedEntry {
        let frame = RawFrame::new(id, data).unwrap();
        DecodedEntry {
            timestamp: None,
            interface: None,
            frame,
            record: Decoder::new().decode(&frame).unwrap(),
        }
    }

    #[test]
    fn test_render_voltages() {
        let text = render_text(&entry(0x0A7, &[0xF4, 0x01, 0, 0, 0, 0, 0, 0]));
        assert_eq!(
            text,
            "ID: 0xA7 Len: 8\nVoltages:\nDC Bus: 50.00 V\nOutput: 0.00 V\nVAB/Vd: 0.00 V\nVBC/Vq: 0.00 V\n"
        );
    }

    #[test]
    fn test_render_internal_states() {
        let text = render_text(&entry(0x0AA, &[0x06, 0x0C, 0x03, 0x1F, 0, 0, 0, 0]));
        assert!(text.contains("Internal States:\n"));
        assert!(text.contains("VSM State: Motor Running State\n"));
        assert!(text.contains("PWM Freq: 12 kHz\n"));
        assert!(text.contains("Inverter State: Closed Loop State\n"));
        assert!(text.contains("Relay State: 0x1F\n"));
    }

    #[test]
    fn test_render_timer() {
        let text = render_text(&entry(0x0AC, &[0, 0, 0, 0, 0xE8, 0x03, 0, 0]));
        assert!(text.contains("Power Timer: 3.00 sec\n"));
    }

    #[test]
    fn test_render_faults() {
        let text = render_text(&entry(0x0AB, &[0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00]));
        assert_eq!(
            text,
            "ID: 0xAB Len: 8\n\
             Fault Codes:\n\
             POST: Lo=0x2 Hi=0x0\n\
             RUN: Lo=0x0 Hi=0x1\n\
             POST Faults:\n\
             \x20 - HW Over-current Fault\n\
             Run Faults:\n\
             \x20 - 2.5V Sense Voltage Low\n"
        );
    }

    #[test]
    fn test_render_unhandled() {
        let text = render_text(&entry(0x0C0, &[0; 8]));
        assert!(text.ends_with("Unhandled message type: 0x20\n"));
    }

    #[test]
    fn test_render_short_frame_warning() {
        let text = render_text(&entry(0x0A0, &[0xFA, 0x00]));
        assert!(text.contains("Warning: frame carries 2 of 8 bytes"));
        assert!(text.contains("Module A: 25.00 C\n"));
    }

    #[test]
    fn test_json_lines() {
        let mut buf = Vec::new();
        {
            let mut sink = JsonReport::new(&mut buf);
            sink.write_entry(&entry(0x0A7, &[0xF4, 0x01])).unwrap();
            sink.write_entry(&entry(0x0C0, &[])).unwrap();
            sink.finish().unwrap();
        }

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["data"], "F401");
        assert_eq!(lines[0]["message"]["kind"], "voltages");
        assert_eq!(lines[0]["message"]["signals"][0]["value"], 50.0);
        assert_eq!(lines[0]["length_warning"]["available"], 2);
        assert_eq!(lines[1]["message"]["type"], "unhandled");
        assert_eq!(lines[1]["message"]["msg_type"], 0x20);
    }

    #[test]
    fn test_text_sink_separates_blocks() {
        let mut buf = Vec::new();
        {
            let mut sink = create_sink(OutputFormat::Txt, Box::new(&mut buf));
            sink.write_entry(&entry(0x0C0, &[0; 8])).unwrap();
            sink.write_entry(&entry(0x0C1, &[0; 8])).unwrap();
            sink.finish().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("0x20\n\nID: 0xC1"));
    }
}
