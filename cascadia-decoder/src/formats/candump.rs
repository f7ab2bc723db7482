//! SocketCAN candump log parser
//!
//! Reads the text format written by `candump -l`:
//!
//! ```text
//! (1436509052.249713) can0 0A7#F401000000000000
//! ```
//!
//! Lines without the timestamp/interface prefix (`0A7#F401...`) are accepted
//! too. Blank lines and `#` comments are skipped.
//!
//! ## Known Limitations
//! - Remote frames (`ID#R`) carry no payload and are rejected
//! - CAN-FD frames (`ID##<flags><data>`) are rejected; the inverter only uses classic CAN

use super::LoggedFrame;
use crate::types::{DecoderError, RawFrame, Result, Timestamp, MAX_PAYLOAD};
use chrono::DateTime;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// Largest 11-bit identifier
const MAX_STANDARD_ID: u32 = 0x7FF;
/// Largest 29-bit identifier
const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

/// candump log parser
pub struct CandumpParser;

impl CandumpParser {
    /// Open a candump log file and return an iterator over its frames
    pub fn parse(path: &Path) -> Result<CandumpFrameIterator<BufReader<File>>> {
        log::info!("Parsing candump log: {:?}", path);

        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }

    /// Read frames from any buffered reader (stdin, in-memory buffers)
    pub fn from_reader<R: BufRead>(reader: R) -> CandumpFrameIterator<R> {
        CandumpFrameIterator {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

/// Iterator over frames from a candump log
pub struct CandumpFrameIterator<R: BufRead> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> CandumpFrameIterator<R> {
    /// Drop capture metadata, leaving the frames the decoder consumes
    pub fn raw_frames(self) -> impl Iterator<Item = Result<RawFrame>> {
        self.map(|logged| logged.map(|l| l.frame))
    }
}

impl<R: BufRead> Iterator for CandumpFrameIterator<R> {
    type Item = Result<LoggedFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(DecoderError::IoError(e))),
            };
            self.line_no += 1;

            match parse_log_line(&line) {
                Ok(Some(logged)) => return Some(Ok(logged)),
                Ok(None) => continue,
                Err(reason) => {
                    return Some(Err(DecoderError::FrameParse {
                        line: self.line_no,
                        reason,
                    }))
                }
            }
        }
    }
}

/// Parse one candump log line; `Ok(None)` for blank lines and comments
pub fn parse_log_line(line: &str) -> std::result::Result<Option<LoggedFrame>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (timestamp, rest) = if let Some(stripped) = line.strip_prefix('(') {
        let (ts, rest) = stripped
            .split_once(')')
            .ok_or_else(|| "unterminated timestamp".to_string())?;
        (Some(parse_timestamp(ts)?), rest)
    } else {
        (None, line)
    };

    let mut tokens = rest.split_whitespace();
    let first = tokens
        .next()
        .ok_or_else(|| "missing frame".to_string())?;

    // Trailing direction flags (T/R) written by newer candump versions are ignored
    let (interface, spec) = if first.contains('#') {
        (None, first)
    } else {
        let spec = tokens
            .next()
            .ok_or_else(|| format!("missing frame after interface '{}'", first))?;
        (Some(first.to_string()), spec)
    };

    Ok(Some(LoggedFrame {
        timestamp,
        interface,
        frame: parse_frame_spec(spec)?,
    }))
}

/// Parse `cansend` notation: `<ID>#<HEXDATA>`
///
/// Three hex digits denote an 11-bit ID, up to eight a 29-bit one. Data bytes
/// may be separated by dots (`0A7#F4.01`).
pub fn parse_frame_spec(spec: &str) -> std::result::Result<RawFrame, String> {
    let spec = spec.trim();
    let (id_str, data_str) = spec
        .split_once('#')
        .ok_or_else(|| format!("'{}' has no '#' separator", spec))?;

    if data_str.starts_with('#') {
        return Err("CAN-FD frames are not supported".to_string());
    }
    if data_str.starts_with(['R', 'r']) {
        return Err("remote frames carry no payload".to_string());
    }

    if id_str.is_empty() || id_str.len() > 8 || !id_str.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("invalid CAN ID '{}'", id_str));
    }
    let id = u32::from_str_radix(id_str, 16).map_err(|_| format!("invalid CAN ID '{}'", id_str))?;
    let max_id = if id_str.len() <= 3 { MAX_STANDARD_ID } else { MAX_EXTENDED_ID };
    if id > max_id {
        return Err(format!("CAN ID 0x{:X} exceeds 0x{:X}", id, max_id));
    }

    let hex: String = data_str.chars().filter(|c| *c != '.').collect();
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("invalid data bytes '{}'", data_str));
    }
    if hex.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in '{}'", data_str));
    }
    if hex.len() / 2 > MAX_PAYLOAD {
        return Err(format!("{} data bytes, at most {} allowed", hex.len() / 2, MAX_PAYLOAD));
    }

    let data = (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
        .collect::<std::result::Result<Vec<u8>, _>>()
        .map_err(|_| format!("invalid data bytes '{}'", data_str))?;

    RawFrame::new(id, &data).map_err(|e| e.to_string())
}

/// `seconds.fraction` since the Unix epoch
fn parse_timestamp(ts: &str) -> std::result::Result<Timestamp, String> {
    let (secs_str, frac_str) = ts.split_once('.').unwrap_or((ts, ""));

    let secs: i64 = secs_str
        .parse()
        .map_err(|_| format!("invalid timestamp '{}'", ts))?;

    let nanos = if frac_str.is_empty() {
        0
    } else {
        if frac_str.len() > 9 || !frac_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("invalid timestamp '{}'", ts));
        }
        // Right-pad to nanoseconds: "249713" -> 249713000
        let digits: u32 = frac_str
            .parse()
            .map_err(|_| format!("invalid timestamp '{}'", ts))?;
        digits * 10u32.pow(9 - frac_str.len() as u32)
    };

    DateTime::from_timestamp(secs, nanos).ok_or_else(|| format!("timestamp '{}' out of range", ts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_log_line() {
        let logged = parse_log_line("(1436509052.249713) can0 0A7#F401000000000000")
            .unwrap()
            .unwrap();

        assert_eq!(logged.interface.as_deref(), Some("can0"));
        assert_eq!(logged.frame.id, 0x0A7);
        assert_eq!(logged.frame.dlc(), 8);
        assert_eq!(logged.frame.data()[..2], [0xF4, 0x01]);

        let ts = logged.timestamp.unwrap();
        assert_eq!(ts.timestamp(), 1436509052);
        assert_eq!(ts.timestamp_subsec_micros(), 249713);
    }

    #[test]
    fn test_parse_bare_spec_line() {
        let logged = parse_log_line("0AB#0000000000000100").unwrap().unwrap();
        assert!(logged.timestamp.is_none());
        assert!(logged.interface.is_none());
        assert_eq!(logged.frame.id, 0x0AB);
    }

    #[test]
    fn test_skip_blank_and_comment_lines() {
        assert!(parse_log_line("").unwrap().is_none());
        assert!(parse_log_line("   ").unwrap().is_none());
        assert!(parse_log_line("# recorded on the bench").unwrap().is_none());
    }

    #[test]
    fn test_direction_flag_is_ignored() {
        let logged = parse_log_line("(1.5) vcan0 0A0#00 R").unwrap().unwrap();
        assert_eq!(logged.frame.data(), &[0x00]);
        assert_eq!(logged.timestamp.unwrap().timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_frame_spec_variants() {
        let frame = parse_frame_spec("0A7#F4.01").unwrap();
        assert_eq!(frame.data(), &[0xF4, 0x01]);

        let empty = parse_frame_spec("0A0#").unwrap();
        assert_eq!(empty.dlc(), 0);

        let extended = parse_frame_spec("18FF00A0#01").unwrap();
        assert_eq!(extended.id, 0x18FF00A0);
    }

    #[test]
    fn test_frame_spec_errors() {
        assert!(parse_frame_spec("0A7F401").is_err()); // No separator
        assert!(parse_frame_spec("0A7#F40").is_err()); // Odd digits
        assert!(parse_frame_spec("0A7#000000000000000000").is_err()); // 9 bytes
        assert!(parse_frame_spec("0A7#R").is_err());
        assert!(parse_frame_spec("0A7##1F401").is_err());
        assert!(parse_frame_spec("FFF#00").is_err()); // Not an 11-bit ID
        assert!(parse_frame_spec("XYZ#00").is_err());
        assert!(parse_frame_spec("0A7#GG").is_err());
    }

    #[test]
    fn test_iterator_reports_line_numbers() {
        let log = "\
(0.000000) can0 0A0#FA00040100000000
# comment

(0.010000) can0 0A7#F4A
(0.020000) can0 0AB#0000000000000100
";
        let results: Vec<_> = CandumpParser::from_reader(Cursor::new(log)).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(DecoderError::FrameParse { line: 4, .. })));
        assert_eq!(results[2].as_ref().unwrap().frame.id, 0x0AB);
    }

    #[test]
    fn test_parse_missing_file() {
        let result = CandumpParser::parse(Path::new("nonexistent.log"));
        assert!(matches!(result, Err(DecoderError::IoError(_))));
    }
}
