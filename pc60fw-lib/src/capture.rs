//! Text captures of notification streams.
//!
//! One notification per line, hex bytes with optional whitespace:
//!
//! ```text
//! # PC-60F, continuous mode
//! 0.120: aa 55 06 02 40 45 c8 3a 30 ed
//! aa55050162
//! 4b003220
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. A leading
//! `<seconds>:` is kept as the notification timestamp.

use crate::error::DecoderError;
use bytes::Bytes;
use std::fmt;
use std::path::Path;

/// One captured notification
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRecord {
    /// Seconds since capture start, when the capture recorded it
    pub timestamp: Option<f64>,
    pub chunk: Bytes,
}

impl CaptureRecord {
    pub fn new(timestamp: Option<f64>, chunk: Bytes) -> Self {
        Self { timestamp, chunk }
    }
}

impl fmt::Display for CaptureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ts) = self.timestamp {
            write!(f, "{}: ", ts)?;
        }
        for (i, byte) in self.chunk.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Parse a single capture line. `line_no` is 1-based and only used in errors.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<CaptureRecord>, DecoderError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (timestamp, data) = match line.split_once(':') {
        Some((ts, rest)) => {
            let ts = ts.trim();
            let value = ts.parse::<f64>().map_err(|_| DecoderError::InvalidTimestamp {
                line: line_no,
                value: ts.to_string(),
            })?;
            (Some(value), rest)
        }
        None => (None, line),
    };

    let digits: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = hex::decode(&digits).map_err(|source| DecoderError::InvalidHex { line: line_no, source })?;
    Ok(Some(CaptureRecord::new(timestamp, Bytes::from(bytes))))
}

pub fn parse_capture(text: &str) -> Result<Vec<CaptureRecord>, DecoderError> {
    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(record) = parse_line(line, i + 1)? {
            records.push(record);
        }
    }
    Ok(records)
}

pub fn read_capture(path: impl AsRef<Path>) -> Result<Vec<CaptureRecord>, DecoderError> {
    let text = std::fs::read_to_string(path)?;
    parse_capture(&text)
}

pub fn write_capture(path: impl AsRef<Path>, records: &[CaptureRecord]) -> Result<(), DecoderError> {
    let mut text = String::new();
    for record in records {
        text.push_str(&record.to_string());
        text.push('\n');
    }
    std::fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_forms() {
        assert_eq!(parse_line("", 1).unwrap(), None);
        assert_eq!(parse_line("  # comment", 1).unwrap(), None);

        let plain = parse_line("aa55 0501", 1).unwrap().unwrap();
        assert_eq!(plain.timestamp, None);
        assert_eq!(plain.chunk.as_ref(), &[0xAA, 0x55, 0x05, 0x01]);

        let stamped = parse_line("1.5: AA 55", 1).unwrap().unwrap();
        assert_eq!(stamped.timestamp, Some(1.5));
        assert_eq!(stamped.chunk.as_ref(), &[0xAA, 0x55]);
    }

    #[test]
    fn test_parse_errors_carry_line_number() {
        let err = parse_capture("aa55\nzz\n").unwrap_err();
        assert!(matches!(err, DecoderError::InvalidHex { line: 2, .. }));

        let err = parse_capture("\n\nabc: aa").unwrap_err();
        assert!(matches!(err, DecoderError::InvalidTimestamp { line: 3, .. }));

        // odd digit count
        assert!(parse_line("aa5", 7).is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let record = CaptureRecord::new(Some(0.12), Bytes::from_static(&[0xAA, 0x55, 0x02]));
        let line = record.to_string();
        assert_eq!(line, "0.12: aa 55 02");
        assert_eq!(parse_line(&line, 1).unwrap(), Some(record));
    }

    #[test]
    fn test_timestamps_keep_full_precision() {
        for ts in [0.0, 1.5, 2.0004, 1234.567_891_25, 1e-7] {
            let record = CaptureRecord::new(Some(ts), Bytes::from_static(&[0x01]));
            let parsed = parse_line(&record.to_string(), 1).unwrap().unwrap();
            assert_eq!(parsed.timestamp, Some(ts), "{}", record);
        }
    }
}
