//! Recorded capture files
//!
//! A capture is a plain text file with one bus event per line. Blank lines
//! are skipped and `#` starts a comment:
//!
//! ```text
//! # time_ns  event
//! 0          enable
//! 100-180    byte 9F            # MOSI only, MISO reads as 0x00
//! 180-260    byte 00 EF         # MOSI and MISO
//! 300        disable
//! 1000       sample 0x000F      # one parallel sample, 16 lines
//! ```
//!
//! Times are decimal nanoseconds. A byte may carry its end time as
//! `<start>-<end>`, otherwise it ends where it starts. Byte and sample
//! values are hex, with or without a `0x` prefix.

use std::format;
use std::fs;
use std::path::Path;
use std::string::{String, ToString};
use std::vec::Vec;

use thiserror::Error;

use crate::event::{BusEvent, Timestamp};

/// Errors from reading a capture file
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Failed to read the file
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that could not be read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A line could not be parsed
    #[error("Line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What is wrong with it
        message: String,
    },
}

/// Read and parse a capture file
pub fn read_capture_file(path: impl AsRef<Path>) -> Result<Vec<BusEvent>, CaptureError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| CaptureError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_capture(&content)
}

/// Parse the text of a capture
pub fn parse_capture(content: &str) -> Result<Vec<BusEvent>, CaptureError> {
    let mut events = Vec::new();
    let mut last: Option<Timestamp> = None;

    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let text = raw.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }

        let event = parse_line(text).map_err(|message| CaptureError::Parse { line, message })?;
        let time = event.time();
        if last.is_some_and(|prev| time < prev) {
            log::warn!(
                "Line {}: timestamp {} ns goes backwards (previous {} ns)",
                line,
                time,
                last.unwrap_or_default()
            );
        }
        last = Some(time);
        events.push(event);
    }

    log::debug!("Parsed {} capture events", events.len());
    Ok(events)
}

fn parse_line(text: &str) -> Result<BusEvent, String> {
    let mut fields = text.split_whitespace();
    let time = fields.next().ok_or("missing timestamp")?;
    let kind = fields.next().ok_or("missing event type")?;
    let args: Vec<&str> = fields.collect();

    let (start, end) = match time.split_once('-') {
        Some((start, end)) => (parse_time(start)?, Some(parse_time(end)?)),
        None => (parse_time(time)?, None),
    };
    if end.is_some() && !kind.eq_ignore_ascii_case("byte") {
        return Err(format!("'{}' events take a single timestamp", kind));
    }

    let event = match kind.to_ascii_lowercase().as_str() {
        "enable" => {
            expect_args(kind, &args, 0, 0)?;
            BusEvent::Enable { time: start }
        }
        "disable" => {
            expect_args(kind, &args, 0, 0)?;
            BusEvent::Disable { time: start }
        }
        "byte" => {
            expect_args(kind, &args, 1, 2)?;
            let end = end.unwrap_or(start);
            if end < start {
                return Err(format!("byte ends at {} ns before it starts", end));
            }
            BusEvent::Byte {
                start,
                end,
                mosi: parse_hex_u8(args[0])?,
                miso: args.get(1).map_or(Ok(0), |s| parse_hex_u8(s))?,
            }
        }
        "sample" => {
            expect_args(kind, &args, 1, 1)?;
            BusEvent::Sample {
                time: start,
                value: parse_hex_u16(args[0])?,
            }
        }
        _ => return Err(format!("unknown event type '{}'", kind)),
    };
    Ok(event)
}

fn expect_args(kind: &str, args: &[&str], min: usize, max: usize) -> Result<(), String> {
    if args.len() < min || args.len() > max {
        return Err(format!(
            "'{}' takes {} argument(s), got {}",
            kind,
            if min == max {
                min.to_string()
            } else {
                format!("{} to {}", min, max)
            },
            args.len()
        ));
    }
    Ok(())
}

fn parse_time(s: &str) -> Result<Timestamp, String> {
    s.parse()
        .map_err(|e| format!("invalid timestamp '{}': {}", s, e))
}

fn strip_hex(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

fn parse_hex_u8(s: &str) -> Result<u8, String> {
    u8::from_str_radix(strip_hex(s), 16).map_err(|e| format!("invalid byte '{}': {}", s, e))
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    u16::from_str_radix(strip_hex(s), 16).map_err(|e| format!("invalid sample '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec;

    #[test]
    fn test_parse_spi_capture() {
        let events = parse_capture(
            "# JEDEC ID\n\
             0 enable\n\
             100-180 byte 9F\n\
             180-260 byte 0x00 EF   # manufacturer\n\
             \n\
             300 disable\n",
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                BusEvent::Enable { time: 0 },
                BusEvent::Byte {
                    start: 100,
                    end: 180,
                    mosi: 0x9F,
                    miso: 0x00
                },
                BusEvent::Byte {
                    start: 180,
                    end: 260,
                    mosi: 0x00,
                    miso: 0xEF
                },
                BusEvent::Disable { time: 300 },
            ]
        );
    }

    #[test]
    fn test_parse_samples() {
        let events = parse_capture("10 sample 0x000F\n20 SAMPLE 8001").unwrap();
        assert_eq!(
            events,
            vec![
                BusEvent::Sample {
                    time: 10,
                    value: 0x000F
                },
                BusEvent::Sample {
                    time: 20,
                    value: 0x8001
                },
            ]
        );
    }

    #[test]
    fn test_byte_without_end_time() {
        let events = parse_capture("42 byte 06").unwrap();
        assert_eq!(
            events[0],
            BusEvent::Byte {
                start: 42,
                end: 42,
                mosi: 0x06,
                miso: 0
            }
        );
    }

    #[test]
    fn test_parse_errors_carry_line() {
        let err = parse_capture("0 enable\n10 byte XY").unwrap_err();
        assert!(matches!(err, CaptureError::Parse { line: 2, .. }));

        assert!(matches!(
            parse_capture("0 blink"),
            Err(CaptureError::Parse { line: 1, .. })
        ));
        assert!(parse_capture("abc enable").is_err());
        assert!(parse_capture("0 enable 1").is_err());
        assert!(parse_capture("0 byte").is_err());
        assert!(parse_capture("0 byte 01 02 03").is_err());
        assert!(parse_capture("0-5 disable").is_err());
        assert!(parse_capture("10-5 byte 01").is_err());
        assert!(parse_capture("0 sample 10000").is_err());
    }

    #[test]
    fn test_backwards_time_is_accepted() {
        let events = parse_capture("100 enable\n50 disable").unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_capture_file("/nonexistent/capture.txt"),
            Err(CaptureError::Io { .. })
        ));
    }
}
