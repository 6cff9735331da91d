//! Line-oriented tick file reader.
//!
//! One reader owns one open file handle for one symbol and produces a lazy
//! sequence of [`TickRecord`]s. End-of-stream is a normal `Ok(None)`
//! result, never an error; true parse faults surface as typed
//! [`ReaderError`] values.
//!
//! # Line Format
//!
//! ```text
//! timestamp,price,size,exchange,event_type
//! 2024-01-02 09:30:00.500,101.25,100,NASDAQ,TRADE
//! ```
//!
//! Blank lines and comment lines (`#...`, `//...`) are skipped. The
//! timestamp's whole-second portion is interpreted as a calendar time in
//! the local timezone; an optional `.mmm` fraction adds milliseconds
//! (0 when absent).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::offset::LocalResult;
use chrono::{Local, NaiveDateTime, TimeZone};

use crate::domain::{SymbolId, TickRecord, TickType};

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur while reading and parsing a tick file.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// A data line did not split into exactly 5 comma-separated fields.
    #[error("malformed record at line {line}: expected 5 fields, found {found}")]
    MalformedRecord {
        /// 1-based line number in the source file.
        line: u64,
        /// Number of fields actually present.
        found: usize,
    },

    /// The event-type token is outside the fixed vocabulary.
    #[error("unknown event type {token:?} at line {line}")]
    UnknownEventType {
        /// 1-based line number in the source file.
        line: u64,
        /// The unrecognized token.
        token: String,
    },

    /// The timestamp field could not be parsed.
    #[error("invalid timestamp {value:?} at line {line}")]
    InvalidTimestamp {
        /// 1-based line number in the source file.
        line: u64,
        /// The offending field text.
        value: String,
    },

    /// The price field could not be parsed or was negative.
    #[error("invalid price {value:?} at line {line}")]
    InvalidPrice {
        /// 1-based line number in the source file.
        line: u64,
        /// The offending field text.
        value: String,
    },

    /// The size field was not a non-negative integer.
    #[error("invalid size {value:?} at line {line}")]
    InvalidSize {
        /// 1-based line number in the source file.
        line: u64,
        /// The offending field text.
        value: String,
    },

    /// The underlying file could not be opened or read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// The tick file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Parse Policy
// =============================================================================

/// What to do with a line that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePolicy {
    /// A bad line is a fault: the error propagates and the symbol's run
    /// aborts. Matches the reference behavior.
    #[default]
    Strict,
    /// A bad line is logged with a warning and skipped; parsing continues
    /// with the next line.
    SkipAndWarn,
}

impl ParsePolicy {
    /// Parse a policy from string, case-insensitive. Unrecognized values
    /// fall back to `Strict`.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "skip" | "skip_and_warn" | "skip-and-warn" => Self::SkipAndWarn,
            _ => Self::Strict,
        }
    }

    /// Get the policy name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::SkipAndWarn => "skip_and_warn",
        }
    }
}

// =============================================================================
// Tick File Reader
// =============================================================================

/// Streaming reader over one symbol's tick file.
///
/// Created after the catalog is finalized, one per non-sentinel symbol.
/// Dropping the reader closes the underlying file handle.
pub struct TickFileReader {
    reader: BufReader<File>,
    path: PathBuf,
    symbol_id: SymbolId,
    policy: ParsePolicy,
    line_no: u64,
}

impl TickFileReader {
    /// Open a tick file for the given symbol.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Io`] if the file cannot be opened.
    pub fn open(path: &Path, symbol_id: SymbolId, policy: ParsePolicy) -> Result<Self, ReaderError> {
        let file = File::open(path).map_err(|source| ReaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            reader: BufReader::new(file),
            path: path.to_path_buf(),
            symbol_id,
            policy,
            line_no: 0,
        })
    }

    /// The symbol id stamped onto every record this reader produces.
    #[must_use]
    pub const fn symbol_id(&self) -> SymbolId {
        self.symbol_id
    }

    /// Produce the next tick, or `Ok(None)` at end-of-stream.
    ///
    /// Blank and comment lines are skipped unconditionally. Lines that
    /// fail to parse follow the configured [`ParsePolicy`].
    ///
    /// # Errors
    ///
    /// Returns a [`ReaderError`] for I/O failures, and for parse failures
    /// under [`ParsePolicy::Strict`].
    pub fn next_tick(&mut self) -> Result<Option<TickRecord>, ReaderError> {
        let mut buf = String::new();

        loop {
            buf.clear();
            let bytes = self
                .reader
                .read_line(&mut buf)
                .map_err(|source| ReaderError::Io {
                    path: self.path.clone(),
                    source,
                })?;
            if bytes == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let line = buf.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }

            match parse_line(line, self.line_no, self.symbol_id) {
                Ok(record) => return Ok(Some(record)),
                Err(e) => match self.policy {
                    ParsePolicy::Strict => return Err(e),
                    ParsePolicy::SkipAndWarn => {
                        tracing::warn!(
                            path = %self.path.display(),
                            error = %e,
                            "Skipping unparseable tick line"
                        );
                    }
                },
            }
        }
    }

    /// Pull up to `budget` ticks, stopping early at end-of-stream.
    ///
    /// # Errors
    ///
    /// Propagates the first [`ReaderError`] encountered.
    pub fn read_batch(&mut self, budget: usize) -> Result<Vec<TickRecord>, ReaderError> {
        let mut batch = Vec::with_capacity(budget.min(1024));
        while batch.len() < budget {
            match self.next_tick()? {
                Some(tick) => batch.push(tick),
                None => break,
            }
        }
        Ok(batch)
    }
}

impl std::fmt::Debug for TickFileReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickFileReader")
            .field("path", &self.path)
            .field("symbol_id", &self.symbol_id)
            .field("policy", &self.policy)
            .field("line_no", &self.line_no)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Line Parsing
// =============================================================================

/// Parse one trimmed, non-comment data line into a tick record.
fn parse_line(line: &str, line_no: u64, symbol_id: SymbolId) -> Result<TickRecord, ReaderError> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 5 {
        return Err(ReaderError::MalformedRecord {
            line: line_no,
            found: fields.len(),
        });
    }

    let epoch_millis = parse_timestamp(fields[0].trim(), line_no)?;

    let price_text = fields[1].trim();
    let price: f64 = price_text.parse().map_err(|_| ReaderError::InvalidPrice {
        line: line_no,
        value: price_text.to_string(),
    })?;
    if !price.is_finite() || price < 0.0 {
        return Err(ReaderError::InvalidPrice {
            line: line_no,
            value: price_text.to_string(),
        });
    }

    let size_text = fields[2].trim();
    let size: u64 = size_text.parse().map_err(|_| ReaderError::InvalidSize {
        line: line_no,
        value: size_text.to_string(),
    })?;

    let exchange = fields[3].to_string();

    let token = fields[4].trim();
    let tick_type = TickType::from_token(token).ok_or_else(|| ReaderError::UnknownEventType {
        line: line_no,
        token: token.to_string(),
    })?;

    Ok(TickRecord {
        epoch_millis,
        price,
        size,
        exchange,
        tick_type,
        symbol_id,
    })
}

/// Parse `YYYY-MM-DD HH:MM:SS[.mmm]` into local-time epoch milliseconds.
///
/// The fraction, when present, is 1 to 3 digits right-padded to
/// milliseconds (`.5` means 500 ms); absent means 0.
fn parse_timestamp(value: &str, line_no: u64) -> Result<i64, ReaderError> {
    let invalid = || ReaderError::InvalidTimestamp {
        line: line_no,
        value: value.to_string(),
    };

    let (seconds_part, millis) = match value.split_once('.') {
        Some((secs, frac)) => {
            if frac.is_empty() || frac.len() > 3 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let padded = format!("{frac:0<3}");
            let ms: i64 = padded.parse().map_err(|_| invalid())?;
            (secs, ms)
        }
        None => (value, 0),
    };

    let naive = NaiveDateTime::parse_from_str(seconds_part, "%Y-%m-%d %H:%M:%S")
        .map_err(|_| invalid())?;

    // DST-ambiguous wall-clock times resolve to the earliest valid instant;
    // nonexistent ones are rejected.
    let local = match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => return Err(invalid()),
    };

    Ok(local.timestamp_millis() + millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use test_case::test_case;

    fn local_millis(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> i64 {
        Local
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .single()
            .unwrap()
            .timestamp_millis()
    }

    fn open_fixture(contents: &str, policy: ParsePolicy) -> (tempfile::TempDir, TickFileReader) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AAPL.txt");
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        let reader = TickFileReader::open(&path, SymbolId::new(1), policy).unwrap();
        (dir, reader)
    }

    #[test]
    fn parses_reference_line() {
        let record = parse_line(
            "2024-01-02 09:30:00.500,101.25,100,NASDAQ,TRADE",
            1,
            SymbolId::new(3),
        )
        .unwrap();

        assert_eq!(record.epoch_millis, local_millis(2024, 1, 2, 9, 30, 0) + 500);
        assert_eq!(record.price, 101.25);
        assert_eq!(record.size, 100);
        assert_eq!(record.exchange, "NASDAQ");
        assert_eq!(record.tick_type, TickType::Trade);
        assert_eq!(record.symbol_id, SymbolId::new(3));
    }

    #[test]
    fn timestamp_without_fraction_has_zero_remainder() {
        let record = parse_line(
            "2024-01-02 09:30:00,101.25,100,NASDAQ,TRADE",
            1,
            SymbolId::new(1),
        )
        .unwrap();
        assert_eq!(record.epoch_millis, local_millis(2024, 1, 2, 9, 30, 0));
    }

    #[test_case(".5", 500; "one digit pads to 500")]
    #[test_case(".50", 500; "two digits pad to 500")]
    #[test_case(".007", 7; "three digits used as-is")]
    fn timestamp_fraction_padding(frac: &str, expected_ms: i64) {
        let value = format!("2024-01-02 09:30:00{frac}");
        let millis = parse_timestamp(&value, 1).unwrap();
        assert_eq!(millis, local_millis(2024, 1, 2, 9, 30, 0) + expected_ms);
    }

    #[test_case("2024-01-02 09:30:00.1234"; "too many fraction digits")]
    #[test_case("2024-01-02 09:30:00."; "empty fraction")]
    #[test_case("2024-13-02 09:30:00"; "bad month")]
    #[test_case("not a timestamp"; "garbage")]
    fn timestamp_rejects(value: &str) {
        assert!(matches!(
            parse_timestamp(value, 1),
            Err(ReaderError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        let err = parse_line("2024-01-02 09:30:00,101.25,100,NASDAQ", 7, SymbolId::new(1))
            .unwrap_err();
        assert!(matches!(
            err,
            ReaderError::MalformedRecord { line: 7, found: 4 }
        ));
    }

    #[test]
    fn unknown_event_type_rejected() {
        let err = parse_line(
            "2024-01-02 09:30:00,101.25,100,NASDAQ,FILL",
            2,
            SymbolId::new(1),
        )
        .unwrap_err();
        assert!(matches!(err, ReaderError::UnknownEventType { line: 2, .. }));
    }

    #[test]
    fn fractional_size_rejected() {
        let err = parse_line(
            "2024-01-02 09:30:00,101.25,100.5,NASDAQ,TRADE",
            1,
            SymbolId::new(1),
        )
        .unwrap_err();
        assert!(matches!(err, ReaderError::InvalidSize { .. }));
    }

    #[test]
    fn negative_price_rejected() {
        let err = parse_line(
            "2024-01-02 09:30:00,-1.0,100,NASDAQ,TRADE",
            1,
            SymbolId::new(1),
        )
        .unwrap_err();
        assert!(matches!(err, ReaderError::InvalidPrice { .. }));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let contents = "\
# header comment
// another comment

2024-01-02 09:30:00,100.0,10,NYSE,TRADE

2024-01-02 09:30:01,101.0,20,NYSE,QUOTE
";
        let (_dir, mut reader) = open_fixture(contents, ParsePolicy::Strict);

        let first = reader.next_tick().unwrap().unwrap();
        assert_eq!(first.price, 100.0);
        let second = reader.next_tick().unwrap().unwrap();
        assert_eq!(second.price, 101.0);
        assert!(reader.next_tick().unwrap().is_none());
    }

    #[test]
    fn end_of_stream_is_not_an_error() {
        let (_dir, mut reader) = open_fixture("", ParsePolicy::Strict);
        assert!(reader.next_tick().unwrap().is_none());
        // Repeated polls keep signalling end-of-stream.
        assert!(reader.next_tick().unwrap().is_none());
    }

    #[test]
    fn strict_policy_propagates_malformed_line() {
        let contents = "2024-01-02 09:30:00,100.0,10,NYSE\n";
        let (_dir, mut reader) = open_fixture(contents, ParsePolicy::Strict);
        assert!(matches!(
            reader.next_tick(),
            Err(ReaderError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn skip_policy_continues_past_malformed_line() {
        let contents = "\
2024-01-02 09:30:00,100.0,10,NYSE
2024-01-02 09:30:01,102.0,30,NYSE,TRADE
";
        let (_dir, mut reader) = open_fixture(contents, ParsePolicy::SkipAndWarn);

        let tick = reader.next_tick().unwrap().unwrap();
        assert_eq!(tick.price, 102.0);
        assert!(reader.next_tick().unwrap().is_none());
    }

    #[test]
    fn read_batch_honors_budget() {
        let mut contents = String::new();
        for i in 0..10 {
            contents.push_str(&format!("2024-01-02 09:30:{i:02},100.0,10,NYSE,TRADE\n"));
        }
        let (_dir, mut reader) = open_fixture(&contents, ParsePolicy::Strict);

        let batch = reader.read_batch(4).unwrap();
        assert_eq!(batch.len(), 4);

        let rest = reader.read_batch(100).unwrap();
        assert_eq!(rest.len(), 6);
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let result = TickFileReader::open(
            Path::new("/nonexistent/AAPL.txt"),
            SymbolId::new(1),
            ParsePolicy::Strict,
        );
        assert!(matches!(result, Err(ReaderError::Io { .. })));
    }

    #[test]
    fn policy_parse_from_env_text() {
        assert_eq!(
            ParsePolicy::from_str_case_insensitive("SKIP"),
            ParsePolicy::SkipAndWarn
        );
        assert_eq!(
            ParsePolicy::from_str_case_insensitive("strict"),
            ParsePolicy::Strict
        );
        assert_eq!(
            ParsePolicy::from_str_case_insensitive("bogus"),
            ParsePolicy::Strict
        );
    }
}
