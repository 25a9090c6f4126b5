//! Byte-level CSV parsing into [`RawRow`]s.
//!
//! Parsing never fails as a whole: malformed rows are collected into
//! [`ParsedCsv::errors`] and reading continues, so the caller sees every
//! structural problem at once and decides what to publish.

use crate::types::{CsvRowError, ParsedCsv, RawRow};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parses a CSV document with a header row.
///
/// Blank lines are skipped. A record whose field count differs from the
/// header is reported as a structural error and left out of `rows`. So is a
/// quoted field that is still open at end of input, together with every row
/// read from that point on.
#[must_use]
pub fn parse_csv(body: &[u8]) -> ParsedCsv {
    let body = body.strip_prefix(UTF8_BOM).unwrap_or(body);
    let mut parsed = ParsedCsv::default();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(body);

    let header_record = match reader.byte_headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            parsed.errors.push(row_error(&e));
            return parsed;
        }
    };

    for (idx, raw) in header_record.iter().enumerate() {
        match std::str::from_utf8(raw) {
            Ok(name) => parsed.headers.push(name.trim().to_owned()),
            Err(_) => {
                parsed.errors.push(CsvRowError {
                    line: Some(1),
                    message: format!("header column {} is not valid UTF-8", idx + 1),
                });
                return parsed;
            }
        }
    }

    for result in reader.byte_records() {
        match result {
            Ok(record) => {
                let line = record.position().map_or(0, csv::Position::line);
                let cells = parsed
                    .headers
                    .iter()
                    .cloned()
                    .zip(record.iter().map(<[u8]>::to_vec));
                parsed.rows.push(RawRow::from_pairs(line, cells));
            }
            Err(e) => parsed.errors.push(row_error(&e)),
        }
    }

    // The reader closes an open quote silently at EOF, folding the rest of
    // the file into one cell that may still have the right field count.
    if let Some(line) = unclosed_quote_line(body) {
        parsed.rows.retain(|row| row.line < line);
        parsed.errors.push(CsvRowError {
            line: Some(line),
            message: "quoted field is never closed".to_owned(),
        });
    }

    parsed
}

/// Line where a quoted field opens without a closing quote, if any.
///
/// Mirrors the reader's quoting rules: a quote only opens a field when it is
/// the field's first byte, and `""` inside a quoted field is an escaped quote.
fn unclosed_quote_line(body: &[u8]) -> Option<u64> {
    let mut line = 1u64;
    let mut at_field_start = true;
    let mut open_since: Option<u64> = None;
    let mut bytes = body.iter().copied().peekable();

    while let Some(b) = bytes.next() {
        if b == b'\n' {
            line += 1;
        }
        if open_since.is_some() {
            if b == b'"' {
                if bytes.peek() == Some(&b'"') {
                    bytes.next();
                } else {
                    open_since = None;
                    at_field_start = false;
                }
            }
            continue;
        }
        match b {
            b',' | b'\n' | b'\r' => at_field_start = true,
            b'"' if at_field_start => {
                open_since = Some(line);
                at_field_start = false;
            }
            _ => at_field_start = false,
        }
    }

    open_since
}

fn row_error(err: &csv::Error) -> CsvRowError {
    CsvRowError {
        line: err.position().map(csv::Position::line),
        message: err.to_string(),
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
