//! # Log Line Format
//!
//! Textual layout of the allocation log and the pool snapshot. Both files are
//! meant to be read and edited by an operator with a plain text editor.
//!
//! ```text
//! === Danh sách người nhận lì xì Tết 2025 ===
//!
//! [14:03:22 29/1/2025] Tên: A, STK: 111, Ngân hàng: X, Số tiền: 20.000 VNĐ, IP: 1.1.1.1
//! ```
//!
//! Every separator after the timestamp contains a comma. Commas (and `%`)
//! inside a field are written percent-encoded as `%2C` (and `%25`), so the
//! first occurrence of each separator is always the real field boundary.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, Offset, Utc};

use super::entities::{AllocationRecord, Amount};
use super::pool::PoolState;

/// Header written when the allocation log is created.
pub const LOG_HEADER: &str = "=== Danh sách người nhận lì xì Tết 2025 ===\n\n";

/// Header of the advisory pool snapshot.
pub const SNAPSHOT_HEADER: &str = "=== Số lượng lì xì còn lại Tết 2025 ===\n\n";

/// Lines without this marker are not allocation entries.
const RECORD_MARKER: &str = "Tên:";

const NAME_SEP: &str = "] Tên: ";
const ACCOUNT_SEP: &str = ", STK: ";
const BANK_SEP: &str = ", Ngân hàng: ";
const AMOUNT_SEP: &str = ", Số tiền: ";
const ORIGIN_SEP: &str = " VNĐ, IP: ";

/// Asia/Ho_Chi_Minh, UTC+7, no DST.
const LOCAL_OFFSET_SECS: i32 = 7 * 3600;

/// Classification of one log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedLine {
    /// Header, blank line or operator note.
    NotARecord,
    /// Looks like an entry but does not match the layout.
    Malformed,
    Record(AllocationRecord),
}

/// Offset used for log timestamps.
pub fn local_offset() -> FixedOffset {
    FixedOffset::east_opt(LOCAL_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// `HH:MM:SS D/M/YYYY`, e.g. `14:03:22 29/1/2025`.
pub fn format_timestamp(at: DateTime<FixedOffset>) -> String {
    at.format("%H:%M:%S %-d/%-m/%Y").to_string()
}

/// Group thousands with `.`: `500000` becomes `500.000`.
pub fn format_amount(amount: Amount) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Inverse of [`format_amount`]; also accepts ungrouped digits.
pub fn parse_amount(text: &str) -> Option<Amount> {
    let digits: String = text.trim().chars().filter(|c| *c != '.').collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Field text as stored in the log.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if !value.contains(['%', ',']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 4);
    for ch in value.chars() {
        match ch {
            '%' => out.push_str("%25"),
            ',' => out.push_str("%2C"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Inverse of [`escape_field`]. A `%` not followed by `25` or `2C` is kept
/// as typed.
pub fn unescape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with("%25") {
            out.push('%');
            rest = &tail[3..];
        } else if tail.starts_with("%2C") || tail.starts_with("%2c") {
            out.push(',');
            rest = &tail[3..];
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// One log line, newline included.
pub fn encode_record(record: &AllocationRecord) -> String {
    format!(
        "[{}{}{}{}{}{}{}{}{}{}{}\n",
        record.timestamp,
        NAME_SEP,
        escape_field(&record.claimant_name),
        ACCOUNT_SEP,
        escape_field(&record.account_number),
        BANK_SEP,
        escape_field(&record.bank_name),
        AMOUNT_SEP,
        format_amount(record.amount),
        ORIGIN_SEP,
        escape_field(&record.origin_address),
    )
}

pub fn decode_line(line: &str) -> DecodedLine {
    let line = line.trim_end_matches(['\r', '\n']);
    if !line.contains(RECORD_MARKER) {
        return DecodedLine::NotARecord;
    }
    match decode_fields(line) {
        Some(record) => DecodedLine::Record(record),
        None => DecodedLine::Malformed,
    }
}

fn decode_fields(line: &str) -> Option<AllocationRecord> {
    let start = line.find('[')?;
    let rest = &line[start + 1..];
    let (timestamp, rest) = rest.split_once(NAME_SEP)?;
    let (name, rest) = rest.split_once(ACCOUNT_SEP)?;
    let (account, rest) = rest.split_once(BANK_SEP)?;
    let (bank, rest) = rest.split_once(AMOUNT_SEP)?;
    let (amount, origin) = rest.split_once(ORIGIN_SEP)?;

    Some(AllocationRecord {
        timestamp: timestamp.to_string(),
        claimant_name: unescape_field(name),
        account_number: unescape_field(account),
        bank_name: unescape_field(bank),
        amount: parse_amount(amount)?,
        origin_address: unescape_field(origin),
    })
}

/// Snapshot body: header, then `amount|remaining` per denomination.
pub fn encode_snapshot(pool: &PoolState) -> String {
    let lines: Vec<String> = pool
        .balances()
        .iter()
        .map(|balance| format!("{}|{}", balance.amount, balance.remaining))
        .collect();
    format!("{}{}", SNAPSHOT_HEADER, lines.join("\n"))
}
