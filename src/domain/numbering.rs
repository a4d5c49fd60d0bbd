//! Letter identifier formatting.
//!
//! A full letter number looks like `007A/071073/LPM/001/III/2025`: the
//! zero-padded sequence with its optional suffix, the institution code, the
//! letter type code, the roman-numeral month and the year. Everything here is
//! pure; uniqueness is decided by the backend, the occupancy helpers at the
//! bottom only look at numbers the caller already holds.

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Institution code and organisation abbreviation used when none is configured.
pub const DEFAULT_INSTITUTION_CODE: &str = "071073/LPM";

/// Minimum printed width of the sequence number.
pub const SEQUENCE_WIDTH: usize = 3;

/// Upper bound on the gaps [`find_gaps`] reports.
pub const MAX_GAPS: usize = 1000;

/// Month table: roman code and Indonesian month name, indexed by month - 1.
const MONTHS: [(&str, &str); 12] = [
    ("I", "Januari"),
    ("II", "Februari"),
    ("III", "Maret"),
    ("IV", "April"),
    ("V", "Mei"),
    ("VI", "Juni"),
    ("VII", "Juli"),
    ("VIII", "Agustus"),
    ("IX", "September"),
    ("X", "Oktober"),
    ("XI", "November"),
    ("XII", "Desember"),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumberingError {
    #[error("invalid sequence number: {value} (must be a positive integer)")]
    InvalidSequence { value: String },

    #[error("invalid date: {value}")]
    InvalidDate { value: String },

    #[error("unknown month: {value}")]
    UnknownMonth { value: String },

    #[error("sequence number out of range: {value}")]
    SequenceOutOfRange { value: String },
}

pub type NumberingResult<T> = std::result::Result<T, NumberingError>;

/// The parts of a letter number before it is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterNumber {
    pub sequence: u64,
    pub suffix: String,
    pub type_code: String,
    pub month: u32,
    pub year: i32,
}

impl LetterNumber {
    pub fn from_date(
        sequence: i64,
        suffix: &str,
        type_code: &str,
        date: NaiveDate,
    ) -> NumberingResult<Self> {
        let sequence = positive_sequence(sequence)?;
        check_year(date.year(), &date.to_string())?;

        Ok(Self {
            sequence,
            suffix: suffix.to_string(),
            type_code: type_code.to_string(),
            month: date.month(),
            year: date.year(),
        })
    }

    pub fn month_code(&self) -> NumberingResult<&'static str> {
        month_to_roman(self.month)
    }

    pub fn format(&self, institution_code: &str) -> NumberingResult<String> {
        Ok(format!(
            "{}{}/{}/{}/{}/{}",
            pad_sequence(self.sequence),
            self.suffix,
            institution_code,
            self.type_code,
            self.month_code()?,
            self.year
        ))
    }
}

/// Builds the canonical letter number from raw form values.
///
/// `iso_date` may be a plain `YYYY-MM-DD` date or an RFC 3339 timestamp; only
/// its calendar month and year are used.
pub fn format_identifier(
    sequence: i64,
    suffix: &str,
    type_code: &str,
    iso_date: &str,
    institution_code: &str,
) -> NumberingResult<String> {
    let date = parse_iso_date(iso_date)?;
    LetterNumber::from_date(sequence, suffix, type_code, date)?.format(institution_code)
}

/// Zero-pads to [`SEQUENCE_WIDTH`]; wider numbers are kept whole.
pub fn pad_sequence(sequence: u64) -> String {
    format!("{:0width$}", sequence, width = SEQUENCE_WIDTH)
}

pub fn month_to_roman(month: u32) -> NumberingResult<&'static str> {
    month_entry(month).map(|(roman, _)| roman)
}

pub fn month_name(month: u32) -> NumberingResult<&'static str> {
    month_entry(month).map(|(_, name)| name)
}

pub fn roman_to_month(roman: &str) -> NumberingResult<u32> {
    let wanted = roman.trim();
    MONTHS
        .iter()
        .position(|(code, _)| code.eq_ignore_ascii_case(wanted))
        .map(|index| index as u32 + 1)
        .ok_or_else(|| NumberingError::UnknownMonth {
            value: roman.to_string(),
        })
}

pub fn roman_to_month_name(roman: &str) -> NumberingResult<&'static str> {
    roman_to_month(roman).and_then(month_name)
}

/// Parses a form value into a storable sequence number (the column is 32-bit).
pub fn parse_sequence(text: &str) -> NumberingResult<u32> {
    let value = text.trim();
    let sequence = value
        .parse::<i64>()
        .map_err(|_| NumberingError::InvalidSequence {
            value: value.to_string(),
        })
        .and_then(positive_sequence)?;

    u32::try_from(sequence).map_err(|_| NumberingError::SequenceOutOfRange {
        value: value.to_string(),
    })
}

pub fn parse_iso_date(text: &str) -> NumberingResult<NaiveDate> {
    let value = text.trim();
    let invalid = || NumberingError::InvalidDate {
        value: text.to_string(),
    };

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|ts| ts.date_naive()))
        .map_err(|_| invalid())?;

    check_year(date.year(), text)?;
    Ok(date)
}

/// Indonesian short date, `DD/MM/YYYY`.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// True when `(sequence, suffix)` already appears in `occupied`.
///
/// The caller is expected to pass numbers from a single year.
pub fn is_occupied<S: AsRef<str>>(
    sequence: u32,
    suffix: &str,
    occupied: impl IntoIterator<Item = (u32, S)>,
) -> bool {
    occupied
        .into_iter()
        .any(|(used, used_suffix)| used == sequence && used_suffix.as_ref() == suffix)
}

/// Sequence numbers in `1..=max(used)` that have no letter, lowest first.
///
/// At most [`MAX_GAPS`] are returned, so a single stray large number cannot
/// blow up the result.
pub fn find_gaps(used: &[u32]) -> Vec<u32> {
    let taken: BTreeSet<u32> = used.iter().copied().filter(|n| *n > 0).collect();
    let mut gaps = Vec::new();
    let mut expected = 1u32;

    for &number in &taken {
        while expected < number {
            if gaps.len() == MAX_GAPS {
                return gaps;
            }
            gaps.push(expected);
            expected += 1;
        }
        expected = number.saturating_add(1);
    }
    gaps
}

/// One past the highest used number, or 1 for an empty year.
pub fn next_sequence(used: &[u32]) -> NumberingResult<u32> {
    match used.iter().copied().max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| NumberingError::SequenceOutOfRange {
                value: max.to_string(),
            }),
    }
}

fn month_entry(month: u32) -> NumberingResult<(&'static str, &'static str)> {
    month
        .checked_sub(1)
        .and_then(|index| MONTHS.get(index as usize))
        .copied()
        .ok_or_else(|| NumberingError::UnknownMonth {
            value: month.to_string(),
        })
}

fn positive_sequence(sequence: i64) -> NumberingResult<u64> {
    u64::try_from(sequence)
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| NumberingError::InvalidSequence {
            value: sequence.to_string(),
        })
}

fn check_year(year: i32, raw: &str) -> NumberingResult<()> {
    if (1000..=9999).contains(&year) {
        Ok(())
    } else {
        Err(NumberingError::InvalidDate {
            value: raw.to_string(),
        })
    }
}
