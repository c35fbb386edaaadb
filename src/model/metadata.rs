//! Document information dictionary as a flat string map.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use serde::Serialize;
use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::parser::{decode_text_string, PdfValue};

/// Info dictionary keys holding PDF dates.
const DATE_KEYS: [&str; 2] = ["CreationDate", "ModDate"];

/// Document metadata (title, author, producer, dates, ...).
///
/// Keys are the info dictionary keys without the leading slash. Values are
/// text; entries that have no textual form (arrays, dictionaries, streams,
/// null) are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: BTreeMap<String, String>,
}

impl Metadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build metadata from raw info dictionary entries.
    pub fn from_info(info: Vec<(String, PdfValue)>) -> Self {
        let entries = info
            .into_iter()
            .filter_map(|(key, value)| Some((key, value_to_text(value)?)))
            .collect();
        Self { entries }
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("Title")
    }

    pub fn author(&self) -> Option<&str> {
        self.get("Author")
    }

    pub fn producer(&self) -> Option<&str> {
        self.get("Producer")
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite `CreationDate` and `ModDate` from PDF date syntax to RFC 3339.
    ///
    /// Values that do not parse are left untouched.
    pub fn with_normalized_dates(mut self) -> Self {
        for key in DATE_KEYS {
            if let Some(value) = self.entries.get_mut(key) {
                match parse_pdf_date(value) {
                    Some(date) => *value = date.to_rfc3339(),
                    None => log::debug!("Leaving unparseable {} as is: {:?}", key, value),
                }
            }
        }
        self
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn value_to_text(value: PdfValue) -> Option<String> {
    match value {
        PdfValue::Str(bytes) => Some(decode_text_string(&bytes)),
        PdfValue::Name(name) => Some(String::from_utf8_lossy(&name).into_owned()),
        PdfValue::Integer(i) => Some(i.to_string()),
        PdfValue::Real(r) => Some(r.to_string()),
        PdfValue::Boolean(b) => Some(b.to_string()),
        PdfValue::Other => None,
    }
}

/// Parse a PDF date string (`D:YYYYMMDDHHmmSSOHH'mm'`).
///
/// Everything after the year is optional. A missing offset is read as UTC.
pub fn parse_pdf_date(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);

    // At minimum we need YYYY
    let year: i32 = s.get(0..4)?.parse().ok()?;
    let field = |range: std::ops::Range<usize>, default: u32| -> Option<u32> {
        match s.get(range) {
            Some(digits) if digits.bytes().all(|b| b.is_ascii_digit()) => digits.parse().ok(),
            Some(_) => None,
            None => Some(default),
        }
    };
    let month = field(4..6, 1)?;
    let day = field(6..8, 1)?;
    let hour = field(8..10, 0)?;
    let minute = field(10..12, 0)?;
    let second = field(12..14, 0)?;

    let offset = parse_offset(s.get(14..).unwrap_or(""))?;
    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    offset.from_local_datetime(&naive).single()
}

/// Parse the `OHH'mm'` suffix of a PDF date.
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let mut chars = s.chars();
    let sign = match chars.next() {
        None | Some('Z') => return FixedOffset::east_opt(0),
        Some('+') => 1,
        Some('-') => -1,
        Some(_) => return None,
    };

    let digits: String = chars.filter(char::is_ascii_digit).collect();
    let hours: i32 = digits.get(0..2)?.parse().ok()?;
    let minutes: i32 = digits.get(2..4).and_then(|m| m.parse().ok()).unwrap_or(0);
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
