//! Record codec for LinkVault.
//!
//! Converts between the in-memory [`Bookmark`] (native timestamps) and the
//! [`WireBookmark`] stored by providers and written to backups (ISO-8601
//! strings). Decoding validates the record instead of trusting its shape.

use chrono::{DateTime, Datelike, SecondsFormat, Timelike, Utc};
use serde_json::Value;

use crate::types::backup::{LoadedCollection, SkippedRecord};
use crate::types::bookmark::{Bookmark, WireBookmark};
use crate::types::errors::{StorageError, StorageResult};

/// Formats a timestamp the way browsers' `toISOString` does
/// (`2024-05-01T09:30:00.000Z`), keeping extra digits only when the value
/// carries sub-millisecond precision.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    if ts.nanosecond() % 1_000_000 == 0 {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    } else {
        ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

/// Parses an RFC 3339 / ISO-8601 timestamp with an explicit offset.
///
/// Also accepts the signed extended-year form (`+10000-01-01T00:00:00.000Z`,
/// `+010000-...`) that [`format_timestamp`] and `toISOString` produce for
/// years outside 0000..=9999.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(e) => parse_extended_year(raw).ok_or_else(|| format!("invalid timestamp '{}': {}", raw, e)),
    }
}

fn parse_extended_year(raw: &str) -> Option<DateTime<Utc>> {
    if !raw.starts_with(['+', '-']) {
        return None;
    }
    let year_end = raw[1..].find('-')? + 1;
    let digits = &raw[1..year_end];
    if digits.len() < 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = raw[..year_end].parse().ok()?;

    // 2000 is a leap year, so Feb 29 parses here and `with_year` rejects it
    // for years that have none.
    let rest = DateTime::parse_from_rfc3339(&format!("2000{}", &raw[year_end..])).ok()?;
    rest.with_year(year).map(|dt| dt.with_timezone(&Utc))
}

/// Converts a bookmark into its wire form. Every field except the
/// timestamps passes through unchanged.
pub fn encode(bookmark: &Bookmark) -> WireBookmark {
    WireBookmark {
        id: bookmark.id.clone(),
        title: bookmark.title.clone(),
        url: bookmark.url.clone(),
        description: bookmark.description.clone(),
        tags: bookmark.tags.clone(),
        favicon: bookmark.favicon.clone(),
        created_at: format_timestamp(&bookmark.created_at),
        updated_at: format_timestamp(&bookmark.updated_at),
    }
}

pub fn encode_all(bookmarks: &[Bookmark]) -> Vec<WireBookmark> {
    bookmarks.iter().map(encode).collect()
}

/// Parses a wire record back into a bookmark.
///
/// `index` is the record's position in its collection and is carried into
/// the `MalformedRecord` error.
pub fn decode(index: usize, wire: WireBookmark) -> StorageResult<Bookmark> {
    if wire.id.trim().is_empty() {
        return Err(StorageError::malformed(index, "missing id"));
    }
    if wire.title.trim().is_empty() {
        return Err(StorageError::malformed(index, "missing title"));
    }
    if wire.url.trim().is_empty() {
        return Err(StorageError::malformed(index, "missing url"));
    }

    let created_at = parse_timestamp(&wire.created_at)
        .map_err(|e| StorageError::malformed(index, format!("createdAt: {}", e)))?;
    let updated_at = parse_timestamp(&wire.updated_at)
        .map_err(|e| StorageError::malformed(index, format!("updatedAt: {}", e)))?;
    if updated_at < created_at {
        return Err(StorageError::malformed(index, "updatedAt precedes createdAt"));
    }

    Ok(Bookmark {
        id: wire.id,
        title: wire.title,
        url: wire.url,
        description: wire.description,
        tags: wire.tags,
        favicon: wire.favicon,
        created_at,
        updated_at,
    })
}

/// Decodes an untyped JSON value into a bookmark, validating its shape first.
pub fn decode_value(index: usize, value: Value) -> StorageResult<Bookmark> {
    let wire: WireBookmark = serde_json::from_value(value)
        .map_err(|e| StorageError::malformed(index, e.to_string()))?;
    decode(index, wire)
}

/// Decodes a sequence of untyped records, keeping the valid ones in order
/// and reporting the rest.
pub fn decode_values(values: Vec<Value>) -> LoadedCollection {
    let mut loaded = LoadedCollection::default();
    for (index, value) in values.into_iter().enumerate() {
        let id = value.get("id").and_then(Value::as_str).map(str::to_string);
        match decode_value(index, value) {
            Ok(bookmark) => loaded.bookmarks.push(bookmark),
            Err(e) => loaded.skipped.push(SkippedRecord {
                index,
                id,
                reason: skip_reason(e),
            }),
        }
    }
    loaded
}

/// Extracts the human-readable reason from a decode error.
pub fn skip_reason(err: StorageError) -> String {
    match err {
        StorageError::MalformedRecord { reason, .. } => reason,
        other => other.to_string(),
    }
}
