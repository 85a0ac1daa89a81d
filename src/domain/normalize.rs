//! Normalization boundary between raw backend JSON and [`Record`].
//!
//! Backend payloads are inconsistent: amounts arrive as decimal strings,
//! the same concept travels under several field names (`createdAt`, `date`,
//! `submittedAt`), user data is sometimes flat and sometimes nested under
//! `user`. All of that is resolved here, once, through [`FIELD_ALIASES`].
//! Nothing in this module fails; gaps become defaults.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use super::{CanonicalStatus, Record, RecordKind};

/// Canonical field a backend alias resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    /// Record identifier.
    Id,
    /// Monetary amount.
    Amount,
    /// Currency / asset code.
    Currency,
    /// Raw status.
    Status,
    /// Primary timestamp.
    CreatedAt,
    /// Owning user id.
    UserId,
    /// Owning user display name.
    UserName,
    /// Owning user email.
    UserEmail,
    /// Transaction id / hash.
    TxId,
    /// Type, method or category.
    Category,
    /// Title.
    Title,
    /// Reason / note.
    Note,
}

/// Known backend spellings for every canonical field, in priority order.
///
/// Dotted aliases walk nested objects (`user.email`).
pub const FIELD_ALIASES: &[(CanonicalField, &[&str])] = &[
    (CanonicalField::Id, &["id", "_id", "uuid", "recordId"]),
    (
        CanonicalField::Amount,
        &["amount", "value", "sum", "amountUsd", "total"],
    ),
    (CanonicalField::Currency, &["currency", "asset", "coin", "symbol"]),
    (CanonicalField::Status, &["status", "state", "reviewStatus"]),
    (
        CanonicalField::CreatedAt,
        &[
            "createdAt",
            "created_at",
            "date",
            "submittedAt",
            "requestedAt",
            "publishedAt",
            "timestamp",
        ],
    ),
    (
        CanonicalField::UserId,
        &["userId", "user_id", "user.id", "user._id", "clientId", "investorId"],
    ),
    (
        CanonicalField::UserName,
        &[
            "userName",
            "user_name",
            "fullName",
            "clientName",
            "user.fullName",
            "user.name",
            "name",
        ],
    ),
    (
        CanonicalField::UserEmail,
        &["userEmail", "user_email", "email", "user.email", "clientEmail"],
    ),
    (
        CanonicalField::TxId,
        &[
            "txId",
            "txid",
            "tx_id",
            "transactionId",
            "transaction_id",
            "txHash",
            "transactionHash",
            "hash",
        ],
    ),
    (
        CanonicalField::Category,
        &["type", "method", "paymentMethod", "category", "kind"],
    ),
    (CanonicalField::Title, &["title", "subject", "headline"]),
    (
        CanonicalField::Note,
        &["reason", "note", "comment", "rejectionReason", "adminNote"],
    ),
];

/// Keys a collection envelope may carry its array under.
const ENVELOPE_KEYS: [&str; 4] = ["data", "items", "results", "records"];

/// Returns the aliases registered for `field`.
#[must_use]
pub fn aliases(field: CanonicalField) -> &'static [&'static str] {
    match FIELD_ALIASES.iter().find(|(f, _)| *f == field) {
        Some((_, names)) => names,
        None => &[],
    }
}

/// Resolves `field` against a raw object: the first alias present with a
/// non-null value wins.
#[must_use]
pub fn lookup<'a>(raw: &'a Value, field: CanonicalField) -> Option<&'a Value> {
    aliases(field)
        .iter()
        .filter_map(|alias| lookup_path(raw, alias))
        .find(|v| !v.is_null())
}

fn lookup_path<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(raw, |value, key| value.get(key))
}

/// Renders a scalar JSON value as trimmed text. Null, arrays and objects
/// become the empty string.
#[must_use]
pub fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Parses a monetary amount.
///
/// Strings are stripped of everything except digits, sign and decimal
/// point before parsing (`"$1,234.50"` → `1234.5`). Missing, unparsable or
/// non-finite values yield `0.0`.
#[must_use]
pub fn parse_amount(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Parses a timestamp in any of the formats the backend is known to emit.
///
/// Accepts RFC 3339, naive `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`
/// (taken as UTC), plain dates, and numeric epochs in seconds or
/// milliseconds.
#[must_use]
pub fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(truncate_epoch))
            .and_then(epoch_to_utc),
        _ => None,
    }
}

/// String form of [`parse_timestamp`].
#[must_use]
pub fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n));
    }
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(truncate_epoch))
        .and_then(epoch_to_utc)
}

/// Fractional epochs keep their whole part.
#[allow(clippy::cast_possible_truncation)]
fn truncate_epoch(epoch: f64) -> Option<i64> {
    (epoch.is_finite() && epoch.abs() < 9.0e15).then(|| epoch.trunc() as i64)
}

fn epoch_to_utc(epoch: i64) -> Option<DateTime<Utc>> {
    if epoch.abs() > 100_000_000_000 {
        DateTime::from_timestamp_millis(epoch)
    } else {
        DateTime::from_timestamp(epoch, 0)
    }
}

/// Converts one raw backend record into a canonical [`Record`].
///
/// Total: any JSON value (even a non-object) produces a record with every
/// field defined.
#[must_use]
pub fn normalize_record(kind: RecordKind, raw: &Value) -> Record {
    let raw_status = text_of(lookup(raw, CanonicalField::Status));
    Record {
        id: text_of(lookup(raw, CanonicalField::Id)),
        kind,
        amount: parse_amount(lookup(raw, CanonicalField::Amount)),
        currency: text_of(lookup(raw, CanonicalField::Currency)).to_uppercase(),
        status: CanonicalStatus::canonicalize(&raw_status),
        raw_status,
        created_at: parse_timestamp(lookup(raw, CanonicalField::CreatedAt)),
        user_id: text_of(lookup(raw, CanonicalField::UserId)),
        user_name: user_name(raw),
        user_email: text_of(lookup(raw, CanonicalField::UserEmail)),
        tx_id: text_of(lookup(raw, CanonicalField::TxId)),
        category: text_of(lookup(raw, CanonicalField::Category)).to_lowercase(),
        title: text_of(lookup(raw, CanonicalField::Title)),
        note: text_of(lookup(raw, CanonicalField::Note)),
    }
}

/// Display name, falling back to `firstName lastName` pairs (flat or under
/// `user`) when no single-field alias is present.
fn user_name(raw: &Value) -> String {
    let name = text_of(lookup(raw, CanonicalField::UserName));
    if !name.is_empty() {
        return name;
    }
    [raw.get("user"), Some(raw)]
        .into_iter()
        .flatten()
        .map(|scope| {
            let first = text_of(scope.get("firstName"));
            let last = text_of(scope.get("lastName"));
            format!("{first} {last}").trim().to_string()
        })
        .find(|joined| !joined.is_empty())
        .unwrap_or_default()
}

/// Extracts the record array from a collection payload.
///
/// Accepts a bare array or an object wrapping it under one of
/// [`ENVELOPE_KEYS`]. Anything else is an empty collection.
#[must_use]
pub fn collection_items(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => ENVELOPE_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Normalizes every object in a raw collection, preserving backend order.
/// Non-object elements are skipped.
#[must_use]
pub fn normalize_collection(kind: RecordKind, items: &[Value]) -> Vec<Record> {
    let records: Vec<Record> = items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| normalize_record(kind, item))
        .collect();
    tracing::debug!(%kind, raw = items.len(), normalized = records.len(), "normalized collection");
    records
}
