//! Tolerant field parsing for raw lending-protocol event JSON.
//!
//! Source data is noisy: amounts arrive as numbers or numeric strings,
//! timestamps as integers or integer strings, nested relations may be
//! missing or of the wrong shape. Every accessor here is total and returns
//! `None` for anything it cannot interpret.

use serde_json::Value;

use crate::types::{TxEvent, TxKind};

/// Field holding the USD amount on raw events.
pub const AMOUNT_FIELD: &str = "amountUSD";

/// Field holding the Unix timestamp on raw events.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Field holding the identifier inside a nested relation.
pub const ID_FIELD: &str = "id";

/// Parse a decimal string. Empty, non-numeric, NaN and infinite input is absent.
///
/// # Examples
///
/// ```
/// use lendscore_core::parse::parse_decimal;
/// assert_eq!(parse_decimal(" 12.50 "), Some(12.5));
/// assert_eq!(parse_decimal("NaN"), None);
/// assert_eq!(parse_decimal("ten"), None);
/// ```
pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Interpret a JSON value as a non-negative USD amount.
///
/// Negative amounts are treated as absent.
pub fn parse_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }?;
    (amount >= 0.0).then_some(amount)
}

/// Interpret a JSON value as Unix epoch seconds.
///
/// Accepts integers, floats (truncated) and their string forms.
/// Non-positive values are treated as absent.
pub fn parse_timestamp(value: &Value) -> Option<i64> {
    let ts = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate_seconds)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| parse_decimal(s).and_then(truncate_seconds))
        }
        _ => None,
    }?;
    (ts > 0).then_some(ts)
}

fn truncate_seconds(secs: f64) -> Option<i64> {
    if secs.is_finite() && secs.abs() < i64::MAX as f64 {
        Some(secs.trunc() as i64)
    } else {
        None
    }
}

/// Interpret text as a boolean flag.
///
/// Case-insensitive `true`/`false`, `1`/`0` and `yes`/`no`; anything else is absent.
///
/// # Examples
///
/// ```
/// use lendscore_core::parse::parse_flag;
/// assert_eq!(parse_flag("True"), Some(true));
/// assert_eq!(parse_flag("0"), Some(false));
/// assert_eq!(parse_flag("maybe"), None);
/// ```
pub fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Resolve `event[relation]["id"]` as a non-empty string, verbatim.
pub fn nested_id<'a>(event: &'a Value, relation: &str) -> Option<&'a str> {
    event
        .get(relation)?
        .get(ID_FIELD)?
        .as_str()
        .filter(|id| !id.is_empty())
}

impl TxEvent {
    /// Build an event from one raw JSON object of the given kind.
    ///
    /// Never fails: fields that are missing or malformed stay `None`.
    /// Liquidation amounts are dropped since they never feed a sum.
    pub fn from_json(kind: TxKind, raw: &Value) -> Self {
        let amount_usd = if kind.carries_amount() {
            raw.get(AMOUNT_FIELD).and_then(parse_amount)
        } else {
            None
        };

        TxEvent {
            kind,
            wallet: nested_id(raw, kind.subject_relation()).map(str::to_string),
            amount_usd,
            timestamp: raw.get(TIMESTAMP_FIELD).and_then(parse_timestamp),
        }
    }
}
