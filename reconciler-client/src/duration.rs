//! Parsing of the service's duration strings ("40s", "1h2m3.5s")

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("empty duration")]
    Empty,
    #[error("negative duration '{0}'")]
    Negative(String),
    #[error("invalid duration '{0}'")]
    Invalid(String),
    #[error("missing unit in duration '{0}'")]
    MissingUnit(String),
    #[error("unknown unit '{unit}' in duration '{input}'")]
    UnknownUnit { unit: String, input: String },
    #[error("duration '{0}' overflows")]
    Overflow(String),
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "\u{00b5}s" | "\u{03bc}s" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(1_000_000_000),
        "m" => Some(60 * 1_000_000_000),
        "h" => Some(3_600 * 1_000_000_000),
        _ => None,
    }
}

/// Parse a Go `time.Duration` string such as `"300ms"`, `"1h"` or `"2h45m30.5s"`.
///
/// A bare `"0"` is zero. Negative durations are rejected since a time spent
/// in a status cannot be negative.
pub fn parse_go_duration(input: &str) -> Result<Duration, DurationParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let s = match s.as_bytes()[0] {
        b'-' => return Err(DurationParseError::Negative(input.to_string())),
        b'+' => &s[1..],
        _ => s,
    };

    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(DurationParseError::Invalid(input.to_string()));
    }

    let mut total: u128 = 0;
    let mut rest = s;

    while !rest.is_empty() {
        // number: digits with an optional fraction
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..num_len];
        if number.is_empty() || number == "." || number.matches('.').count() > 1 {
            return Err(DurationParseError::Invalid(input.to_string()));
        }
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        if unit.is_empty() {
            return Err(DurationParseError::MissingUnit(input.to_string()));
        }
        rest = &rest[unit_len..];

        let scale = unit_nanos(unit).ok_or_else(|| DurationParseError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
        let overflow = || DurationParseError::Overflow(input.to_string());

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(overflow)?;

        // fractional digits beyond nanosecond precision are dropped
        let mut divisor: u128 = 1;
        let mut frac_value: u128 = 0;
        for digit in frac.bytes().take(18) {
            frac_value = frac_value * 10 + u128::from(digit - b'0');
            divisor *= 10;
        }
        nanos = nanos
            .checked_add(frac_value * scale / divisor)
            .ok_or_else(overflow)?;

        total = total.checked_add(nanos).ok_or_else(overflow)?;
    }

    let secs = u64::try_from(total / 1_000_000_000).map_err(|_| DurationParseError::Overflow(input.to_string()))?;
    Ok(Duration::new(secs, (total % 1_000_000_000) as u32))
}

/// Format a duration the way the service does: `"40s"`, `"1m30s"`, `"1h0m0s"`.
///
/// Sub-second durations use the largest unit that keeps an integer.
pub fn format_go_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }

    let total_secs = d.as_secs();
    let nanos = d.subsec_nanos();

    if total_secs == 0 {
        return if nanos % 1_000_000 == 0 {
            format!("{}ms", nanos / 1_000_000)
        } else if nanos % 1_000 == 0 {
            format!("{}\u{00b5}s", nanos / 1_000)
        } else {
            format!("{}ns", nanos)
        };
    }

    let secs = if nanos == 0 {
        format!("{}s", total_secs % 60)
    } else {
        let frac = format!("{:09}", nanos);
        format!("{}.{}s", total_secs % 60, frac.trim_end_matches('0'))
    };

    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;

    if hours > 0 {
        format!("{}h{}m{}", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m{}", minutes, secs)
    } else {
        secs
    }
}
