//! CQL function preprocessing
//!
//! Rewrites calls such as `now()` or `now("-4w")` into double-quoted
//! timestamp literals before the query is tokenized. Text outside of known
//! calls is copied through untouched.

use chrono::{DateTime, TimeDelta, Utc};
use cqlkit_core::temporal::format_timestamp;
use cqlkit_core::{Clock, Error, Result};
use tracing::debug;

/// Functions the preprocessor knows how to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    /// Current instant, optionally shifted by an offset
    Now,
}

impl Function {
    /// Resolve a function name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        name.eq_ignore_ascii_case("now").then_some(Function::Now)
    }
}

/// Unit of a relative time offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
    /// Approximated as 30 days
    Months,
    /// Approximated as 365 days
    Years,
}

impl OffsetUnit {
    fn parse(unit: &str) -> Option<Self> {
        match unit.to_ascii_lowercase().as_str() {
            "min" | "minute" | "minutes" => Some(OffsetUnit::Minutes),
            "h" | "hour" | "hours" => Some(OffsetUnit::Hours),
            "d" | "day" | "days" => Some(OffsetUnit::Days),
            "w" | "week" | "weeks" => Some(OffsetUnit::Weeks),
            "m" | "month" | "months" => Some(OffsetUnit::Months),
            "y" | "year" | "years" => Some(OffsetUnit::Years),
            _ => None,
        }
    }

    fn minutes(self) -> i64 {
        match self {
            OffsetUnit::Minutes => 1,
            OffsetUnit::Hours => 60,
            OffsetUnit::Days => 24 * 60,
            OffsetUnit::Weeks => 7 * 24 * 60,
            OffsetUnit::Months => 30 * 24 * 60,
            OffsetUnit::Years => 365 * 24 * 60,
        }
    }
}

/// A signed offset such as `-4w` or `+1d`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOffset {
    pub amount: i64,
    pub unit: OffsetUnit,
}

impl TimeOffset {
    /// Parse `[+-]?<digits><unit>`; the sign defaults to `+`.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || {
            Error::FunctionEvaluation(format!(
                "Invalid time offset format '{text}'. Expected e.g. '-4w', '+1d', '-2h'."
            ))
        };

        let (negative, rest) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (digits, unit) = rest.split_at(digits_end);
        if digits.is_empty() || !unit.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let unit = OffsetUnit::parse(unit).ok_or_else(|| {
            Error::FunctionEvaluation(format!(
                "Unsupported time unit '{unit}' in '{text}'. \
                 Supported units: min, h, d, w, m, y."
            ))
        })?;
        let amount: i64 = digits.parse().map_err(|_| invalid())?;

        Ok(Self {
            amount: if negative { -amount } else { amount },
            unit,
        })
    }

    /// Shift an instant by this offset
    pub fn apply(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let minutes = self.amount.checked_mul(self.unit.minutes())?;
        let delta = TimeDelta::try_minutes(minutes)?;
        instant.checked_add_signed(delta)
    }
}

/// Evaluate a single call given its raw argument text
fn evaluate(function: Function, args: &str, now: DateTime<Utc>) -> Result<String> {
    match function {
        Function::Now => {
            let arg = args.trim().trim_matches(|c| c == '"' || c == '\'').trim();
            let instant = if arg.is_empty() {
                now
            } else {
                let offset = TimeOffset::parse(arg)?;
                offset.apply(now).ok_or_else(|| {
                    Error::FunctionEvaluation(format!("Time offset '{arg}' is out of range."))
                })?
            };
            Ok(format!("\"{}\"", format_timestamp(instant)))
        }
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Replace every known function call with its value.
///
/// The clock is read once, so all calls in one query share the same instant.
/// Unknown `name(...)` calls are left in place and scanning resumes after the
/// name, so known calls nested inside them are still rewritten.
pub fn preprocess(query: &str, clock: &dyn Clock) -> Result<String> {
    let now = clock.now();
    let bytes = query.as_bytes();
    let mut out = String::with_capacity(query.len());
    let mut copied = 0;
    let mut i = 0;
    let mut rewritten = 0usize;

    while i < bytes.len() {
        if !is_word_byte(bytes[i]) {
            i += 1;
            continue;
        }
        let name_end = i + bytes[i..].iter().take_while(|b| is_word_byte(**b)).count();
        let call = (bytes.get(name_end) == Some(&b'('))
            .then(|| query[name_end + 1..].find(')'))
            .flatten();

        match (call, Function::from_name(&query[i..name_end])) {
            (Some(close), Some(function)) => {
                let args_end = name_end + 1 + close;
                out.push_str(&query[copied..i]);
                out.push_str(&evaluate(function, &query[name_end + 1..args_end], now).map_err(
                    |err| match err {
                        Error::FunctionEvaluation(msg) => Error::FunctionEvaluation(format!(
                            "{msg} (in '{}')",
                            &query[i..=args_end]
                        )),
                        other => other,
                    },
                )?);
                rewritten += 1;
                i = args_end + 1;
                copied = i;
            }
            _ => i = name_end,
        }
    }
    out.push_str(&query[copied..]);

    if rewritten > 0 {
        debug!(calls = rewritten, "Rewrote CQL function calls");
    }
    Ok(out)
}
