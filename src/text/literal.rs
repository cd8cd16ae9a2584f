//! Number and string literal conversion, both directions.

use std::fmt::Write;

/// A numeric literal after its kind has been decided from its spelling.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Number {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

/// Whether a word is spelled like a number and should go through [`parse_number`].
pub fn looks_numeric(text: &str) -> bool {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let bare = unsigned.trim_end_matches(['F', 'f', 'D', 'd']);
    match unsigned.chars().next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => unsigned.chars().nth(1).is_some_and(|c| c.is_ascii_digit()),
        _ => bare == "NaN" || bare == "Infinity",
    }
}

/// Decides the kind from the spelling and converts.
///
/// `L` makes a long and a `0x` prefix reads hex digits. Otherwise `F` makes a
/// float, while `D`, a decimal point, an exponent or `NaN`/`Infinity` make a
/// double. Everything else is an int.
pub fn parse_number(text: &str) -> Result<Number, String> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let hex = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"));
    if let Some(digits) = hex {
        return match digits.strip_suffix(['L', 'l']) {
            Some(digits) => parse_hex(digits, negative)
                .and_then(|v| i64::try_from(v).ok())
                .map(Number::Long)
                .ok_or_else(|| conversion_error("long", text)),
            None => parse_hex(digits, negative)
                .and_then(|v| i32::try_from(v).ok())
                .map(Number::Int)
                .ok_or_else(|| conversion_error("int", text)),
        };
    }
    let sign = if negative { "-" } else { "" };
    if let Some(body) = unsigned.strip_suffix(['L', 'l']) {
        return format!("{}{}", sign, body.replace('_', ""))
            .parse::<i64>()
            .map(Number::Long)
            .map_err(|_| conversion_error("long", text));
    }
    if let Some(body) = unsigned.strip_suffix(['F', 'f']) {
        return parse_float::<f32>(sign, body)
            .map(Number::Float)
            .ok_or_else(|| conversion_error("float", text));
    }
    let explicit_double = unsigned.strip_suffix(['D', 'd']);
    let body = explicit_double.unwrap_or(unsigned);
    if explicit_double.is_some()
        || body.contains(['.', 'e', 'E'])
        || body == "NaN"
        || body == "Infinity"
    {
        return parse_float::<f64>(sign, body)
            .map(Number::Double)
            .ok_or_else(|| conversion_error("double", text));
    }
    format!("{}{}", sign, body.replace('_', ""))
        .parse::<i32>()
        .map(Number::Int)
        .map_err(|_| conversion_error("int", text))
}

/// Signed hex, so `0xFFFFFFFF` is out of range for an int rather than `-1`.
fn parse_hex(digits: &str, negative: bool) -> Option<i128> {
    let digits = digits.replace('_', "");
    if digits.is_empty() {
        return None;
    }
    let value = u64::from_str_radix(&digits, 16).ok()? as i128;
    Some(if negative { -value } else { value })
}

fn parse_float<T: std::str::FromStr>(sign: &str, body: &str) -> Option<T> {
    // the sign was already split off, a second one is malformed
    if body.is_empty() || body.starts_with(['+', '-']) {
        return None;
    }
    format!("{}{}", sign, body).parse::<T>().ok()
}

fn conversion_error(kind: &str, text: &str) -> String {
    format!("Could not parse {} from: '{}'", kind, text)
}

pub fn format_float(value: f32) -> String {
    if value.is_nan() {
        "NaNF".to_string()
    } else if value.is_infinite() {
        format!("{}InfinityF", if value < 0.0 { "-" } else { "" })
    } else {
        format!("{:?}F", value)
    }
}

pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        format!("{}Infinity", if value < 0.0 { "-" } else { "" })
    } else {
        format!("{:?}", value)
    }
}

/// Quotes and escapes a string so the scanner reads back the same value.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if c.is_control() => {
                // BMP only; other controls don't exist outside it
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
