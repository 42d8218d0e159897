//! `key:value` settings tokenizer and percentage parsing

use std::collections::BTreeMap;

use crate::error::{Result, WebVttError};

/// Parsed settings, first occurrence of a key wins
pub type SettingsMap = BTreeMap<String, String>;

/// Parse `"N.NN%"` into hundredths of a percent (`"5.34%"` -> 534)
///
/// Rounds half up and rejects anything outside `0..=10000`.
pub fn parse_percentage_hundredths(value: &str) -> Result<i32> {
    let number = value
        .strip_suffix('%')
        .ok_or_else(|| WebVttError::Percentage(format!("not a percentage string: {value}")))?;

    let parsed: f64 = number
        .parse()
        .map_err(|_| WebVttError::Percentage(format!("invalid percentage conversion of {value}")))?;
    if !parsed.is_finite() {
        return Err(WebVttError::Percentage(format!(
            "invalid percentage conversion of {value}"
        )));
    }

    let hundredths = (parsed * 100.0 + 0.5).floor();
    if !(0.0..=10000.0).contains(&hundredths) {
        return Err(WebVttError::Percentage(format!(
            "percentage out of range: {value}"
        )));
    }

    Ok(hundredths as i32)
}

/// Split `key:value` on the first colon
///
/// The value is the whole remainder, so `00:00:05.000` style values survive.
pub fn parse_property_value_pair(input: &str) -> Result<(&str, &str)> {
    match input.split_once(':') {
        Some((key, value)) if !value.is_empty() => Ok((key, value)),
        Some((key, _)) => Err(WebVttError::setting(key, "", "missing value")),
        None => Err(WebVttError::setting(input, "", "missing ':' separator")),
    }
}

/// Tokenize a settings line on spaces and tabs
///
/// Tokens that are not valid pairs are dropped with a warning; the rest still
/// apply.
pub fn parse_settings_line(line: &str) -> SettingsMap {
    let mut settings = SettingsMap::new();

    for token in line.split_whitespace() {
        match parse_property_value_pair(token) {
            Ok((key, value)) => {
                settings
                    .entry(key.to_string())
                    .or_insert_with(|| value.to_string());
            }
            Err(e) => tracing::warn!("Dropping cue setting {:?}: {}", token, e),
        }
    }

    settings
}

/// Parse an `"x%,y%"` anchor pair
pub fn parse_anchor(value: &str) -> Result<(i32, i32)> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| WebVttError::Percentage(format!("anchor needs two values: {value}")))?;
    Ok((parse_percentage_hundredths(x)?, parse_percentage_hundredths(y)?))
}
