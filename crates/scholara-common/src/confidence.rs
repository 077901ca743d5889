/// Confidence helpers shared by the parsers and the store.
/// Every confidence held by an entity lies in [0.0, 1.0].

/// Clamp into [0.0, 1.0]. NaN becomes 0.0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Normalise a model-reported confidence.
///
/// Values in [0, 1] are taken as-is; values in (1, 100] are read as
/// percentages. Anything else (negative, above 100, non-finite) is rejected.
pub fn normalise_confidence(value: f64) -> Option<f64> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    if value <= 1.0 {
        Some(value)
    } else if value <= 100.0 {
        Some(value / 100.0)
    } else {
        None
    }
}

/// Extract the first number in a line such as `"Confidence: 85%"` or
/// `"confidence - 0.72 (high)"` and normalise it.
///
/// Returns `Err` with the offending text when a number is present but out of
/// range, `Ok(None)` when the text carries no number at all.
pub fn parse_confidence(text: &str) -> Result<Option<f64>, String> {
    let start = match text.find(|c: char| c.is_ascii_digit()) {
        Some(i) => i,
        None => return Ok(None),
    };
    // Keep a leading '.' for ".85" and a '-' directly before the digits.
    let start = match text[..start].chars().last() {
        Some('.') | Some('-') => start - 1,
        _ => start,
    };
    let number: String = text[start..]
        .chars()
        .enumerate()
        .take_while(|(i, c)| c.is_ascii_digit() || *c == '.' || (*i == 0 && *c == '-'))
        .map(|(_, c)| c)
        .collect();
    let value: f64 = number.trim_end_matches('.').parse().map_err(|_| text.trim().to_string())?;
    normalise_confidence(value).map(Some).ok_or_else(|| text.trim().to_string())
}
