//! Numeric value normalisation for captured spans.

/// Parse a captured number and apply the rule multiplier.
/// `whole_units` floors the result (ages are whole years).
pub(crate) fn parse_numeric(raw: &str, multiplier: f64, whole_units: bool) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()? * multiplier;
    if !value.is_finite() {
        return None;
    }
    Some(if whole_units { value.floor() } else { value })
}
